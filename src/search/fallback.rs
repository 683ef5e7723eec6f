use super::{SearchError, SearchHit, WebSearch};

/// Primary backend when present, secondary when the primary is absent or fails.
///
/// The secondary's error is returned as-is so the caller can record it.
pub struct FallbackSearch<P: WebSearch, S: WebSearch> {
    primary: Option<P>,
    secondary: S,
}

impl<P: WebSearch, S: WebSearch> FallbackSearch<P, S> {
    pub fn new(primary: Option<P>, secondary: S) -> Self {
        Self { primary, secondary }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }
}

impl<P: WebSearch, S: WebSearch> WebSearch for FallbackSearch<P, S> {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        if let Some(primary) = &self.primary {
            match primary.search(query, limit) {
                Ok(hits) => return Ok(hits),
                Err(e) => {
                    tracing::warn!(error = %e, "Primary search failed, falling back");
                }
            }
        }
        self.secondary.search(query, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fixed {
        result: Result<Vec<SearchHit>, SearchError>,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn ok(titles: &[&str]) -> Self {
            Self {
                result: Ok(titles.iter().map(|t| SearchHit::new(t, "s", "l")).collect()),
                calls: Cell::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: Err(SearchError::Http(message.into())),
                calls: Cell::new(0),
            }
        }
    }

    impl WebSearch for Fixed {
        fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>, SearchError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    #[test]
    fn primary_success_skips_secondary() {
        let search = FallbackSearch::new(Some(Fixed::ok(&["serp"])), Fixed::ok(&["ddg"]));
        let hits = search.search("q", 5).unwrap();
        assert_eq!(hits[0].title, "serp");
        assert_eq!(search.secondary.calls.get(), 0);
    }

    #[test]
    fn primary_failure_uses_secondary() {
        let search = FallbackSearch::new(Some(Fixed::failing("quota")), Fixed::ok(&["ddg"]));
        let hits = search.search("q", 5).unwrap();
        assert_eq!(hits[0].title, "ddg");
    }

    #[test]
    fn missing_primary_uses_secondary() {
        let search: FallbackSearch<Fixed, Fixed> = FallbackSearch::new(None, Fixed::ok(&["ddg"]));
        assert_eq!(search.search("q", 5).unwrap().len(), 1);
    }

    #[test]
    fn secondary_error_propagates() {
        let search = FallbackSearch::new(Some(Fixed::failing("quota")), Fixed::failing("offline"));
        assert_eq!(
            search.search("q", 5).unwrap_err(),
            SearchError::Http("offline".into())
        );
    }

    #[test]
    fn empty_primary_result_is_not_a_failure() {
        let search = FallbackSearch::new(Some(Fixed::ok(&[])), Fixed::ok(&["ddg"]));
        assert!(search.search("q", 5).unwrap().is_empty());
        assert_eq!(search.secondary.calls.get(), 0);
    }
}
