use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Audience description used to tailor prompts.
///
/// All fields are free text. `age_group` and `role` come from fixed option
/// sets in the profile form but any string is accepted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub age_group: String,
    pub role: String,
    pub interests: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// The subset of a profile that is shown to the language model.
#[derive(Debug, Serialize)]
pub struct PromptProfile<'a> {
    pub name: &'a str,
    pub age_group: &'a str,
    pub role: &'a str,
    pub interests: &'a str,
}

impl Profile {
    pub fn new(name: &str, age_group: &str, role: &str, interests: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            age_group: age_group.trim().to_string(),
            role: role.trim().to_string(),
            interests: interests.trim().to_string(),
            created_at: None,
        }
    }

    /// A profile with no recognized field set describes nobody in particular.
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.age_group, &self.role, &self.interests]
            .iter()
            .all(|field| field.trim().is_empty())
    }

    /// Role used in the context-grounded synthesis query.
    pub fn role_or_default(&self) -> &str {
        let role = self.role.trim();
        if role.is_empty() {
            "student"
        } else {
            role
        }
    }

    /// Recognized keys only, for prompt construction.
    pub fn for_prompt(&self) -> PromptProfile<'_> {
        PromptProfile {
            name: &self.name,
            age_group: &self.age_group,
            role: &self.role,
            interests: &self.interests,
        }
    }

    /// JSON rendering of the recognized keys.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string(&self.for_prompt()).unwrap_or_default()
    }
}

/// Treat `None` and an empty profile the same way.
pub fn effective_profile(profile: Option<&Profile>) -> Option<&Profile> {
    profile.filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_empty() {
        assert!(Profile::default().is_empty());
        assert!(Profile::new("  ", "", "", "").is_empty());
    }

    #[test]
    fn any_field_makes_profile_non_empty() {
        assert!(!Profile::new("", "", "", "chess").is_empty());
    }

    #[test]
    fn role_defaults_to_student() {
        assert_eq!(Profile::default().role_or_default(), "student");
        assert_eq!(
            Profile::new("Ana", "16-22", "Engineer", "").role_or_default(),
            "Engineer"
        );
    }

    #[test]
    fn prompt_json_has_only_recognized_keys() {
        let mut profile = Profile::new("Ana", "16-22", "Student", "football");
        profile.created_at = Some(chrono::Local::now().naive_local());
        let json = profile.to_prompt_json();
        assert!(json.contains("\"name\":\"Ana\""));
        assert!(json.contains("\"interests\":\"football\""));
        assert!(!json.contains("created_at"));
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let profile: Profile = serde_json::from_str(r#"{"name": "Ana"}"#).unwrap();
        assert_eq!(profile.name, "Ana");
        assert!(profile.role.is_empty());
        assert!(profile.created_at.is_none());
    }

    #[test]
    fn effective_profile_drops_empty() {
        let empty = Profile::default();
        assert!(effective_profile(Some(&empty)).is_none());
        let ana = Profile::new("Ana", "", "", "");
        assert!(effective_profile(Some(&ana)).is_some());
        assert!(effective_profile(None).is_none());
    }
}
