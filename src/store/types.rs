/// Record shapes held by the document store
///
/// Field names go over the wire in camelCase (`createdAt`, `resumeLink`).

use serde::{Deserialize, Serialize};

/// Collection holding project records
pub const PROJECTS_COLLECTION: &str = "projects";

/// Collection and key addressing the singleton profile document
pub const SETTINGS_COLLECTION: &str = "settings";
pub const PROFILE_KEY: &str = "profile";

/// A portfolio project entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Store-assigned identifier
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Image reference (URL or storage path)
    pub image: String,
    /// External link to the live project or repository
    pub link: String,
    /// Creation time in epoch milliseconds, stamped by the store
    pub created_at: i64,
}

/// Payload for creating a project
///
/// Unknown fields such as `id` or `createdAt` are ignored on deserialization,
/// so a caller can never choose either value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: String,
}

/// Partial project update; absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub created_at: Option<i64>,
}

/// The site owner's profile, stored as a singleton document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub image: String,
    pub resume_link: String,
    pub email: String,
}

impl Default for Profile {
    /// Profile shown until the first write
    fn default() -> Self {
        Self {
            name: "Product Designer".to_string(),
            tagline: "Designing with purpose, building with code.".to_string(),
            description: "I am a passionate designer and developer focusing on crafting intuitive digital experiences.".to_string(),
            image: String::new(),
            resume_link: "#".to_string(),
            email: "hello@example.com".to_string(),
        }
    }
}

/// Partial profile update, merged into the stored document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub resume_link: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// Apply the supplied fields on top of `profile`
    pub fn merge_into(self, profile: &mut Profile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(tagline) = self.tagline {
            profile.tagline = tagline;
        }
        if let Some(description) = self.description {
            profile.description = description;
        }
        if let Some(image) = self.image {
            profile.image = image;
        }
        if let Some(resume_link) = self.resume_link {
            profile.resume_link = resume_link;
        }
        if let Some(email) = self.email {
            profile.email = email;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_ignores_id_and_created_at() {
        let payload = serde_json::json!({
            "id": "chosen-by-caller",
            "title": "Kiln",
            "createdAt": 42,
            "tags": ["rust"]
        });
        let project: NewProject = serde_json::from_value(payload).unwrap();
        assert_eq!(project.title, "Kiln");
        assert_eq!(project.tags, vec!["rust".to_string()]);
        assert!(project.description.is_empty());
    }

    #[test]
    fn test_profile_update_merges_only_supplied_fields() {
        let mut profile = Profile::default();
        ProfileUpdate {
            tagline: Some("Shipping small tools".to_string()),
            resume_link: Some("https://example.com/cv.pdf".to_string()),
            ..Default::default()
        }
        .merge_into(&mut profile);

        assert_eq!(profile.name, "Product Designer");
        assert_eq!(profile.tagline, "Shipping small tools");
        assert_eq!(profile.resume_link, "https://example.com/cv.pdf");
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let json = serde_json::to_value(Profile::default()).unwrap();
        assert_eq!(json["resumeLink"], "#");
        assert!(json.get("resume_link").is_none());
    }
}
