//! portfolio.profile: the singleton record describing the site owner.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::portfolio_profile;

/// The stored profile, without the avatar blob.
///
/// The blob is only read by the image responder; pages always link to
/// `/profile_image`, which falls back to `avatar_url`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = portfolio_profile)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: i32,
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub github_link: Option<String>,
    pub linkedin_link: Option<String>,
    pub resume_link: Option<String>,
}

/// Every editable text field of the profile. Saves always replace all of them.
#[derive(Debug, Clone, Default, PartialEq, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = portfolio_profile)]
pub struct ProfileFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub github_link: String,
    #[serde(default)]
    pub linkedin_link: String,
    #[serde(default)]
    pub resume_link: String,
}

impl ProfileFields {
    /// Set a field by its form name. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "role" => &mut self.role,
            "bio" => &mut self.bio,
            "avatar_url" => &mut self.avatar_url,
            "github_link" => &mut self.github_link,
            "linkedin_link" => &mut self.linkedin_link,
            "resume_link" => &mut self.resume_link,
            _ => return false,
        };
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_routes_form_names_to_fields() {
        let mut fields = ProfileFields::default();
        assert!(fields.set("name", "Ada".into()));
        assert!(fields.set("resume_link", "/cv.pdf".into()));
        assert!(!fields.set("avatar_file", "ignored".into()));
        assert_eq!(fields.name, "Ada");
        assert_eq!(fields.resume_link, "/cv.pdf");
        assert_eq!(fields.role, "");
    }
}
