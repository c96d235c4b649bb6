//! Signed-in user profile.

use serde::{Deserialize, Serialize};

/// The last-known profile of the signed-in user, as cached by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserProfile {
    /// A profile known only by its id.
    #[must_use]
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            username: String::new(),
            email: None,
            name: None,
            surname: None,
            birth_date: None,
            role: None,
        }
    }
}
