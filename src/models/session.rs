use serde::{Deserialize, Serialize};

/// Signed-in identity as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Bearer token for remote directory calls
    #[serde(default)]
    pub id_token: Option<String>,
}

impl SessionUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
            id_token: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Profile document stored at `users/{uid}` on first sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub email: Option<String>,
    pub joined_at: i64,
}
