use std::fmt;
use uuid::Uuid;

/// Authenticated caller, as verified from their bearer token
///
/// The raw token is kept so collaborators on the backend-as-a-service can be
/// called on the user's behalf and row-level security still applies.
#[derive(Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: Uuid,
    access_token: String,
}

impl UserContext {
    pub fn new(user_id: Uuid, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

// Tokens must never reach the logs
impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserContext")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
