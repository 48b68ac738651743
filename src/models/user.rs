use serde::{Deserialize, Serialize};

/// Platform-assigned identity of a participant
pub type UserId = i64;

/// Identity fields as reported by the messaging platform at registration time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserProfile {
    /// Create a profile, folding empty platform strings into `None`
    pub fn new(
        user_id: UserId,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            user_id,
            username: non_empty(username),
            first_name: non_empty(first_name),
            last_name: non_empty(last_name),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
