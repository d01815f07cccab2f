//! User (principal) domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Authenticated principal with its group memberships
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    /// Group names in membership order
    pub groups: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: Uuid, username: String, password_hash: String, groups: Vec<String>) -> Self {
        Self {
            id,
            username,
            password_hash,
            is_active: true,
            groups,
            created_at: Utc::now(),
        }
    }
}

/// Profile of the calling principal
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(example = "colombo.clerk")]
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_active_with_ordered_groups() {
        let user = User::new(
            Uuid::new_v4(),
            "kandy.clerk".to_string(),
            "hash".to_string(),
            vec!["KandyBranch".to_string(), "KandyTeam".to_string()],
        );

        assert!(user.is_active);
        assert_eq!(user.groups, vec!["KandyBranch", "KandyTeam"]);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(Uuid::new_v4(), "a".into(), "secret-hash".into(), vec![]);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
