use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored account. `password` always holds a bcrypt hash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, FromRow)]
pub struct User {
    pub email: String,
    pub name: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public view of a user, safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_never_contains_hash() {
        let user = User::new("ann@x.com", "Ann", "$2b$04$abcdefghijklmnopqrstuv");
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["email"], "ann@x.com");
        assert_eq!(json["name"], "Ann");
        assert!(json.get("password").is_none());
    }
}
