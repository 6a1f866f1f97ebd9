// User, credential, and identity models

use serde::{Deserialize, Serialize};

/// Bearer credential issued by the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque bearer token
    pub access_token: String,
    /// Token scheme reported by the server (always "bearer")
    pub token_type: String,
}

/// Payload for registering a new account
#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    /// Email address, also used as the login name
    pub email: String,
    /// Unique username
    pub username: String,
    /// Plaintext password, hashed server-side
    pub password: String,
    /// Optional display name
    pub full_name: Option<String>,
}

/// Created-user representation returned by the register endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    /// Server-assigned id
    pub id: String,
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
    /// Optional display name
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Minimal profile for the signed-in user
///
/// Derived client-side from the login email rather than fetched from the
/// server, so it carries only what the login input can supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Email the user signed in with
    pub email: String,
    /// Local part of the email
    pub username: String,
    /// Display name
    pub full_name: String,
}

impl Identity {
    /// Default display name when none is known
    pub const DEFAULT_FULL_NAME: &'static str = "Omnia AI User";

    /// Derive an identity from a login email
    pub fn from_email(email: &str) -> Self {
        let username = email.split('@').next().unwrap_or(email).to_string();
        Self {
            email: email.to_string(),
            username,
            full_name: Self::DEFAULT_FULL_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_email() {
        let identity = Identity::from_email("a@x.com");
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.username, "a");
        assert_eq!(identity.full_name, Identity::DEFAULT_FULL_NAME);
    }

    #[test]
    fn test_identity_from_email_without_at() {
        let identity = Identity::from_email("plainname");
        assert_eq!(identity.username, "plainname");
    }

    #[test]
    fn test_token_round_trip() {
        let token = Token {
            access_token: "T1".to_string(),
            token_type: "bearer".to_string(),
        };
        let json = serde_json::to_string(&token).unwrap();
        let decoded: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, token);
    }
}
