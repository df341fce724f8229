use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for user registration. Presence is checked in the handler so
/// missing fields surface as the API's 400, not a generic rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for Google sign-in: the ID token issued by Google.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// Public part of a user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_image: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub profile_image: String,
}

/// Response returned by refresh and Google sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_uses_camel_case() {
        let resp = LoginResponse {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            access_token: "acc".into(),
            refresh_token: "ref".into(),
            profile_image: "".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"accessToken\""));
        assert!(json.contains("\"refreshToken\""));
        assert!(json.contains("\"profileImage\""));
        assert!(!json.contains("access_token"));
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none());
        assert!(req.email.is_none());
        assert!(req.password.is_none());
        assert!(req.profile_image.is_none());
    }
}
