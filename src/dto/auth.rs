use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::state::user::User;

/// Payload to register a new owner account.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Login email; must be unique.
    #[validate(email)]
    pub email: String,
    /// Password; at least eight characters with a letter and a digit.
    pub password: String,
    /// First name, 2 to 20 characters.
    pub name_first: String,
    /// Last name, 2 to 20 characters.
    pub name_last: String,
}

/// Payload to log into an existing account.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Fresh login token returned by register and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Opaque token to present in the `token` header.
    pub token: String,
}

/// Account details projection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    /// Account id.
    pub user_id: Uuid,
    /// Full name, "First Last".
    pub name: String,
    /// Login email.
    pub email: String,
    /// Successful logins, counting registration.
    pub num_successful_logins: u32,
    /// Failed password attempts since the last successful login.
    pub num_failed_passwords_since_last_login: u32,
}

/// Wrapper object the details endpoint responds with.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetailsResponse {
    /// The account details.
    pub user: UserDetails,
}

impl From<&User> for UserDetails {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: format!("{} {}", user.name_first, user.name_last),
            email: user.email.clone(),
            num_successful_logins: user.successful_logins,
            num_failed_passwords_since_last_login: user.failed_logins,
        }
    }
}

/// Payload to update account name and email.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsUpdateRequest {
    /// New login email.
    #[validate(email)]
    pub email: String,
    /// New first name.
    pub name_first: String,
    /// New last name.
    pub name_last: String,
}

/// Payload to change the account password.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    /// Current password.
    pub old_password: String,
    /// Replacement password.
    pub new_password: String,
}
