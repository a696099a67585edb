use uuid::Uuid;

/// Registered quiz owner account.
///
/// Passwords are stored as SHA-256 digests, never in the clear; previously
/// used digests are retained so a password update can refuse reuse.
#[derive(Debug, Clone)]
pub struct User {
    /// Stable identifier for the account.
    pub id: Uuid,
    /// Login email, unique across all accounts.
    pub email: String,
    /// First name.
    pub name_first: String,
    /// Last name.
    pub name_last: String,
    /// SHA-256 digest of the current password, hex encoded.
    pub password_digest: String,
    /// Number of successful logins, counting the registration itself.
    pub successful_logins: u32,
    /// Failed password attempts since the last successful login.
    pub failed_logins: u32,
    /// Digests of passwords this account used before.
    pub old_password_digests: Vec<String>,
}
