use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::auth::{
        LoginRequest, PasswordUpdateRequest, RegisterRequest, TokenResponse, UserDetailsResponse,
        UserDetailsUpdateRequest,
    },
    error::ServiceError,
    state::{SharedState, user::User},
};

const NAME_LEN_MIN: usize = 2;
const NAME_LEN_MAX: usize = 20;
const PASSWORD_LEN_MIN: usize = 8;

/// Register a new owner account and log it in.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<TokenResponse, ServiceError> {
    request.validate()?;

    validate_name(&request.name_first)?;
    validate_name(&request.name_last)?;
    validate_password(&request.password)?;

    if email_taken(state, &request.email, None) {
        return Err(ServiceError::InvalidInput(
            "email is already registered".into(),
        ));
    }

    let user = User {
        id: Uuid::new_v4(),
        email: request.email,
        name_first: request.name_first,
        name_last: request.name_last,
        password_digest: digest(&request.password),
        // Registration counts as the first successful login.
        successful_logins: 1,
        failed_logins: 0,
        old_password_digests: Vec::new(),
    };

    let token = issue_token(state, user.id);
    state.users().insert(user.id, user);

    Ok(TokenResponse {
        token: token.to_string(),
    })
}

/// Log into an existing account, returning a fresh token.
pub async fn login(
    state: &SharedState,
    request: LoginRequest,
) -> Result<TokenResponse, ServiceError> {
    let user_id = state
        .users()
        .iter()
        .find(|entry| entry.value().email == request.email)
        .map(|entry| *entry.key())
        .ok_or_else(|| ServiceError::InvalidInput("email is not registered".into()))?;

    let mut user = state
        .users()
        .get_mut(&user_id)
        .ok_or_else(|| ServiceError::InvalidInput("email is not registered".into()))?;

    if user.password_digest != digest(&request.password) {
        user.failed_logins += 1;
        return Err(ServiceError::InvalidInput("password is incorrect".into()));
    }

    user.failed_logins = 0;
    user.successful_logins += 1;
    drop(user);

    let token = issue_token(state, user_id);
    Ok(TokenResponse {
        token: token.to_string(),
    })
}

/// Invalidate a login token.
pub async fn logout(state: &SharedState, token: Uuid) -> Result<(), ServiceError> {
    state
        .tokens()
        .remove(&token)
        .map(|_| ())
        .ok_or_else(|| ServiceError::Unauthorized("token is empty or invalid".into()))
}

/// Details of the account a token belongs to.
pub async fn user_details(
    state: &SharedState,
    token: Uuid,
) -> Result<UserDetailsResponse, ServiceError> {
    let user = authenticate(state, token)?;
    Ok(UserDetailsResponse {
        user: (&user).into(),
    })
}

/// Update name and email of the account a token belongs to.
pub async fn user_details_update(
    state: &SharedState,
    token: Uuid,
    request: UserDetailsUpdateRequest,
) -> Result<(), ServiceError> {
    let user = authenticate(state, token)?;

    request.validate()?;
    validate_name(&request.name_first)?;
    validate_name(&request.name_last)?;

    if email_taken(state, &request.email, Some(user.id)) {
        return Err(ServiceError::InvalidInput("email is already in use".into()));
    }

    let mut entry = state
        .users()
        .get_mut(&user.id)
        .ok_or_else(|| ServiceError::Unauthorized("token is empty or invalid".into()))?;
    entry.email = request.email;
    entry.name_first = request.name_first;
    entry.name_last = request.name_last;

    Ok(())
}

/// Change the password of the account a token belongs to.
pub async fn user_password_update(
    state: &SharedState,
    token: Uuid,
    request: PasswordUpdateRequest,
) -> Result<(), ServiceError> {
    let user = authenticate(state, token)?;

    if digest(&request.old_password) != user.password_digest {
        return Err(ServiceError::InvalidInput(
            "old password is incorrect".into(),
        ));
    }

    if request.old_password == request.new_password {
        return Err(ServiceError::InvalidInput(
            "new password must differ from the old password".into(),
        ));
    }

    let new_digest = digest(&request.new_password);
    if user.old_password_digests.contains(&new_digest) {
        return Err(ServiceError::InvalidInput(
            "new password must not be a previously used password".into(),
        ));
    }

    validate_password(&request.new_password)?;

    let mut entry = state
        .users()
        .get_mut(&user.id)
        .ok_or_else(|| ServiceError::Unauthorized("token is empty or invalid".into()))?;
    let old_digest = entry.password_digest.clone();
    entry.password_digest = new_digest;
    entry.old_password_digests.push(old_digest);

    Ok(())
}

/// Resolve a token to the account it authenticates.
///
/// Every owner-facing operation funnels through this; a stale token (for
/// instance after logout) fails here with an unauthorized error.
pub fn authenticate(state: &SharedState, token: Uuid) -> Result<User, ServiceError> {
    let user_id = state
        .tokens()
        .get(&token)
        .map(|entry| *entry.value())
        .ok_or_else(|| ServiceError::Unauthorized("token is empty or invalid".into()))?;

    state
        .users()
        .get(&user_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| ServiceError::Unauthorized("token is empty or invalid".into()))
}

/// SHA-256 digest of a password, hex encoded.
fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn issue_token(state: &SharedState, user_id: Uuid) -> Uuid {
    let token = Uuid::new_v4();
    state.tokens().insert(token, user_id);
    token
}

fn email_taken(state: &SharedState, email: &str, except: Option<Uuid>) -> bool {
    state
        .users()
        .iter()
        .any(|entry| entry.value().email == email && Some(*entry.key()) != except)
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.len() < NAME_LEN_MIN || name.len() > NAME_LEN_MAX {
        return Err(ServiceError::InvalidInput(
            "name must be between 2 and 20 characters".into(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphabetic() || matches!(c, '-' | '\'' | ' '))
    {
        return Err(ServiceError::InvalidInput(
            "name may only contain letters, hyphens, apostrophes, and spaces".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.len() < PASSWORD_LEN_MIN {
        return Err(ServiceError::InvalidInput(
            "password must be at least 8 characters".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ServiceError::InvalidInput(
            "password must contain at least one letter and one digit".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules() {
        assert!(validate_password("abcd1234").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("lettersonly").is_err());
        assert!(validate_password("12345678").is_err());
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("Hayden O'Neil-Smith").is_ok());
        assert!(validate_name("A").is_err());
        assert!(validate_name("Name With Digits 1").is_err());
    }

    #[test]
    fn digests_are_stable_hex() {
        let d = digest("abcd1234");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest("abcd1234"));
        assert_ne!(d, digest("abcd1235"));
    }
}
