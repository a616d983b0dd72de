//! Token authentication: credential exchange and `Authorization: Token <key>` checks.

pub mod crypto;

use crate::error::{AppError, FieldErrors, NON_FIELD_ERRORS};
use crate::model::{AuthToken, User};
use crate::service::validation::{validate_fields, CREDENTIAL_FIELDS};
use crate::store::AuthRepository;
use serde_json::Value;

/// Scheme keyword expected in the `Authorization` header.
pub const TOKEN_KEYWORD: &str = "Token";

pub const MSG_NOT_PROVIDED: &str = "Authentication credentials were not provided.";
pub const MSG_NO_CREDENTIALS: &str = "Invalid token header. No credentials provided.";
pub const MSG_HAS_SPACES: &str = "Invalid token header. Token string should not contain spaces.";
pub const MSG_INVALID_CHARS: &str = "Invalid token header. Token string should not contain invalid characters.";
pub const MSG_INVALID_TOKEN: &str = "Invalid token.";
pub const MSG_INACTIVE: &str = "User inactive or deleted.";
pub const MSG_BAD_LOGIN: &str = "Unable to log in with provided credentials.";

/// Outcome of inspecting an `Authorization` header.
#[derive(Debug, PartialEq, Eq)]
pub enum HeaderToken<'a> {
    /// No header, or a scheme other than `Token`.
    Absent,
    Key(&'a str),
    Malformed(&'static str),
}

/// Split a raw header value on ASCII whitespace. Only the key must be UTF-8;
/// a non-`Token` scheme is ignored whatever its bytes.
pub fn parse_authorization(header: Option<&[u8]>) -> HeaderToken<'_> {
    let Some(header) = header else {
        return HeaderToken::Absent;
    };
    let mut parts = header
        .split(|b| b.is_ascii_whitespace())
        .filter(|part| !part.is_empty());
    match parts.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case(TOKEN_KEYWORD.as_bytes()) => {}
        _ => return HeaderToken::Absent,
    }
    match (parts.next(), parts.next()) {
        (None, _) => HeaderToken::Malformed(MSG_NO_CREDENTIALS),
        (Some(_), Some(_)) => HeaderToken::Malformed(MSG_HAS_SPACES),
        (Some(key), None) => match std::str::from_utf8(key) {
            Ok(key) => HeaderToken::Key(key),
            Err(_) => HeaderToken::Malformed(MSG_INVALID_CHARS),
        },
    }
}

/// Resolve the header to an active user.
pub async fn authenticate(repo: &dyn AuthRepository, header: Option<&[u8]>) -> Result<User, AppError> {
    let key = match parse_authorization(header) {
        HeaderToken::Absent => return Err(AppError::NotAuthenticated(MSG_NOT_PROVIDED.into())),
        HeaderToken::Malformed(msg) => return Err(AppError::NotAuthenticated(msg.into())),
        HeaderToken::Key(key) => key,
    };
    let user = repo
        .user_for_token(key)
        .await?
        .ok_or_else(|| AppError::NotAuthenticated(MSG_INVALID_TOKEN.into()))?;
    if !user.is_active {
        return Err(AppError::NotAuthenticated(MSG_INACTIVE.into()));
    }
    Ok(user)
}

/// Exchange `{username, password}` for the user's token, creating it on first login.
pub async fn obtain_token(repo: &dyn AuthRepository, body: &Value) -> Result<AuthToken, AppError> {
    let [username, password] = validate_fields(body, &CREDENTIAL_FIELDS).map_err(AppError::Validation)?;
    let bad_login = || AppError::Validation(FieldErrors::single(NON_FIELD_ERRORS, MSG_BAD_LOGIN));

    let Some(user) = repo.find_user(&username).await? else {
        // Pay the hashing cost anyway so response time does not reveal unknown usernames.
        crypto::hash_password_blocking(password).await?;
        tracing::warn!(username = %username, "login failed: unknown user");
        return Err(bad_login());
    };
    if !crypto::verify_password_blocking(password, user.password_hash.clone()).await? {
        tracing::warn!(username = %username, "login failed: wrong password");
        return Err(bad_login());
    }
    if !user.is_active {
        tracing::warn!(username = %username, "login failed: inactive user");
        return Err(bad_login());
    }
    let token = repo
        .get_or_create_token(user.id, &crypto::generate_token_key())
        .await?;
    tracing::info!(username = %username, "token issued");
    Ok(token)
}

/// Create or reset a user from configured credentials.
pub async fn bootstrap_user(repo: &dyn AuthRepository, username: &str, password: &str) -> Result<User, AppError> {
    let hash = crypto::hash_password_blocking(password.to_string()).await?;
    let user = repo.upsert_user(username, &hash).await?;
    tracing::info!(username = %username, "bootstrap user ready");
    Ok(user)
}
