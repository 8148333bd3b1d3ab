//! Request identity resolution.
//!
//! Two entry points: credentials presented at login, and the caller identity
//! the bearer middleware has already attached to the request. The caller
//! context is request-scoped and passed explicitly; there is no ambient
//! security global.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::{AppError, AppResult};
use crate::store::UserStore;

use super::password::verify_password;

/// Dummy PHC string verified on the missing-user path so a failed lookup costs
/// roughly the same as a failed password check. Without it, response timing
/// would reveal whether an email is registered.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

/// Verify a caller's credentials and return their subject (email).
/// An unknown email and a wrong password are indistinguishable to the caller.
pub fn resolve_from_credentials(store: &dyn UserStore, email: &str, password: &str) -> AppResult<String> {
    match store.find_by_email(email) {
        Some(user) if verify_password(&user.password_hash, password) => Ok(user.email),
        Some(_) => Err(AppError::unauthorized("bad_credentials", "invalid email or password")),
        None => {
            let _ = verify_password(DUMMY_HASH, password);
            Err(AppError::unauthorized("bad_credentials", "invalid email or password"))
        }
    }
}

/// The caller identity for the current request, derived from a verified bearer
/// token by the middleware layer. Exists only for the duration of one request.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
    /// Subject claim: the identity's email.
    pub subject: String,
}

impl<S> FromRequestParts<S> for AuthenticatedCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedCaller>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("missing_token", "authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{register, RegisterRequest};
    use crate::store::MemoryUserStore;

    #[test]
    fn valid_credentials_resolve_to_subject() {
        let store = MemoryUserStore::new();
        let req = RegisterRequest {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "Abcdef1!".into(),
        };
        register(&store, &req).unwrap();
        let subject = resolve_from_credentials(&store, "alice@example.com", "Abcdef1!").unwrap();
        assert_eq!(subject, "alice@example.com");
    }

    #[test]
    fn unknown_email_and_wrong_password_are_indistinguishable() {
        let store = MemoryUserStore::new();
        let req = RegisterRequest {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "Abcdef1!".into(),
        };
        register(&store, &req).unwrap();

        let wrong_pw = resolve_from_credentials(&store, "alice@example.com", "Wrong1!pw").unwrap_err();
        let no_user = resolve_from_credentials(&store, "nobody@example.com", "Wrong1!pw").unwrap_err();
        assert_eq!(wrong_pw.http_status(), 401);
        assert_eq!(no_user.http_status(), 401);
        assert_eq!(wrong_pw.code_str(), no_user.code_str());
        assert_eq!(wrong_pw.message(), no_user.message());
    }
}
