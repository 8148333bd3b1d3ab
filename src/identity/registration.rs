//! Identity registration: validation pipeline in front of the credential store.
//! All rules run before any write; the store's unique email index is the
//! authoritative duplicate signal, not the validation here.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{User, UserStore};

use super::password::hash_password;

/// Standard address grammar: local part, one '@', dotted domain.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("email regex")
});

/// Punctuation set accepted as the required password symbol.
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\",.<>/?\\|`~";

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::invalid("weak_password", "password must be at least 8 characters"));
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if !(has_upper && has_lower && has_digit && has_symbol) {
        return Err(AppError::invalid(
            "weak_password",
            "password must contain an uppercase letter, a lowercase letter, a digit and a symbol",
        ));
    }
    Ok(())
}

/// Validate and create a new identity record.
///
/// Rule order: email grammar, password strength, non-empty name, then the
/// insert itself (which rejects duplicate emails with `Conflict`). The
/// plaintext is hashed and dropped; it never reaches the store.
pub fn register(store: &dyn UserStore, req: &RegisterRequest) -> AppResult<User> {
    if !EMAIL_RE.is_match(&req.email) {
        return Err(AppError::invalid("bad_email", "email address is not valid"));
    }
    validate_password(&req.password)?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::invalid("bad_name", "name must not be empty"));
    }

    let password_hash = hash_password(&req.password)?;
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: req.email.clone(),
        password_hash,
        created_at: now,
        updated_at: now,
    };
    store.insert(user)
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod registration_tests;
