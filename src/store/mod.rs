//!
//! chalet persistence contracts
//! ----------------------------
//! The relational store is an external collaborator. This module pins down the
//! save/find-by-id/find-by-field contract the rest of the crate depends on, as
//! object-safe traits, plus the record types that cross that seam.
//!
//! The one consistency guarantee this crate leans on is the unique email index:
//! `UserStore::insert` is the authoritative rejection point for duplicate
//! emails. Callers must not rely on a separate existence check, because two
//! concurrent registrations can both pass it.
//!
//! `memory.rs` provides the in-process implementation used by the server and
//! the test suite. A SQL-backed implementation would carry the same contract
//! with a unique index on `users.email`.

mod memory;

pub use memory::{MemoryMessageStore, MemoryRentalStore, MemoryUserStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppResult;

/// Identity record. `password_hash` is a PHC string and never leaves the
/// process; outbound DTOs are built from the other fields only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rental listing. `owner_id` is set at creation and never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rental {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub surface: u32,
    pub price: f64,
    pub description: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Message left by a user against a rental.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credential store adapter: identity records keyed by id with a unique index
/// on email.
pub trait UserStore: Send + Sync {
    /// Persist a new user. Rejects with `Conflict` when the email is already
    /// present; the check and the write happen under one lock (or one unique
    /// index) so concurrent registrations cannot both succeed.
    fn insert(&self, user: User) -> AppResult<User>;
    fn find_by_email(&self, email: &str) -> Option<User>;
    fn find_by_id(&self, id: Uuid) -> Option<User>;
}

pub trait RentalStore: Send + Sync {
    fn save(&self, rental: Rental) -> AppResult<Rental>;
    fn find_by_id(&self, id: Uuid) -> Option<Rental>;
    fn find_all(&self) -> Vec<Rental>;
}

pub trait MessageStore: Send + Sync {
    fn save(&self, message: Message) -> AppResult<Message>;
    fn find_by_rental(&self, rental_id: Uuid) -> Vec<Message>;
}

pub type SharedUserStore = Arc<dyn UserStore>;
pub type SharedRentalStore = Arc<dyn RentalStore>;
pub type SharedMessageStore = Arc<dyn MessageStore>;
