//! In-process store implementations backed by parking_lot maps.
//! These carry the whole persistence contract for the server binary and the
//! test suite; nothing above this layer knows it is not talking to SQL.

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::{Message, MessageStore, Rental, RentalStore, User, UserStore};
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct MemoryUserStore {
    /// id -> user; the email index lives in the same lock so the uniqueness
    /// check and the insert are one atomic step.
    inner: RwLock<UserMaps>,
}

#[derive(Default)]
struct UserMaps {
    by_id: HashMap<Uuid, User>,
    email_index: HashMap<String, Uuid>,
}

impl MemoryUserStore {
    pub fn new() -> Self { Self::default() }
}

impl UserStore for MemoryUserStore {
    fn insert(&self, user: User) -> AppResult<User> {
        let mut maps = self.inner.write();
        if maps.email_index.contains_key(&user.email) {
            return Err(AppError::conflict("email_taken", "email is already registered"));
        }
        maps.email_index.insert(user.email.clone(), user.id);
        maps.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> Option<User> {
        let maps = self.inner.read();
        let id = maps.email_index.get(email)?;
        maps.by_id.get(id).cloned()
    }

    fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.inner.read().by_id.get(&id).cloned()
    }
}

#[derive(Default)]
pub struct MemoryRentalStore {
    inner: RwLock<HashMap<Uuid, Rental>>,
}

impl MemoryRentalStore {
    pub fn new() -> Self { Self::default() }
}

impl RentalStore for MemoryRentalStore {
    fn save(&self, rental: Rental) -> AppResult<Rental> {
        self.inner.write().insert(rental.id, rental.clone());
        Ok(rental)
    }

    fn find_by_id(&self, id: Uuid) -> Option<Rental> {
        self.inner.read().get(&id).cloned()
    }

    fn find_all(&self) -> Vec<Rental> {
        let mut all: Vec<Rental> = self.inner.read().values().cloned().collect();
        // Stable listing order for clients
        all.sort_by_key(|r| (r.created_at, r.id));
        all
    }
}

#[derive(Default)]
pub struct MemoryMessageStore {
    inner: RwLock<Vec<Message>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self { Self::default() }
}

impl MessageStore for MemoryMessageStore {
    fn save(&self, message: Message) -> AppResult<Message> {
        self.inner.write().push(message.clone());
        Ok(message)
    }

    fn find_by_rental(&self, rental_id: Uuid) -> Vec<Message> {
        self.inner
            .read()
            .iter()
            .filter(|m| m.rental_id == rental_id)
            .cloned()
            .collect()
    }
}
