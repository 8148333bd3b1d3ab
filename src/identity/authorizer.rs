//! Ownership authorization: may this caller mutate that rental?
//! The answer is advisory; endpoint handlers are the enforcement point and
//! must reject before applying any mutation.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{RentalStore, UserStore};

/// Decide whether `caller_subject` owns the rental with the given id.
///
/// Ownership compares the owner identity's email, the unforgeable unique key,
/// never the display name. A missing rental is `NotFound`, not a boolean; a
/// dangling owner reference is a store-integrity fault and surfaces as
/// `Internal`.
pub fn is_owner(
    rentals: &dyn RentalStore,
    users: &dyn UserStore,
    rental_id: Uuid,
    caller_subject: &str,
) -> AppResult<bool> {
    let rental = rentals
        .find_by_id(rental_id)
        .ok_or_else(|| AppError::not_found("rental_missing", "rental not found"))?;
    let owner = users
        .find_by_id(rental.owner_id)
        .ok_or_else(|| AppError::internal("owner_missing", "rental owner does not resolve"))?;
    Ok(owner.email == caller_subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{register, RegisterRequest};
    use crate::store::{MemoryRentalStore, MemoryUserStore, Rental};
    use chrono::Utc;

    fn seed(users: &MemoryUserStore, rentals: &MemoryRentalStore) -> Uuid {
        let alice = register(
            users,
            &RegisterRequest {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                password: "Abcdef1!".into(),
            },
        )
        .unwrap();
        let now = Utc::now();
        let rental = Rental {
            id: Uuid::new_v4(),
            owner_id: alice.id,
            name: "Seaside flat".into(),
            surface: 42,
            price: 1200.0,
            description: "two rooms".into(),
            picture: None,
            created_at: now,
            updated_at: now,
        };
        rentals.save(rental.clone()).unwrap();
        rental.id
    }

    #[test]
    fn owner_email_matches() {
        let users = MemoryUserStore::new();
        let rentals = MemoryRentalStore::new();
        let rental_id = seed(&users, &rentals);
        assert!(is_owner(&rentals, &users, rental_id, "alice@example.com").unwrap());
        assert!(!is_owner(&rentals, &users, rental_id, "bob@example.com").unwrap());
    }

    #[test]
    fn missing_rental_is_not_found_never_false() {
        let users = MemoryUserStore::new();
        let rentals = MemoryRentalStore::new();
        seed(&users, &rentals);
        let err = is_owner(&rentals, &users, Uuid::new_v4(), "alice@example.com").unwrap_err();
        assert_eq!(err.http_status(), 404);
    }
}
