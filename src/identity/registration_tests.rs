use super::*;
use crate::identity::verify_password;
use crate::store::MemoryUserStore;

fn req(name: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest { name: name.into(), email: email.into(), password: password.into() }
}

#[test]
fn valid_registration_persists_hashed_password() {
    let store = MemoryUserStore::new();
    let user = register(&store, &req("Alice", "alice@example.com", "Abcdef1!")).unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.name, "Alice");
    assert_ne!(user.password_hash, "Abcdef1!");
    assert!(verify_password(&user.password_hash, "Abcdef1!"));
}

#[test]
fn duplicate_email_is_conflict_and_store_keeps_one_record() {
    let store = MemoryUserStore::new();
    let first = register(&store, &req("Alice", "alice@example.com", "Abcdef1!")).unwrap();
    let err = register(&store, &req("Other", "alice@example.com", "Ghijkl2?")).unwrap_err();
    assert_eq!(err.http_status(), 409);
    let stored = store.find_by_email("alice@example.com").unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.name, "Alice");
}

#[test]
fn bad_email_rejected_before_any_write() {
    let store = MemoryUserStore::new();
    for email in ["not-an-email", "a@b", "@example.com", "a b@example.com", ""] {
        let err = register(&store, &req("Alice", email, "Abcdef1!")).unwrap_err();
        assert_eq!(err.http_status(), 400, "email {:?}", email);
    }
    assert!(store.find_by_email("not-an-email").is_none());
}

#[test]
fn weak_passwords_rejected() {
    let store = MemoryUserStore::new();
    let cases = [
        "Ab1!",      // too short
        "abcdef1!",  // no uppercase
        "ABCDEF1!",  // no lowercase
        "Abcdefg!",  // no digit
        "Abcdefg1",  // no symbol
    ];
    for pw in cases {
        let err = register(&store, &req("Alice", "alice@example.com", pw)).unwrap_err();
        assert_eq!(err.http_status(), 400, "password {:?}", pw);
    }
    // None of the failed attempts left a record behind
    assert!(store.find_by_email("alice@example.com").is_none());
}

#[test]
fn name_is_trimmed_and_must_be_non_empty() {
    let store = MemoryUserStore::new();
    let err = register(&store, &req("   ", "alice@example.com", "Abcdef1!")).unwrap_err();
    assert_eq!(err.http_status(), 400);
    let user = register(&store, &req("  Alice  ", "alice@example.com", "Abcdef1!")).unwrap();
    assert_eq!(user.name, "Alice");
}
