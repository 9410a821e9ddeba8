use gym_guard::auth::credential::{DigestKind, HashingCost, PasswordHasher};

fn hasher() -> PasswordHasher {
    PasswordHasher::new(HashingCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

#[test]
fn test_hash_then_verify() {
    let hasher = hasher();
    for password in ["1234", "correct horse battery staple", "pässwörd", ""] {
        let digest = hasher.hash(password).unwrap();
        assert_eq!(DigestKind::detect(&digest), DigestKind::Argon2);
        assert!(hasher.verify(password, &digest), "password {:?}", password);
    }
}

#[test]
fn test_different_passwords_do_not_verify() {
    let hasher = hasher();
    let digest = hasher.hash("gym-owner-pass").unwrap();

    for candidate in ["gym-owner-pas", "gym-owner-pass ", "GYM-OWNER-PASS", "", "1234"] {
        assert!(!hasher.verify(candidate, &digest), "candidate {:?}", candidate);
    }
}

#[test]
fn test_digest_from_other_cost_still_verifies() {
    let weak = hasher();
    let digest = weak.hash("gym-owner-pass").unwrap();

    let default_cost = PasswordHasher::new(HashingCost::default()).unwrap();
    assert_eq!(default_cost.cost(), HashingCost::default());
    assert_ne!(weak.cost(), default_cost.cost());
    assert!(default_cost.verify("gym-owner-pass", &digest));
    assert!(default_cost.needs_rehash(&digest));
    assert!(!weak.needs_rehash(&digest));
}

#[test]
fn test_legacy_sha256_digest() {
    let hasher = hasher();
    // sha256("password")
    let legacy = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

    assert!(hasher.verify("password", legacy));
    assert!(!hasher.verify("Password", legacy));
    // Upper-case hex was never written by the old backend
    assert!(!hasher.verify("password", &legacy.to_uppercase()));
    assert!(hasher.needs_rehash(legacy));
}
