use std::time::Duration;

use gym_guard::auth::token::{Claims, MacAlgorithm, SigningKey, TokenCodec, VerificationFailure};

const KEY_A: &str = "integration-signing-key-A-0123456789abcdef";
const KEY_B: &str = "integration-signing-key-B-0123456789abcdef";

fn codec_with(key: &str, algorithm: MacAlgorithm) -> TokenCodec {
    let key = SigningKey::new(key).unwrap();
    TokenCodec::new(&key, algorithm, Duration::from_secs(30 * 60)).unwrap()
}

fn codec() -> TokenCodec {
    codec_with(KEY_A, MacAlgorithm::HmacSha256)
}

fn scenario_claims() -> Claims {
    Claims {
        identity: "a@b.com".to_string(),
        issued_at: 1000,
        expires_at: 2800,
    }
}

/// Replace the character at `index` with a different base64url character
fn flip_char(token: &str, index: usize) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}

#[test]
fn test_scenario_valid_then_expired() {
    let codec = codec();
    let token = codec.seal(&scenario_claims()).unwrap();

    let claims = codec.verify_at(&token, 2000).unwrap();
    assert_eq!(claims.identity, "a@b.com");
    assert_eq!(claims, scenario_claims());

    assert_eq!(codec.verify_at(&token, 3000), Err(VerificationFailure::Expired));
}

#[test]
fn test_scenario_flipped_claim_character() {
    let codec = codec();
    let token = codec.seal(&scenario_claims()).unwrap();
    let tampered = flip_char(&token, 0);

    assert_ne!(tampered, token);
    assert_eq!(
        codec.verify_at(&tampered, 2000),
        Err(VerificationFailure::BadSignature)
    );
}

#[test]
fn test_round_trip_before_expiry() {
    let codec = codec();
    for identity in ["a@b.com", "front.desk@gym.test", "ünïcødé@gym.test"] {
        let issued = codec.issue_at(identity, 50_000).unwrap();
        let verified = codec.verify_at(&issued.token, 50_000 + 60).unwrap();
        assert_eq!(verified, issued.claims);
        assert_eq!(verified.identity, identity);
    }
}

#[test]
fn test_issue_uses_wall_clock() {
    let codec = codec();
    let issued = codec.issue("a@b.com").unwrap();
    let verified = codec.verify(&issued.token).unwrap();
    assert_eq!(verified.identity, "a@b.com");
    assert_eq!(verified.expires_at - verified.issued_at, 1800);
}

#[test]
fn test_expired_after_lifetime_with_mocked_clock() {
    let codec = codec();
    let t = 1_700_000_000;
    let issued = codec.issue_at("a@b.com", t).unwrap();

    assert!(codec.verify_at(&issued.token, t + 30 * 60).is_ok());
    assert_eq!(
        codec.verify_at(&issued.token, t + 31 * 60),
        Err(VerificationFailure::Expired)
    );
}

#[test]
fn test_every_claim_character_is_covered_by_mac() {
    let codec = codec();
    // 58 claim bytes, so the last character carries unused low bits
    let issued = codec.issue_at("ab@b.com", 1000).unwrap();
    let claim_len = issued.token.find('.').unwrap();
    assert_ne!(claim_len % 4, 0);

    for index in 0..claim_len {
        assert_eq!(
            codec.verify_at(&flip_char(&issued.token, index), 2000),
            Err(VerificationFailure::BadSignature),
            "flip at {}",
            index
        );
    }
}

#[test]
fn test_last_claim_character_any_substitute_is_bad_signature() {
    let codec = codec();
    let issued = codec.issue_at("ab@b.com", 1000).unwrap();
    let last = issued.token.find('.').unwrap() - 1;
    let original = issued.token.as_bytes()[last] as char;

    let alphabet = ('A'..='Z').chain('a'..='z').chain('0'..='9').chain(['-', '_']);
    for replacement in alphabet.filter(|c| *c != original) {
        let mut tampered: Vec<char> = issued.token.chars().collect();
        tampered[last] = replacement;
        let tampered: String = tampered.into_iter().collect();
        assert_eq!(
            codec.verify_at(&tampered, 2000),
            Err(VerificationFailure::BadSignature),
            "replacement {:?}",
            replacement
        );
    }
}

#[test]
fn test_non_alphabet_claim_character_is_bad_signature() {
    let codec = codec();
    let issued = codec.issue_at("ab@b.com", 1000).unwrap();
    let mut tampered: Vec<char> = issued.token.chars().collect();
    tampered[3] = '+';
    let tampered: String = tampered.into_iter().collect();

    assert_eq!(
        codec.verify_at(&tampered, 2000),
        Err(VerificationFailure::BadSignature)
    );
}

#[test]
fn test_tampered_mac_is_bad_signature() {
    let codec = codec();
    let token = codec.seal(&scenario_claims()).unwrap();
    let mac_start = token.find('.').unwrap() + 1;

    assert_eq!(
        codec.verify_at(&flip_char(&token, mac_start), 2000),
        Err(VerificationFailure::BadSignature)
    );
}

#[test]
fn test_swapped_claims_keep_bad_signature() {
    let codec = codec();
    let victim = codec.seal(&scenario_claims()).unwrap();
    let attacker = codec
        .seal(&Claims {
            identity: "admin@gym.test".to_string(),
            issued_at: 1000,
            expires_at: 2800,
        })
        .unwrap();

    let (attacker_claims, _) = attacker.split_once('.').unwrap();
    let (_, victim_mac) = victim.split_once('.').unwrap();
    let forged = format!("{}.{}", attacker_claims, victim_mac);

    assert_eq!(codec.verify_at(&forged, 2000), Err(VerificationFailure::BadSignature));
}

#[test]
fn test_other_secret_is_bad_signature() {
    let issuer = codec_with(KEY_A, MacAlgorithm::HmacSha256);
    let verifier = codec_with(KEY_B, MacAlgorithm::HmacSha256);
    let token = issuer.seal(&scenario_claims()).unwrap();

    assert_eq!(verifier.verify_at(&token, 2000), Err(VerificationFailure::BadSignature));
    // Expiry is never consulted for unauthenticated claims
    assert_eq!(verifier.verify_at(&token, 9999), Err(VerificationFailure::BadSignature));
}

#[test]
fn test_other_algorithm_is_bad_signature() {
    let sha256 = codec_with(KEY_A, MacAlgorithm::HmacSha256);
    let sha512 = codec_with(KEY_A, MacAlgorithm::HmacSha512);

    let token = sha512.seal(&scenario_claims()).unwrap();
    assert_eq!(sha512.verify_at(&token, 2000).unwrap(), scenario_claims());
    assert_eq!(sha256.verify_at(&token, 2000), Err(VerificationFailure::BadSignature));
}

#[test]
fn test_same_key_other_instance_verifies() {
    let first = codec();
    let second = codec();
    let token = first.seal(&scenario_claims()).unwrap();
    assert_eq!(second.verify_at(&token, 2000).unwrap(), scenario_claims());
}

#[test]
fn test_previous_backend_tokens_are_malformed() {
    // base64url(json({"payload": ..., "signature": ...})) as issued before
    let legacy = "eyJwYXlsb2FkIjogeyJlbWFpbCI6ICJhQGIuY29tIiwgImlzc3VlZF9hdCI6IDEwMDB9LCAic2lnbmF0dXJlIjogImFiYyJ9";
    assert_eq!(codec().verify_at(legacy, 2000), Err(VerificationFailure::Malformed));
}
