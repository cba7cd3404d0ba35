use actix_session::Session;
use rand::Rng;

use crate::errors::AppError;

/// Session key under which the anti-forgery token is stored.
const TOKEN_KEY: &str = "csrf_token";

const TOKEN_BYTES: usize = 32;

/// Get the anti-forgery token for this session, generating and storing a
/// fresh one on first use. The token lives as long as the session; there is
/// no expiry or rotation.
pub fn get_or_create_token(session: &Session) -> String {
    if let Ok(Some(token)) = session.get::<String>(TOKEN_KEY) {
        return token;
    }
    let token = generate_token();
    let _ = session.insert(TOKEN_KEY, &token);
    token
}

/// Validate a submitted token against the session token. Must be called
/// before any statement executes for a mutating action: a mismatch aborts
/// the request with no side effects.
pub fn validate_csrf(session: &Session, submitted: &str) -> Result<(), AppError> {
    let stored = session
        .get::<String>(TOKEN_KEY)
        .unwrap_or(None)
        .unwrap_or_default();
    if stored.is_empty() || !tokens_match(&stored, submitted) {
        return Err(AppError::Csrf);
    }
    Ok(())
}

/// Generate a random token: 32 random bytes, hex-encoded.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; TOKEN_BYTES] = rng.random();
    hex::encode(bytes)
}

/// Constant-time equality to avoid leaking the token through timing.
fn tokens_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_is_hex_of_32_bytes() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn tokens_match_exact_equality_only() {
        let token = generate_token();
        assert!(tokens_match(&token, &token.clone()));
        assert!(!tokens_match(&token, ""));
        assert!(!tokens_match(&token, &token[..63]));

        let mut flipped = token.clone();
        let last = if token.ends_with('0') { "1" } else { "0" };
        flipped.replace_range(63..64, last);
        assert!(!tokens_match(&token, &flipped));
    }
}
