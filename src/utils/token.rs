use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn generate_access_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Keyed digest under which a session token is stored; the raw token never
/// reaches the database.
pub fn token_digest(token: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_requested_length_and_alphabet() {
        let token = generate_access_token(48);
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn digest_depends_on_secret() {
        let a = token_digest("tok", "one");
        let b = token_digest("tok", "two");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(a, token_digest("tok", "one"));
    }
}
