//! obs-websocket password authentication.
//!
//! When a password is set, the server's `Hello` carries a `salt` and a
//! `challenge`.  The client answers in `Identify` with:
//!
//! ```text
//! secret = base64(sha256(password + salt))
//! auth   = base64(sha256(secret + challenge))
//! ```
//!
//! The password never travels over the socket.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Computes the `authentication` string for `Identify`.
pub fn compute_auth_response(password: &str, salt: &str, challenge: &str) -> String {
    let secret = base64_sha256(&[password.as_bytes(), salt.as_bytes()]);
    base64_sha256(&[secret.as_bytes(), challenge.as_bytes()])
}

fn base64_sha256(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_is_base64_of_32_byte_digest() {
        let auth = compute_auth_response("supersecret", "salt", "challenge");
        let raw = STANDARD.decode(&auth).expect("valid base64");
        assert_eq!(raw.len(), 32);
        assert_eq!(auth.len(), 44);
    }

    #[test]
    fn test_auth_response_is_deterministic() {
        assert_eq!(
            compute_auth_response("pw", "s", "c"),
            compute_auth_response("pw", "s", "c")
        );
    }

    #[test]
    fn test_auth_response_depends_on_every_input() {
        let base = compute_auth_response("pw", "s", "c");
        assert_ne!(base, compute_auth_response("pw2", "s", "c"));
        assert_ne!(base, compute_auth_response("pw", "s2", "c"));
        assert_ne!(base, compute_auth_response("pw", "s", "c2"));
    }

    #[test]
    fn test_auth_response_chains_through_intermediate_secret() {
        // Recompute the two steps by hand.
        let secret = STANDARD.encode(Sha256::digest(b"pwsalt"));
        let expected = STANDARD.encode(Sha256::digest(format!("{secret}chal").as_bytes()));
        assert_eq!(compute_auth_response("pw", "salt", "chal"), expected);
    }
}
