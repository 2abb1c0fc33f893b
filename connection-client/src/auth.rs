//! Authorization header construction.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// Builds the `Authorization` header value for a credential pair.
///
/// A pre-hashed password wins over a plaintext one; with no usable
/// credentials the request goes out unauthenticated.
pub fn build_authorization(
    user: Option<&str>,
    hashed_password: Option<&str>,
    password: Option<&str>,
) -> Option<String> {
    let user = user.filter(|u| !u.is_empty())?;
    if let Some(hashed) = hashed_password.filter(|h| !h.is_empty()) {
        return Some(format!("Hashed {user}:{hashed}"));
    }
    let password = password.filter(|p| !p.is_empty())?;
    let digest = Sha256::digest(format!("{user}:{password}").as_bytes());
    Some(format!("Basic {}", STANDARD.encode(digest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_credential_takes_precedence() {
        let header = build_authorization(Some("admin"), Some("abc123"), Some("plaintext"));
        assert_eq!(header.as_deref(), Some("Hashed admin:abc123"));
    }

    #[test]
    fn plaintext_credential_uses_basic_digest() {
        let header = build_authorization(Some("admin"), None, Some("hunter2")).unwrap();
        assert!(header.starts_with("Basic "));
        let encoded = header.strip_prefix("Basic ").unwrap();
        let digest = Sha256::digest(b"admin:hunter2");
        assert_eq!(encoded, STANDARD.encode(digest));
    }

    #[test]
    fn missing_credentials_produce_no_header() {
        assert_eq!(build_authorization(None, None, None), None);
        assert_eq!(build_authorization(Some("admin"), None, None), None);
        assert_eq!(build_authorization(None, Some("h"), Some("p")), None);
        assert_eq!(build_authorization(Some(""), Some("h"), None), None);
    }
}
