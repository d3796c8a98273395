//! Email confirmation codes.
//!
//! A code has the form `"{issued_at_base36}-{hmac_hex}"`. The HMAC-SHA256,
//! keyed with the server secret, covers the user's id, email, `last_login`
//! and the issue time. Nothing is stored: a code is valid while it is not
//! older than the configured TTL and the user's state still matches.
//! Exchanging a code for a token stamps `last_login`, which invalidates
//! every code issued before it.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use yamdb_db::models::user::User;

type HmacSha256 = Hmac<Sha256>;

/// Default lifetime: three days.
const DEFAULT_TTL_SECS: i64 = 3 * 24 * 60 * 60;

/// Secret and lifetime used to issue and check codes.
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub secret: String,
    pub ttl_secs: i64,
}

impl ConfirmationConfig {
    /// Load the TTL from `CONFIRMATION_CODE_TTL_SECS` (default `259200`).
    /// The key is shared with JWT signing.
    pub fn from_env(secret: &str) -> Self {
        let ttl_secs: i64 = std::env::var("CONFIRMATION_CODE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_TTL_SECS.to_string())
            .parse()
            .expect("CONFIRMATION_CODE_TTL_SECS must be a valid i64");

        Self {
            secret: secret.to_string(),
            ttl_secs,
        }
    }
}

/// Issue a code for `user` at unix time `now`.
pub fn make_code(user: &User, config: &ConfirmationConfig, now: i64) -> String {
    let mac = user_mac(user, config, now);
    format!("{}-{}", to_base36(now), hex::encode(mac.finalize().into_bytes()))
}

/// `true` if `code` was issued for `user` in its current state and has not
/// expired at unix time `now`.
pub fn check_code(user: &User, code: &str, config: &ConfirmationConfig, now: i64) -> bool {
    let Some((ts, signature)) = code.split_once('-') else {
        return false;
    };
    let Some(issued_at) = from_base36(ts) else {
        return false;
    };
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };

    if issued_at > now || now - issued_at > config.ttl_secs {
        return false;
    }

    user_mac(user, config, issued_at)
        .verify_slice(&signature)
        .is_ok()
}

fn user_mac(user: &User, config: &ConfirmationConfig, issued_at: i64) -> HmacSha256 {
    let last_login = user
        .last_login
        .map(|t| t.timestamp_micros().to_string())
        .unwrap_or_default();

    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(config.secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC key length is unrestricted"));
    mac.update(user.id.to_string().as_bytes());
    mac.update(b"\0");
    mac.update(user.email.as_bytes());
    mac.update(b"\0");
    mac.update(last_login.as_bytes());
    mac.update(b"\0");
    mac.update(issued_at.to_string().as_bytes());
    mac
}

fn to_base36(mut n: i64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n <= 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn from_base36(s: &str) -> Option<i64> {
    // Bound the length so the value cannot overflow i64.
    if s.is_empty() || s.len() > 12 {
        return None;
    }
    i64::from_str_radix(s, 36).ok()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn config() -> ConfirmationConfig {
        ConfirmationConfig {
            secret: "confirmation-test-secret".to_string(),
            ttl_secs: 3600,
        }
    }

    fn user() -> User {
        let created = Utc.timestamp_opt(NOW - 86_400, 0).unwrap();
        User {
            id: 7,
            username: "reader".into(),
            email: "reader@example.com".into(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: "user".into(),
            is_staff: false,
            last_login: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn fresh_code_is_accepted() {
        let code = make_code(&user(), &config(), NOW);
        assert!(check_code(&user(), &code, &config(), NOW + 10));
    }

    #[test]
    fn code_has_timestamp_prefix() {
        let code = make_code(&user(), &config(), NOW);
        let (ts, sig) = code.split_once('-').unwrap();
        assert_eq!(from_base36(ts), Some(NOW));
        assert_eq!(sig.len(), 64);
        assert_eq!(hex::decode(sig).unwrap().len(), 32);
    }

    #[test]
    fn signature_hex_is_case_insensitive() {
        let code = make_code(&user(), &config(), NOW);
        assert!(check_code(&user(), &code.to_uppercase(), &config(), NOW + 10));
    }

    #[test]
    fn expired_code_is_rejected() {
        let code = make_code(&user(), &config(), NOW);
        assert!(check_code(&user(), &code, &config(), NOW + 3600));
        assert!(!check_code(&user(), &code, &config(), NOW + 3601));
    }

    #[test]
    fn code_from_the_future_is_rejected() {
        let code = make_code(&user(), &config(), NOW + 100);
        assert!(!check_code(&user(), &code, &config(), NOW));
    }

    #[test]
    fn login_invalidates_code() {
        let code = make_code(&user(), &config(), NOW);
        let mut logged_in = user();
        logged_in.last_login = Some(Utc.timestamp_opt(NOW + 5, 0).unwrap());
        assert!(!check_code(&logged_in, &code, &config(), NOW + 10));
    }

    #[test]
    fn email_change_invalidates_code() {
        let code = make_code(&user(), &config(), NOW);
        let mut changed = user();
        changed.email = "new@example.com".into();
        assert!(!check_code(&changed, &code, &config(), NOW + 10));
    }

    #[test]
    fn code_is_bound_to_user() {
        let code = make_code(&user(), &config(), NOW);
        let mut other = user();
        other.id = 8;
        assert!(!check_code(&other, &code, &config(), NOW + 10));
    }

    #[test]
    fn other_secret_rejects_code() {
        let code = make_code(&user(), &config(), NOW);
        let other = ConfirmationConfig {
            secret: "different".into(),
            ..config()
        };
        assert!(!check_code(&user(), &code, &other, NOW + 10));
    }

    #[test]
    fn tampered_timestamp_is_rejected() {
        let code = make_code(&user(), &config(), NOW);
        let (_, sig) = code.split_once('-').unwrap();
        let forged = format!("{}-{sig}", to_base36(NOW + 60));
        assert!(!check_code(&user(), &forged, &config(), NOW + 120));
    }

    #[test]
    fn malformed_codes_are_rejected() {
        for code in ["", "-", "abc", "zz-zz", "1-xyz", "!!!-00", "1-0", "1-0g"] {
            assert!(!check_code(&user(), code, &config(), NOW), "accepted {code:?}");
        }
    }

    #[test]
    fn base36_round_trip_edges() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
