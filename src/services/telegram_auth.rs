//! Telegram authentication payload verification.
//!
//! Two payload shapes share one HMAC primitive: the Login Widget sends a
//! flat JSON object, the Web App sends a URL-encoded `initData` blob. Both
//! are signed by Telegram with `HMAC-SHA256(SHA256(bot_token), canonical)`
//! where `canonical` is the sorted `key=value` list joined with newlines.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Login Widget payloads expire after five minutes.
pub const LOGIN_WIDGET_MAX_AGE_SECS: i64 = 5 * 60;

/// Web-App sessions persist much longer than widget logins.
pub const INIT_DATA_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Errors raised while verifying a Telegram authentication payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TelegramAuthError {
    #[error("Hash is missing from payload")]
    MissingHash,

    #[error("Invalid authentication data")]
    InvalidSignature,

    #[error("Authentication expired")]
    Expired,

    #[error("User data not found")]
    MissingUser,

    #[error("User ID is required")]
    MissingUserId,

    #[error("Invalid user data format")]
    MalformedUser,
}

/// The external identity extracted from a verified payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramIdentity {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Derive the shared HMAC key from the bot token: raw SHA-256 bytes, not hex.
#[must_use]
pub fn secret_key(bot_token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bot_token.as_bytes());
    hasher.finalize().into()
}

/// Hex HMAC-SHA256 of `canonical` under the bot token's derived key.
#[must_use]
pub fn sign_canonical(bot_token: &str, canonical: &str) -> String {
    let key = secret_key(bot_token);
    let mut mac = HmacSha256::new_from_slice(&key).expect("HMAC accepts any key length");
    mac.update(canonical.as_bytes());

    hex_encode(&mac.finalize().into_bytes())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

fn signature_matches(bot_token: &str, canonical: &str, supplied: &str) -> bool {
    let expected = sign_canonical(bot_token, canonical);
    bool::from(expected.as_bytes().ct_eq(supplied.as_bytes()))
}

/// Canonical string for a Login Widget payload: every field except `hash`,
/// keys sorted, joined as `key=value` lines.
#[must_use]
pub fn widget_canonical_string(fields: &serde_json::Map<String, serde_json::Value>) -> String {
    let mut keys: Vec<&String> = fields.keys().filter(|k| k.as_str() != "hash").collect();
    keys.sort();

    keys.iter()
        .map(|key| format!("{key}={}", value_as_string(&fields[key.as_str()])))
        .collect::<Vec<_>>()
        .join("\n")
}

fn value_as_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Verify a Login Widget payload and extract the signed identity.
///
/// `now_unix` is the receipt time in unix seconds; the payload's
/// `auth_date` must be within [`LOGIN_WIDGET_MAX_AGE_SECS`] of it.
pub fn verify_login_widget(
    bot_token: &str,
    fields: &serde_json::Map<String, serde_json::Value>,
    now_unix: i64,
) -> Result<TelegramIdentity, TelegramAuthError> {
    let supplied = fields
        .get("hash")
        .and_then(serde_json::Value::as_str)
        .ok_or(TelegramAuthError::MissingHash)?;

    let canonical = widget_canonical_string(fields);
    if !signature_matches(bot_token, &canonical, supplied) {
        return Err(TelegramAuthError::InvalidSignature);
    }

    let auth_date = fields
        .get("auth_date")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);
    if now_unix - auth_date > LOGIN_WIDGET_MAX_AGE_SECS {
        return Err(TelegramAuthError::Expired);
    }

    let id = fields
        .get("id")
        .and_then(serde_json::Value::as_i64)
        .ok_or(TelegramAuthError::MissingUserId)?;
    if id == 0 {
        return Err(TelegramAuthError::MissingUserId);
    }

    Ok(TelegramIdentity {
        id,
        username: string_field(fields, "username"),
        first_name: string_field(fields, "first_name"),
        last_name: string_field(fields, "last_name"),
    })
}

fn string_field(
    fields: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<String> {
    fields
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}

/// Split an `initData` blob into key/value pairs, preserving the raw
/// percent-encoding of the values. Pairs with an empty key or value are
/// dropped, and values keep any `=` they contain.
#[must_use]
pub fn parse_init_data(init_data: &str) -> Vec<(String, String)> {
    init_data
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Canonical string over the raw (still percent-encoded) values.
#[must_use]
pub fn init_data_canonical_raw(pairs: &[(String, String)]) -> String {
    let mut lines: Vec<String> = pairs
        .iter()
        .filter(|(key, _)| key != "hash")
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    lines.sort();
    lines.join("\n")
}

/// Canonical string over percent-decoded values. A value that fails to
/// decode is kept raw, which simply makes the comparison fail.
#[must_use]
pub fn init_data_canonical_decoded(pairs: &[(String, String)]) -> String {
    let mut lines: Vec<String> = pairs
        .iter()
        .filter(|(key, _)| key != "hash")
        .map(|(key, value)| {
            let decoded = urlencoding::decode(value)
                .map_or_else(|_| value.clone(), |cow| cow.into_owned());
            format!("{key}={decoded}")
        })
        .collect();
    lines.sort();
    lines.join("\n")
}

/// Verify a Web-App `initData` blob and extract the signed identity.
///
/// Verification is attempted twice: first against the raw percent-encoded
/// values, then against decoded values. The encoding state of forwarded
/// `initData` is not consistent across client environments, so the two
/// passes are deliberately independent canonicalizations.
pub fn verify_init_data(
    bot_token: &str,
    init_data: &str,
    now_unix: i64,
) -> Result<TelegramIdentity, TelegramAuthError> {
    let pairs = parse_init_data(init_data);

    let supplied = pairs
        .iter()
        .find(|(key, _)| key == "hash")
        .map(|(_, value)| value.clone())
        .ok_or(TelegramAuthError::MissingHash)?;

    let raw_ok = signature_matches(bot_token, &init_data_canonical_raw(&pairs), &supplied);
    let verified = raw_ok
        || signature_matches(
            bot_token,
            &init_data_canonical_decoded(&pairs),
            &supplied,
        );
    if !verified {
        return Err(TelegramAuthError::InvalidSignature);
    }

    let user_raw = pairs
        .iter()
        .find(|(key, _)| key == "user")
        .map(|(_, value)| value.as_str())
        .ok_or(TelegramAuthError::MissingUser)?;

    let user_json = urlencoding::decode(user_raw).map_err(|_| TelegramAuthError::MalformedUser)?;
    let identity: TelegramIdentity =
        serde_json::from_str(&user_json).map_err(|_| TelegramAuthError::MalformedUser)?;
    if identity.id == 0 {
        return Err(TelegramAuthError::MissingUserId);
    }

    let auth_date = pairs
        .iter()
        .find(|(key, _)| key == "auth_date")
        .and_then(|(_, value)| value.parse::<i64>().ok());
    if let Some(auth_date) = auth_date {
        if now_unix - auth_date > INIT_DATA_MAX_AGE_SECS {
            return Err(TelegramAuthError::Expired);
        }
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    const TOKEN: &str = "123456:ABC-TestBotToken";

    fn widget_payload(auth_date: i64) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(42));
        fields.insert("first_name".to_string(), json!("Al"));
        fields.insert("username".to_string(), json!("al_dev"));
        fields.insert("auth_date".to_string(), json!(auth_date));

        let canonical = widget_canonical_string(&fields);
        let hash = sign_canonical(TOKEN, &canonical);
        fields.insert("hash".to_string(), json!(hash));

        fields
    }

    fn flip_last_char(hash: &str) -> String {
        let mut chars: Vec<char> = hash.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'a' { 'b' } else { 'a' };
        chars.into_iter().collect()
    }

    #[test]
    fn widget_canonical_sorts_keys_and_skips_hash() {
        let mut fields = Map::new();
        fields.insert("username".to_string(), json!("zed"));
        fields.insert("id".to_string(), json!(7));
        fields.insert("auth_date".to_string(), json!(1_700_000_000));
        fields.insert("hash".to_string(), json!("deadbeef"));

        assert_eq!(
            widget_canonical_string(&fields),
            "auth_date=1700000000\nid=7\nusername=zed"
        );
    }

    #[test]
    fn widget_verifies_correctly_signed_payload() {
        let now = 1_700_000_000;
        let fields = widget_payload(now - 10);

        let identity = verify_login_widget(TOKEN, &fields, now).unwrap();
        assert_eq!(identity.id, 42);
        assert_eq!(identity.username.as_deref(), Some("al_dev"));
        assert_eq!(identity.first_name.as_deref(), Some("Al"));
    }

    #[test]
    fn widget_rejects_flipped_hash_character() {
        let now = 1_700_000_000;
        let mut fields = widget_payload(now - 10);
        let tampered = flip_last_char(fields["hash"].as_str().unwrap());
        fields.insert("hash".to_string(), json!(tampered));

        assert_eq!(
            verify_login_widget(TOKEN, &fields, now),
            Err(TelegramAuthError::InvalidSignature)
        );
    }

    #[test]
    fn widget_rejects_missing_hash() {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(42));
        fields.insert("auth_date".to_string(), json!(1_700_000_000));

        assert_eq!(
            verify_login_widget(TOKEN, &fields, 1_700_000_000),
            Err(TelegramAuthError::MissingHash)
        );
    }

    #[test]
    fn widget_rejects_tampered_field() {
        let now = 1_700_000_000;
        let mut fields = widget_payload(now - 10);
        fields.insert("id".to_string(), json!(43));

        assert_eq!(
            verify_login_widget(TOKEN, &fields, now),
            Err(TelegramAuthError::InvalidSignature)
        );
    }

    #[test]
    fn widget_freshness_boundary_at_five_minutes() {
        let now = 1_700_000_000;

        let fresh = widget_payload(now - 299);
        assert!(verify_login_widget(TOKEN, &fresh, now).is_ok());

        let exact = widget_payload(now - 300);
        assert!(verify_login_widget(TOKEN, &exact, now).is_ok());

        let stale = widget_payload(now - 301);
        assert_eq!(
            verify_login_widget(TOKEN, &stale, now),
            Err(TelegramAuthError::Expired)
        );
    }

    #[test]
    fn parse_init_data_preserves_encoding_and_embedded_equals() {
        let pairs = parse_init_data("user=%7B%22id%22%3A1%7D&query=a%3Db=c&auth_date=123");

        assert_eq!(
            pairs,
            vec![
                ("user".to_string(), "%7B%22id%22%3A1%7D".to_string()),
                ("query".to_string(), "a%3Db=c".to_string()),
                ("auth_date".to_string(), "123".to_string()),
            ]
        );
    }

    #[test]
    fn parse_init_data_drops_empty_pairs() {
        let pairs = parse_init_data("a=1&&b=&=2&c=3");

        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }

    fn encoded_user(id: i64) -> String {
        let json = format!(r#"{{"id":{id},"username":"park_runner","first_name":"Par"}}"#);
        urlencoding::encode(&json).into_owned()
    }

    fn init_data_signed_raw(auth_date: i64) -> String {
        let user = encoded_user(9);
        let unsigned = format!("auth_date={auth_date}&query_id=AAE1&user={user}");
        let pairs = parse_init_data(&unsigned);
        let hash = sign_canonical(TOKEN, &init_data_canonical_raw(&pairs));

        format!("{unsigned}&hash={hash}")
    }

    fn init_data_signed_decoded(auth_date: i64) -> String {
        let user = encoded_user(9);
        let unsigned = format!("auth_date={auth_date}&query_id=AAE1&user={user}");
        let pairs = parse_init_data(&unsigned);
        let hash = sign_canonical(TOKEN, &init_data_canonical_decoded(&pairs));

        format!("{unsigned}&hash={hash}")
    }

    #[test]
    fn init_data_verifies_on_raw_encoding() {
        let now = 1_700_000_000;
        let init_data = init_data_signed_raw(now - 60);

        let identity = verify_init_data(TOKEN, &init_data, now).unwrap();
        assert_eq!(identity.id, 9);
        assert_eq!(identity.username.as_deref(), Some("park_runner"));
    }

    #[test]
    fn init_data_verifies_on_decoded_second_attempt() {
        let now = 1_700_000_000;
        let init_data = init_data_signed_decoded(now - 60);

        // The raw canonical differs from the signed one, so only the
        // decoded pass can match.
        let pairs = parse_init_data(&init_data);
        assert_ne!(
            init_data_canonical_raw(&pairs),
            init_data_canonical_decoded(&pairs)
        );

        let identity = verify_init_data(TOKEN, &init_data, now).unwrap();
        assert_eq!(identity.id, 9);
    }

    #[test]
    fn init_data_rejects_when_neither_canonicalization_matches() {
        let now = 1_700_000_000;
        let init_data = init_data_signed_raw(now - 60);
        let tampered = init_data.replace("query_id=AAE1", "query_id=AAE2");

        assert_eq!(
            verify_init_data(TOKEN, &tampered, now),
            Err(TelegramAuthError::InvalidSignature)
        );
    }

    #[test]
    fn init_data_rejects_missing_hash() {
        assert_eq!(
            verify_init_data(TOKEN, "auth_date=123&user=x", 1_700_000_000),
            Err(TelegramAuthError::MissingHash)
        );
    }

    #[test]
    fn init_data_rejects_malformed_user_json() {
        let unsigned = "auth_date=123&user=not-json";
        let pairs = parse_init_data(unsigned);
        let hash = sign_canonical(TOKEN, &init_data_canonical_raw(&pairs));
        let init_data = format!("{unsigned}&hash={hash}");

        assert_eq!(
            verify_init_data(TOKEN, &init_data, 1_700_000_000),
            Err(TelegramAuthError::MalformedUser)
        );
    }

    #[test]
    fn init_data_rejects_stale_auth_date() {
        let now = 1_700_000_000;
        let init_data = init_data_signed_raw(now - INIT_DATA_MAX_AGE_SECS - 1);

        assert_eq!(
            verify_init_data(TOKEN, &init_data, now),
            Err(TelegramAuthError::Expired)
        );
    }

    #[test]
    fn init_data_accepts_day_old_payload() {
        let now = 1_700_000_000;
        let init_data = init_data_signed_raw(now - INIT_DATA_MAX_AGE_SECS + 60);

        assert!(verify_init_data(TOKEN, &init_data, now).is_ok());
    }

    #[test]
    fn secret_key_is_raw_sha256_of_token() {
        let key = secret_key(TOKEN);

        let mut hasher = Sha256::new();
        hasher.update(TOKEN.as_bytes());
        let expected: [u8; 32] = hasher.finalize().into();

        assert_eq!(key, expected);
    }

    #[test]
    fn sign_canonical_is_deterministic_hex() {
        let a = sign_canonical(TOKEN, "auth_date=1\nid=2");
        let b = sign_canonical(TOKEN, "auth_date=1\nid=2");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
