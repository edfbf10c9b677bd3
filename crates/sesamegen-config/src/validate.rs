// ── Validation pipeline ──
//
// Plain fail-fast functions over the immutable configuration record.
// Applied in fixed precedence: deprecation warning, uuid/address
// invariant, session range, hex fields, then per-trigger checks.
// The first failure aborts the whole pass.

use crate::error::ConfigError;
use crate::model::{ServerConfig, TriggerConfig};

/// Required length of the registered-device secret, in hex chars.
pub const SECRET_HEX_LEN: usize = 32;

const MAX_SESSIONS_MIN: u8 = 1;
const MAX_SESSIONS_MAX: u8 = 9;

/// True iff `s` is exactly `valid_len` chars long and every char is an
/// ASCII hex digit.
pub fn is_hex_string(s: &str, valid_len: usize) -> bool {
    s.len() == valid_len && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Check a hex-string field for exact length and hex-only composition.
pub fn hex_string_field(
    field: &'static str,
    value: &str,
    valid_len: usize,
) -> Result<(), ConfigError> {
    if is_hex_string(value, valid_len) {
        Ok(())
    } else {
        Err(ConfigError::InvalidHexString {
            field,
            len: valid_len,
        })
    }
}

/// The shared addressing invariant: at least one of `uuid`/`address`.
///
/// Runs on the server record (trivially satisfied there, since `uuid`
/// is schema-required) and on every trigger record.
fn require_uuid_or_address(has_uuid: bool, has_address: bool) -> Result<(), ConfigError> {
    if has_uuid || has_address {
        Ok(())
    } else {
        Err(ConfigError::UuidOrAddressRequired)
    }
}

fn warn_address_deprecated(config: &ServerConfig) {
    if config.address.is_some() {
        tracing::warn!(
            "the 'address' option for sesame_server is deprecated and has no effect; \
             it will be removed in a future release"
        );
    }
}

fn validate_max_sessions(got: u8) -> Result<(), ConfigError> {
    if (MAX_SESSIONS_MIN..=MAX_SESSIONS_MAX).contains(&got) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: "max_sessions",
            min: i64::from(MAX_SESSIONS_MIN),
            max: i64::from(MAX_SESSIONS_MAX),
            got: i64::from(got),
        })
    }
}

fn validate_trigger(trigger: &TriggerConfig) -> Result<(), ConfigError> {
    require_uuid_or_address(trigger.uuid.is_some(), trigger.address.is_some())
}

/// Validate a type-checked server block. Shape validation has already
/// happened during deserialization; this enforces the cross-field
/// invariants, ranges, and formats.
pub fn validate_server(config: &ServerConfig) -> Result<(), ConfigError> {
    warn_address_deprecated(config);
    require_uuid_or_address(true, config.address.is_some())?;
    validate_max_sessions(config.max_sessions)?;
    if let Some(secret) = &config.secret {
        hex_string_field("secret", secret, SECRET_HEX_LEN)?;
    }
    for trigger in &config.triggers {
        validate_trigger(trigger)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Document;

    fn server(yaml: &str) -> ServerConfig {
        Document::from_yaml(yaml).unwrap().server_config().unwrap()
    }

    #[test]
    fn hex_string_accepts_exact_hex() {
        assert!(is_hex_string("00aaBBcc", 8));
        assert!(is_hex_string("0123456789abcdefABCDEF0123456789", 32));
    }

    #[test]
    fn hex_string_rejects_wrong_length() {
        assert!(!is_hex_string("00aabbcc", 6));
        assert!(!is_hex_string("00aa", 8));
        assert!(!is_hex_string("", 1));
    }

    #[test]
    fn hex_string_rejects_non_hex_chars() {
        assert!(!is_hex_string("00aabbcg", 8));
        assert!(!is_hex_string("zzzzzzzz", 8));
        assert!(!is_hex_string("00 aabbc", 8));
    }

    #[test]
    fn hex_field_error_names_field_and_length() {
        let err = hex_string_field("secret", "nothex", SECRET_HEX_LEN).unwrap_err();
        assert_eq!(err.to_string(), "'secret' must be a 32 bytes hex string");
    }

    #[test]
    fn max_sessions_boundaries() {
        for sessions in [1, 9] {
            let config = server(&format!(
                "sesame_server:\n  uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n  max_sessions: {sessions}\n"
            ));
            assert!(validate_server(&config).is_ok());
        }
        for sessions in [0, 10] {
            let config = server(&format!(
                "sesame_server:\n  uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n  max_sessions: {sessions}\n"
            ));
            let err = validate_server(&config).unwrap_err();
            assert!(err.to_string().contains("max_sessions"));
        }
    }

    #[test]
    fn trigger_without_uuid_or_address_fails_with_exact_message() {
        let config = server(
            "sesame_server:\n\
             \x20 uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n\
             \x20 triggers:\n\
             \x20   - name: Front Door\n",
        );
        let err = validate_server(&config).unwrap_err();
        assert_eq!(err.to_string(), "Either 'uuid' or 'address' is required");
    }

    #[test]
    fn trigger_with_address_alone_is_valid() {
        let config = server(
            "sesame_server:\n\
             \x20 uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n\
             \x20 triggers:\n\
             \x20   - address: aa:bb:cc:dd:ee:ff\n",
        );
        assert!(validate_server(&config).is_ok());
    }

    #[test]
    fn trigger_with_uuid_alone_is_valid() {
        let config = server(
            "sesame_server:\n\
             \x20 uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n\
             \x20 triggers:\n\
             \x20   - uuid: 2845efbc-0afc-11e9-8eb4-0002a5d5c51c\n",
        );
        assert!(validate_server(&config).is_ok());
    }

    #[test]
    fn deprecated_address_does_not_fail_validation() {
        let config = server(
            "sesame_server:\n\
             \x20 uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n\
             \x20 address: \"01:02:03:04:05:06\"\n",
        );
        assert!(validate_server(&config).is_ok());
    }

    #[test]
    fn secret_of_wrong_shape_fails() {
        let config = server(
            "sesame_server:\n\
             \x20 uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n\
             \x20 secret: \"zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz\"\n",
        );
        let err = validate_server(&config).unwrap_err();
        assert_eq!(err.to_string(), "'secret' must be a 32 bytes hex string");
    }

    #[test]
    fn secret_of_correct_shape_passes() {
        let config = server(
            "sesame_server:\n\
             \x20 uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n\
             \x20 secret: \"0123456789abcdef0123456789abcdef\"\n",
        );
        assert!(validate_server(&config).is_ok());
    }

    #[test]
    fn zero_triggers_is_valid() {
        let config = server("sesame_server:\n  uuid: 1845efbc-0afc-11e9-8eb4-0002a5d5c51b\n");
        assert!(validate_server(&config).is_ok());
    }
}
