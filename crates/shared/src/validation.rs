//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a free-text archive/delete reason.
const MAX_REASON_LENGTH: usize = 500;

/// Maximum length of an actor identity string.
const MAX_ACTOR_LENGTH: usize = 128;

/// Maximum length of a chat session identifier.
const MAX_SESSION_ID_LENGTH: usize = 64;

/// Validates a chat session identifier: non-empty, bounded, and limited to
/// characters safe to embed in log lines and queries.
pub fn validate_session_id(session_id: &str) -> Result<(), ValidationError> {
    if session_id.is_empty() || session_id.len() > MAX_SESSION_ID_LENGTH {
        let mut err = ValidationError::new("session_id_length");
        err.message = Some("Session ID must be 1-64 characters".into());
        return Err(err);
    }
    if !session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("session_id_charset");
        err.message = Some("Session ID may contain only alphanumerics, '-' and '_'".into());
        return Err(err);
    }
    Ok(())
}

/// Validates an actor identity string supplied by the caller.
pub fn validate_actor(actor: &str) -> Result<(), ValidationError> {
    if actor.trim().is_empty() || actor.len() > MAX_ACTOR_LENGTH {
        let mut err = ValidationError::new("actor_length");
        err.message = Some("Actor must be 1-128 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a free-text audit reason.
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.len() > MAX_REASON_LENGTH {
        let mut err = ValidationError::new("reason_length");
        err.message = Some("Reason must be at most 500 characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_id() {
        assert!(validate_session_id("session-42_a").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("bad session").is_err());
        assert!(validate_session_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_actor() {
        assert!(validate_actor("ops@example.com").is_ok());
        assert!(validate_actor("   ").is_err());
        assert!(validate_actor(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert!(validate_reason("quarterly cleanup").is_ok());
        assert!(validate_reason("").is_ok());
        assert!(validate_reason(&"r".repeat(501)).is_err());
    }
}
