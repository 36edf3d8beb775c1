use thiserror::Error;

/// Errors raised at the edges of the sandbox. The projection engine itself
/// is infallible.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Policy error: {0}")]
    Policy(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = SandboxError::Validation("years must be >= 0".to_string());
        assert_eq!(err.to_string(), "Validation error: years must be >= 0");
    }

    #[test]
    fn policy_error_display() {
        let err = SandboxError::Policy("crash_multiplier must be between 0 and 1".to_string());
        assert_eq!(
            err.to_string(),
            "Policy error: crash_multiplier must be between 0 and 1"
        );
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "policy.toml");
        let err: SandboxError = io_err.into();
        assert!(matches!(err, SandboxError::Io(_)));
        assert!(err.to_string().contains("policy.toml"));
    }

    #[test]
    fn json_error_from_conversion() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SandboxError = result.unwrap_err().into();
        assert!(matches!(err, SandboxError::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }
}
