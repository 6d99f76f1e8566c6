use thiserror::Error;

/// Failures while bringing a service up.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: AppError = std::io::Error::other("bind failed").into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().contains("bind failed"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: AppError = config::ConfigError::NotFound("port".to_string()).into();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
