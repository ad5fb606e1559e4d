use crate::portal::{config::DEFAULT_TIMEOUT, AppConfig, AuthError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub timeout: u64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            timeout: DEFAULT_TIMEOUT.as_secs(),
        }
    }

    pub fn set_timeout(&mut self, seconds: u64) {
        self.timeout = seconds;
    }

    /// Builds the validated client configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` for an unusable URL or a zero timeout.
    pub fn config(&self) -> Result<AppConfig, AuthError> {
        AppConfig::new(&self.api_url, Duration::from_secs(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new("https://api.school.test".to_string());
        assert_eq!(args.api_url, "https://api.school.test");
        assert_eq!(args.timeout, 10);

        let config = args.config().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut args = GlobalArgs::new("https://api.school.test".to_string());
        args.set_timeout(0);
        assert!(args.config().is_err());
    }
}
