//! Timeout settings for remote connect API calls

pub mod timeout {
    //! Timeout configuration for connect API calls

    use std::time::Duration;

    use crate::config::HttpConfig;

    /// Default timeout for establishing a connection to an endpoint
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default timeout for a whole HTTP request
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout configuration
    #[derive(Debug, Clone, Copy)]
    pub struct TimeoutConfig {
        pub connect: Duration,
        pub request: Duration,
    }

    impl Default for TimeoutConfig {
        fn default() -> Self {
            Self {
                connect: CONNECT_TIMEOUT,
                request: REQUEST_TIMEOUT,
            }
        }
    }

    impl TimeoutConfig {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
            self.connect = timeout;
            self
        }

        #[must_use]
        pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
            self.request = timeout;
            self
        }
    }

    impl From<&HttpConfig> for TimeoutConfig {
        fn from(config: &HttpConfig) -> Self {
            Self::new()
                .with_connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
                .with_request_timeout(Duration::from_secs(config.request_timeout_seconds))
        }
    }
}
