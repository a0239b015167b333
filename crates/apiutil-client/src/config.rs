//! Client construction options

use crate::transport::Transport;
use apiutil_common::logging::{Logger, TracingLogger};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Options applied once when an [`AuthenticatedClient`](crate::AuthenticatedClient)
/// is built. Every field has a default; set only what you need.
#[derive(Clone)]
pub struct ClientOptions {
    /// Custom transport. Defaults to a `reqwest` blocking client built from
    /// `timeout` and `user_agent`.
    pub transport: Option<Arc<dyn Transport>>,

    /// Defaults to [`TracingLogger`]
    pub logger: Arc<dyn Logger>,

    /// Request timeout for the default transport
    pub timeout: Duration,

    /// User agent for the default transport
    pub user_agent: String,

    /// Adopt a `token` response header from any call made while no token is held
    pub harvest_tokens: bool,

    /// Token to start with
    pub token: Option<String>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self {
            transport: None,
            logger: Arc::new(TracingLogger),
            timeout: Duration::from_secs(30),
            user_agent: format!("apiutil/{}", env!("CARGO_PKG_VERSION")),
            harvest_tokens: true,
            token: None,
        }
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set custom user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_token_harvesting(mut self, enabled: bool) -> Self {
        self.harvest_tokens = enabled;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("custom_transport", &self.transport.is_some())
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("harvest_tokens", &self.harvest_tokens)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();

        assert!(options.transport.is_none());
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert!(options.user_agent.starts_with("apiutil/"));
        assert!(options.harvest_tokens);
        assert!(options.token.is_none());
    }

    #[test]
    fn test_builder() {
        let options = ClientOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("books-sync/2.1")
            .with_token_harvesting(false)
            .with_token("abc");

        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.user_agent, "books-sync/2.1");
        assert!(!options.harvest_tokens);
        assert_eq!(options.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_debug_hides_token() {
        let printed = format!("{:?}", ClientOptions::new().with_token("secret-token"));
        assert!(!printed.contains("secret-token"));
    }
}
