//! Manager configuration types.

use std::time::Duration;

use unicode_normalization::UnicodeNormalization;

/// Default per-hop timeout, applied to connect and to the response read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum number of redirects followed by one call.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Configuration for the [`crate::HttpManager`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout of one hop (connect plus response read).
    pub timeout: Duration,
    /// Maximum number of 301/302/303 redirects followed by one call.
    pub max_redirects: usize,
    /// Raw `User-Agent`; normalized before use, `None` disables the header.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: Some(format!("lightnet/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// The `User-Agent` actually sent: non-ASCII characters stripped,
    /// `None` when nothing remains.
    #[must_use]
    pub fn normalized_user_agent(&self) -> Option<String> {
        self.user_agent.as_deref().and_then(normalize_user_agent)
    }
}

/// Decompose (NFD) then strip non-ASCII characters, so accented letters keep
/// their base letter; `None` if the result is empty.
#[must_use]
pub fn normalize_user_agent(raw: &str) -> Option<String> {
    let ascii: String = raw.nfd().filter(char::is_ascii).collect();
    (!ascii.is_empty()).then_some(ascii)
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    max_redirects: Option<usize>,
    user_agent: Option<Option<String>>,
}

impl ClientConfigBuilder {
    /// Set the per-hop timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the redirect hop limit.
    #[must_use]
    pub const fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    /// Set the `User-Agent`.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(Some(user_agent.into()));
        self
    }

    /// Do not send any `User-Agent`.
    #[must_use]
    pub fn without_user_agent(mut self) -> Self {
        self.user_agent = Some(None);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            max_redirects: self.max_redirects.unwrap_or(defaults.max_redirects),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_redirects, 10);
        assert!(
            config
                .normalized_user_agent()
                .is_some_and(|ua| ua.starts_with("lightnet/"))
        );
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::builder()
            .timeout(Duration::from_millis(250))
            .max_redirects(2)
            .user_agent("agent")
            .build();

        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.max_redirects, 2);
        assert_eq!(config.user_agent.as_deref(), Some("agent"));

        let config = ClientConfig::builder().without_user_agent().build();
        assert_eq!(config.normalized_user_agent(), None);
    }

    #[test]
    fn user_agent_normalization() {
        assert_eq!(
            normalize_user_agent("Dalvík/2.1 (Linux; U; Android 9)").as_deref(),
            Some("Dalvik/2.1 (Linux; U; Android 9)")
        );
        assert_eq!(normalize_user_agent("Ünïcødé").as_deref(), Some("Unicde"));
        assert_eq!(normalize_user_agent("日本語"), None);
        assert_eq!(normalize_user_agent(""), None);
    }
}
