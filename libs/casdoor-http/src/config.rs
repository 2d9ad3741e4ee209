use std::time::Duration;

/// Default User-Agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("casdoor-http/", env!("CARGO_PKG_VERSION"));

/// Default cap on response bodies (10 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Root certificate source for TLS connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Mozilla roots compiled into the binary (`webpki-roots`).
    #[default]
    WebPki,
    /// Roots loaded from the OS certificate store.
    Native,
}

/// Which URL schemes the client accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// Only `https://` URLs are sent.
    #[default]
    TlsOnly,
    /// `http://` is accepted as well. Meant for local servers and mock servers in tests.
    AllowInsecureHttp,
}

/// Configuration for [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout applied to each request, from send until response headers arrive.
    pub request_timeout: Duration,

    /// Maximum number of (decompressed) body bytes read from a response.
    pub max_body_size: usize,

    /// User-Agent header value.
    pub user_agent: String,

    /// Accepted URL schemes.
    pub transport: TransportSecurity,

    /// Root certificate source.
    pub tls_roots: TlsRootConfig,

    /// Idle pooled connections are closed after this long. `None` keeps them indefinitely.
    pub pool_idle_timeout: Option<Duration>,

    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// Short timeouts and a small pool, for CLIs and one-shot tools.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024,
            pool_idle_timeout: Some(Duration::from_secs(30)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_tls_only() {
        let config = HttpClientConfig::default();
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
        assert_eq!(config.tls_roots, TlsRootConfig::WebPki);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn default_user_agent_names_the_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("casdoor-http/"));
        assert_eq!(HttpClientConfig::default().user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn minimal_shrinks_limits() {
        let config = HttpClientConfig::minimal();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert_eq!(config.pool_max_idle_per_host, 4);
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
    }
}
