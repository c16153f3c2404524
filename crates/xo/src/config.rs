//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the client connects and how it paces its requests.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the HTTP turn API.
    pub server_url: String,

    /// WebSocket endpoint of the lobby push channel.
    pub push_url: String,

    /// Upper bound on any single HTTP request, long-polls included.
    /// `None` leaves it to the server to end a poll.
    pub request_timeout: Option<Duration>,

    /// Pause before re-issuing a failed opponent-move poll. Zero means
    /// re-issue immediately.
    pub poll_retry_delay: Duration,
}

impl Default for ClientConfig {
    /// Points at the public `xo.t.javascript.ninja` server.
    ///
    /// That server issues player ids itself and rejects the ones this
    /// client generates, so games there fail at ready confirmation. Use
    /// a server that accepts client-chosen ids.
    fn default() -> Self {
        Self {
            server_url: "http://xo.t.javascript.ninja".to_string(),
            push_url: "ws://xo.t.javascript.ninja/games".to_string(),
            request_timeout: None,
            poll_retry_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://xo.t.javascript.ninja");
        assert_eq!(config.push_url, "ws://xo.t.javascript.ninja/games");
        assert_eq!(config.request_timeout, None);
        assert!(config.poll_retry_delay.is_zero());
    }

    #[test]
    fn test_client_config_partial_json_keeps_other_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"server_url": "http://localhost:3000",
                "poll_retry_delay": {"secs": 1, "nanos": 0}}"#,
        )
        .unwrap();

        assert_eq!(config.server_url, "http://localhost:3000");
        assert_eq!(config.poll_retry_delay, Duration::from_secs(1));
        assert_eq!(config.push_url, ClientConfig::default().push_url);
    }
}
