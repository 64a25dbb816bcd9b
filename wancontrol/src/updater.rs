use std::fmt;
use std::time::Duration;

use tracing::{debug, info};
use ureq::Agent;
use ureq::http::StatusCode;
use url::Url;

use crate::errors::UpdateError;
use crate::http::build_agent;

/// Tunnelbroker.net dynamic update endpoint
pub const DEFAULT_ENDPOINT: &str = "https://ipv4.tunnelbroker.net/nic/update";

/// Marker the update service puts in the body of a rejected request
const ERROR_MARKER: &str = "ERROR";

/// Receives a new WAN address. Implemented by remote update services.
pub trait AddressNotifier {
    fn notify(&self, ip: &str) -> Result<(), UpdateError>;
}

#[derive(Clone)]
pub struct TunnelBrokerConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub tunnel_id: String,
}

impl TunnelBrokerConfig {
    pub fn new(username: &str, password: &str, tunnel_id: &str) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            tunnel_id: tunnel_id.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// All three credentials must be set before a real update.
    pub fn validate(&self) -> Result<(), UpdateError> {
        if self.username.is_empty() {
            return Err(UpdateError::MissingCredentials("user id"));
        }
        if self.password.is_empty() {
            return Err(UpdateError::MissingCredentials("password"));
        }
        if self.tunnel_id.is_empty() {
            return Err(UpdateError::MissingCredentials("tunnel id"));
        }
        Ok(())
    }
}

impl fmt::Debug for TunnelBrokerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunnelBrokerConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"***")
            .field("tunnel_id", &self.tunnel_id)
            .finish()
    }
}

/// Pushes the WAN address to a Hurricane Electric IPv6 tunnel.
pub struct TunnelBrokerNotifier {
    agent: Agent,
    config: TunnelBrokerConfig,
}

impl TunnelBrokerNotifier {
    pub fn new(config: TunnelBrokerConfig, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout, false),
            config,
        }
    }

    pub fn config(&self) -> &TunnelBrokerConfig {
        &self.config
    }

    /// Update URL for `ip`. Carries the password, never log it.
    pub fn update_url(&self, ip: &str) -> Result<Url, UpdateError> {
        let url = Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("myip", ip),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
                ("hostname", self.config.tunnel_id.as_str()),
            ],
        )?;
        Ok(url)
    }
}

impl AddressNotifier for TunnelBrokerNotifier {
    fn notify(&self, ip: &str) -> Result<(), UpdateError> {
        let url = self.update_url(ip)?;

        info!("🚀 Requesting update of tunnel {} with IP {}", self.config.tunnel_id, ip);
        let mut response = self.agent.get(url.as_str()).call()?;
        let status = response.status();
        let body = response.body_mut().read_to_string()?;
        debug!("Tunnel update answered HTTP {}: {}", status, body.trim());

        if status != StatusCode::OK {
            return Err(UpdateError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        if body.contains(ERROR_MARKER) {
            return Err(UpdateError::Rejected(body.trim().to_string()));
        }

        info!("✅ Tunnel {} now points at {}", self.config.tunnel_id, ip);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(endpoint: &str) -> TunnelBrokerNotifier {
        let config = TunnelBrokerConfig::new("alice", "p@ss&word", "123456").with_endpoint(endpoint);
        TunnelBrokerNotifier::new(config, Duration::from_secs(1))
    }

    #[test]
    fn test_update_url_encodes_parameters() {
        let url = notifier(DEFAULT_ENDPOINT).update_url("198.51.100.22").unwrap();

        assert_eq!(url.host_str(), Some("ipv4.tunnelbroker.net"));
        assert_eq!(url.path(), "/nic/update");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("myip".to_string(), "198.51.100.22".to_string()),
                ("username".to_string(), "alice".to_string()),
                ("password".to_string(), "p@ss&word".to_string()),
                ("hostname".to_string(), "123456".to_string()),
            ]
        );
        assert!(!url.as_str().contains("p@ss&word"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = notifier("not a url").update_url("10.0.0.1").unwrap_err();
        assert!(matches!(err, UpdateError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_validate_reports_first_missing_credential() {
        assert!(TunnelBrokerConfig::new("u", "p", "t").validate().is_ok());

        let err = TunnelBrokerConfig::new("", "p", "t").validate().unwrap_err();
        assert!(matches!(err, UpdateError::MissingCredentials("user id")));

        let err = TunnelBrokerConfig::new("u", "", "").validate().unwrap_err();
        assert!(matches!(err, UpdateError::MissingCredentials("password")));

        let err = TunnelBrokerConfig::new("u", "p", "").validate().unwrap_err();
        assert!(matches!(err, UpdateError::MissingCredentials("tunnel id")));
    }

    #[test]
    fn test_debug_hides_password() {
        let shown = format!("{:?}", TunnelBrokerConfig::new("alice", "hunter2", "1"));
        assert!(shown.contains("alice"));
        assert!(!shown.contains("hunter2"));
    }
}
