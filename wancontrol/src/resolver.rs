use std::time::Duration;

use tracing::{debug, info};
use ureq::Agent;
use url::{Position, Url};
use wanupnp::WAN_IP_CONNECTION;
use wanupnp::description::{DescriptionParseError, DeviceDescription, parse_description};
use wanupnp::ssdp::DiscoveryResponse;

use crate::errors::ResolveError;
use crate::http::build_agent;

/// Fetches a gateway's description document and extracts the control URL
/// of one of its services (`WANIPConnection:1` by default).
pub struct DescriptionResolver {
    agent: Agent,
    service_type: String,
}

impl DescriptionResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout, true),
            service_type: WAN_IP_CONNECTION.to_string(),
        }
    }

    pub fn with_service_type(mut self, service_type: &str) -> Self {
        self.service_type = service_type.to_string();
        self
    }

    /// Returns the absolute control URL of the service advertised by the
    /// device behind `response`'s `location` header.
    pub fn resolve(&self, response: &DiscoveryResponse) -> Result<String, ResolveError> {
        let location = response.location().ok_or(ResolveError::MissingLocation)?;
        let location_url = Url::parse(location)?;

        info!("🔍 Fetching device description at {}", location_url);
        let description = self.fetch_description(location_url.as_str())?;

        let service = description
            .find_service(&self.service_type)
            .ok_or_else(|| ResolveError::ServiceNotFound(self.service_type.clone()))?;

        if service.control_url.is_empty() {
            return Err(DescriptionParseError::MissingField("controlURL").into());
        }

        // URLBase, when present and valid, takes precedence over location.
        let base = description
            .url_base
            .as_deref()
            .and_then(|raw| Url::parse(raw).ok())
            .unwrap_or(location_url);

        Ok(resolve_control_url(&base, &service.control_url))
    }

    pub fn fetch_description(&self, location: &str) -> Result<DeviceDescription, ResolveError> {
        let mut response = self.agent.get(location).call()?;
        let body = response.body_mut().read_to_string()?;
        debug!("Device description from {} ({} bytes)", location, body.len());

        Ok(parse_description(body.as_bytes())?)
    }
}

/// Joins a `controlURL` onto the scheme and authority of `base`.
///
/// Absolute control URLs are returned as-is.
pub fn resolve_control_url(base: &Url, control_url: &str) -> String {
    if control_url.starts_with("http://") || control_url.starts_with("https://") {
        return control_url.to_string();
    }

    let authority = &base[..Position::BeforePath];
    if control_url.starts_with('/') {
        format!("{}{}", authority, control_url)
    } else {
        format!("{}/{}", authority, control_url)
    }
}
