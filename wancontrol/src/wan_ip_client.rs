use std::time::Duration;

use tracing::{debug, info, warn};
use ureq::Agent;
use ureq::http::StatusCode;
use wanupnp::WAN_IP_CONNECTION;
use wanupnp::soap::{parse_action_response, parse_soap_fault};

use crate::errors::ControlError;
use crate::http::build_agent;
use crate::soap_client::invoke_upnp_action;

const GET_EXTERNAL_IP: &str = "GetExternalIPAddress";
const NEW_EXTERNAL_IP: &str = "NewExternalIPAddress";

/// Keeps raw bodies readable in error messages.
const MAX_DETAIL_LEN: usize = 256;

/// Client for the `GetExternalIPAddress` action of a WANIPConnection service.
pub struct WanIpClient {
    agent: Agent,
    service_type: String,
}

impl WanIpClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout, false),
            service_type: WAN_IP_CONNECTION.to_string(),
        }
    }

    /// Asks the gateway at `control_url` for its external address.
    pub fn try_external_ip(&self, control_url: &str) -> Result<String, ControlError> {
        info!("📡 Sending {} to {}", GET_EXTERNAL_IP, control_url);
        let call = invoke_upnp_action(&self.agent, control_url, &self.service_type, GET_EXTERNAL_IP, &[])?;
        debug!("{} answered with HTTP {}", GET_EXTERNAL_IP, call.status.as_u16());

        if call.status != StatusCode::OK {
            let detail = match call.envelope.as_ref().ok().and_then(parse_soap_fault) {
                Some(fault) => fault.to_string(),
                None => truncate(call.raw_body.trim(), MAX_DETAIL_LEN),
            };
            return Err(ControlError::Status {
                action: GET_EXTERNAL_IP.to_string(),
                status: call.status.as_u16(),
                detail,
            });
        }

        let envelope = call.envelope?;
        let response = parse_action_response(&envelope, GET_EXTERNAL_IP)?;

        response
            .args
            .get(NEW_EXTERNAL_IP)
            .filter(|ip| !ip.is_empty())
            .cloned()
            .ok_or_else(|| ControlError::MissingValue(NEW_EXTERNAL_IP.to_string()))
    }

    /// Same as [`Self::try_external_ip`], but any failure is logged and
    /// yields an empty string.
    pub fn external_ip(&self, control_url: &str) -> String {
        match self.try_external_ip(control_url) {
            Ok(ip) => ip,
            Err(e) => {
                warn!("⚠️ Could not get WAN IP from {}: {}", control_url, e);
                String::new()
            }
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
