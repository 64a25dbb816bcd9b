use tracing::debug;
use ureq::Agent;
use wanupnp::soap::{
    SOAP_CONTENT_TYPE, SoapEnvelope, SoapParseError, build_soap_request, parse_soap_envelope,
    soap_action_header,
};

use crate::errors::ControlError;

/// Result of a SOAP call:
/// - HTTP status code
/// - raw XML body (always)
/// - parsed SOAP envelope, or why the body is not one
pub struct SoapCallResult {
    pub status: ureq::http::StatusCode,
    pub raw_body: String,
    pub envelope: Result<SoapEnvelope, SoapParseError>,
}

/// Invoke a UPnP SOAP action on a control URL.
///
/// - `control_url`: full HTTP URL of the service control endpoint
/// - `service_type`: service URN, e.g. "urn:schemas-upnp-org:service:WANIPConnection:1"
/// - `action`: action name, e.g. "GetExternalIPAddress"
/// - `args`: list of (name, value) pairs
///
/// `agent` must not treat 4xx/5xx as errors, otherwise SOAP faults are lost.
pub fn invoke_upnp_action(
    agent: &Agent,
    control_url: &str,
    service_type: &str,
    action: &str,
    args: &[(&str, &str)],
) -> Result<SoapCallResult, ControlError> {
    let body_xml = build_soap_request(service_type, action, args)
        .map_err(|e| ControlError::Build(e.to_string()))?;
    debug!("SOAP request for {} ({} bytes):\n{}", action, body_xml.len(), body_xml);

    // Content-Length is derived by ureq from the sized String body.
    let mut response = agent
        .post(control_url)
        .header("Content-Type", SOAP_CONTENT_TYPE)
        .header("SOAPAction", &soap_action_header(service_type, action))
        .send(body_xml)?;

    let status = response.status();
    let raw_body = response.body_mut().read_to_string()?;
    debug!("SOAP response for {} (HTTP {}):\n{}", action, status, raw_body);

    let envelope = parse_soap_envelope(raw_body.as_bytes());

    Ok(SoapCallResult {
        status,
        raw_body,
        envelope,
    })
}
