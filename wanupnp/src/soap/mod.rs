//! # Module SOAP - Simple Object Access Protocol
//!
//! Support SOAP côté control point : construction des requêtes d'action,
//! lecture des réponses et des faults renvoyés par la passerelle.
//!
//! ## Architecture
//!
//! - [`build_soap_request`] : enveloppe d'invocation d'une action
//! - [`SoapEnvelope`] : enveloppe SOAP parsée
//! - [`parse_action_response`] : arguments de sortie d'une action
//! - [`SoapFault`] / [`parse_soap_fault`] : erreurs SOAP et UPnP
//! - `gateway` (feature `test-util`) : réponses et faults émis côté passerelle
//!
//! ## Example
//!
//! ```ignore
//! use wanupnp::soap::{build_soap_request, parse_soap_envelope, parse_action_response};
//!
//! let body = build_soap_request(
//!     "urn:schemas-upnp-org:service:WANIPConnection:1",
//!     "GetExternalIPAddress",
//!     &[],
//! ).unwrap();
//!
//! let envelope = parse_soap_envelope(reply.as_bytes()).unwrap();
//! let response = parse_action_response(&envelope, "GetExternalIPAddress").unwrap();
//! println!("{:?}", response.args.get("NewExternalIPAddress"));
//! ```

mod builder;
mod envelope;
mod fault;
#[cfg(any(test, feature = "test-util"))]
mod gateway;
mod parser;

pub use builder::{build_soap_request, soap_action_header};
pub use envelope::{SoapBody, SoapEnvelope};
pub use fault::{SoapFault, UpnpError, parse_soap_fault};
#[cfg(any(test, feature = "test-util"))]
pub use gateway::{build_soap_fault, build_soap_response, error_codes};
pub use parser::{
    SoapActionResponse, SoapParseError, find_child_with_suffix, parse_action_response,
    parse_soap_envelope,
};

/// Namespace de l'enveloppe SOAP 1.1
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Style d'encodage exigé par UPnP
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// `Content-Type` des requêtes de contrôle
pub const SOAP_CONTENT_TYPE: &str = r#"text/xml; charset="utf-8""#;
