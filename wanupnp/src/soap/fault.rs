//! SOAP Faults pour UPnP

use xmltree::Element;

use super::{SoapEnvelope, find_child_with_suffix};

/// Erreur SOAP (Fault)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Code d'erreur (ex: "s:Client")
    pub fault_code: String,

    /// Description de l'erreur
    pub fault_string: String,

    /// Détails UPnP optionnels
    pub upnp_error: Option<UpnpError>,
}

/// Erreur UPnP spécifique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpnpError {
    /// Code d'erreur UPnP (ex: "401", "501")
    pub error_code: String,

    /// Description de l'erreur
    pub error_description: String,
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.upnp_error {
            Some(err) => write!(
                f,
                "{} ({}): UPnP error {} {}",
                self.fault_string, self.fault_code, err.error_code, err.error_description
            ),
            None => write!(f, "{} ({})", self.fault_string, self.fault_code),
        }
    }
}

fn child_text(parent: &Element, suffix: &str) -> String {
    find_child_with_suffix(parent, suffix)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Extrait le `Fault` du corps SOAP s'il y en a un
pub fn parse_soap_fault(envelope: &SoapEnvelope) -> Option<SoapFault> {
    let fault = find_child_with_suffix(&envelope.body.content, "Fault")?;

    let upnp_error = find_child_with_suffix(fault, "detail")
        .and_then(|detail| find_child_with_suffix(detail, "UPnPError"))
        .map(|err| UpnpError {
            error_code: child_text(err, "errorCode"),
            error_description: child_text(err, "errorDescription"),
        });

    Some(SoapFault {
        fault_code: child_text(fault, "faultcode"),
        fault_string: child_text(fault, "faultstring"),
        upnp_error,
    })
}
