//! Parser SOAP pour les réponses d'actions UPnP

use std::collections::HashMap;
use std::io::BufReader;

use xmltree::{Element, XMLNode};

use super::{SoapBody, SoapEnvelope};

/// Arguments de sortie d'une action UPnP
#[derive(Debug, Clone)]
pub struct SoapActionResponse {
    /// Nom de l'élément de réponse (ex: "GetExternalIPAddressResponse")
    pub name: String,

    /// Namespace de la réponse (URN du service)
    pub namespace: Option<String>,

    /// Arguments de sortie, texte nettoyé des espaces
    pub args: HashMap<String, String>,
}

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("Missing {0} element in SOAP body")]
    MissingResponse(String),
}

/// Parse une enveloppe SOAP complète
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }

    let body_elem = find_child_with_suffix(&root, "Body").ok_or(SoapParseError::MissingBody)?;

    Ok(SoapEnvelope {
        body: SoapBody {
            content: body_elem.clone(),
        },
    })
}

/// Extrait la réponse `<ActionResponse>` du corps SOAP
pub fn parse_action_response(
    envelope: &SoapEnvelope,
    action: &str,
) -> Result<SoapActionResponse, SoapParseError> {
    let response_name = format!("{}Response", action);
    let response = find_child_with_suffix(&envelope.body.content, &response_name)
        .ok_or_else(|| SoapParseError::MissingResponse(response_name.clone()))?;

    let mut args = HashMap::new();
    for child in &response.children {
        if let Some(elem) = child.as_element() {
            let value = elem
                .get_text()
                .map(|t| t.trim().to_string())
                .unwrap_or_default();
            args.insert(elem.name.clone(), value);
        }
    }

    Ok(SoapActionResponse {
        name: response.name.clone(),
        namespace: response.namespace.clone(),
        args,
    })
}

/// Premier enfant direct dont le nom local se termine par `suffix`
pub fn find_child_with_suffix<'a>(parent: &'a Element, suffix: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if elem.name.ends_with(suffix) => Some(elem),
        _ => None,
    })
}
