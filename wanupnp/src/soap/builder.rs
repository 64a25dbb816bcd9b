//! Construction d'enveloppes SOAP

use xmltree::{Element, XMLNode};

use super::{SOAP_ENCODING_STYLE, SOAP_ENVELOPE_NS};

pub(crate) fn build_soap_envelope_with_body(
    body_child: Element,
    pretty: bool,
) -> Result<String, xmltree::Error> {
    // Body
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(body_child));

    // Envelope
    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), SOAP_ENVELOPE_NS.to_string());
    envelope
        .attributes
        .insert("s:encodingStyle".to_string(), SOAP_ENCODING_STYLE.to_string());
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(pretty)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub(crate) fn action_element(name: String, service_urn: &str, args: &[(&str, &str)]) -> Element {
    let mut elem = Element::new(&name);
    elem.attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());

    for (arg, value) in args {
        let mut child = Element::new(*arg);
        child.children.push(XMLNode::Text((*value).to_string()));
        elem.children.push(XMLNode::Element(child));
    }
    elem
}

/// Construit la requête SOAP d'invocation d'une action UPnP
///
/// # Arguments
///
/// * `service_urn` - URN du service (ex: "urn:schemas-upnp-org:service:WANIPConnection:1")
/// * `action` - Nom de l'action (ex: "GetExternalIPAddress")
/// * `args` - Arguments d'entrée `(nom, valeur)`
pub fn build_soap_request(
    service_urn: &str,
    action: &str,
    args: &[(&str, &str)],
) -> Result<String, xmltree::Error> {
    let request = action_element(format!("u:{}", action), service_urn, args);
    build_soap_envelope_with_body(request, false)
}

/// Valeur de l'en-tête `SOAPAction` : `"urn:service#Action"`
pub fn soap_action_header(service_urn: &str, action: &str) -> String {
    format!(r#""{}#{}""#, service_urn, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAN_IP: &str = "urn:schemas-upnp-org:service:WANIPConnection:1";

    #[test]
    fn test_build_request_without_args() {
        let xml = build_soap_request(WAN_IP, "GetExternalIPAddress", &[]).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<s:Envelope"));
        assert!(xml.contains(r#"xmlns:s="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(xml.contains(r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/""#));
        assert!(xml.contains("<s:Body>"));
        assert!(xml.contains("u:GetExternalIPAddress"));
        assert!(xml.contains(r#"xmlns:u="urn:schemas-upnp-org:service:WANIPConnection:1""#));
        assert!(!xml.contains("GetExternalIPAddressResponse"));
    }

    #[test]
    fn test_build_request_with_args() {
        let xml = build_soap_request(
            WAN_IP,
            "GetSpecificPortMappingEntry",
            &[("NewExternalPort", "8080"), ("NewProtocol", "TCP")],
        )
        .unwrap();

        assert!(xml.contains("<NewExternalPort>8080</NewExternalPort>"));
        assert!(xml.contains("<NewProtocol>TCP</NewProtocol>"));
    }

    #[test]
    fn test_soap_action_header_is_quoted() {
        assert_eq!(
            soap_action_header(WAN_IP, "GetExternalIPAddress"),
            r#""urn:schemas-upnp-org:service:WANIPConnection:1#GetExternalIPAddress""#
        );
    }
}
