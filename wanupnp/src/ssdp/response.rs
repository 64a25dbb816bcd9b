//! Décodage des réponses SSDP

use std::collections::HashMap;
use std::collections::hash_map::Iter;

use tracing::trace;

/// Clé sous laquelle la ligne de statut (`HTTP/1.1 200 OK`) est conservée
pub const STATUS_KEY: &str = "Status";

/// En-têtes d'une réponse SSDP, noms conservés tels que reçus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResponse {
    headers: HashMap<String, String>,
}

impl DiscoveryResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valeur d'un en-tête, en respectant la casse du nom.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Valeur d'un en-tête : correspondance exacte d'abord, puis sans tenir
    /// compte de la casse ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.get(name).or_else(|| {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    /// URL du document de description du device (`location`)
    ///
    /// Accepte aussi `LOCATION` ou `Location` : certaines passerelles ne respectent pas la casse.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Ligne de statut si la réponse en contenait une
    pub fn status(&self) -> Option<&str> {
        self.get(STATUS_KEY)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.headers.iter()
    }
}

impl From<HashMap<String, String>> for DiscoveryResponse {
    fn from(headers: HashMap<String, String>) -> Self {
        Self { headers }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DiscoveryResponse {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            headers: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Décode un datagramme SSDP en table d'en-têtes.
///
/// Les lignes vides et les lignes sans `:` sont ignorées ; une ligne qui
/// commence par `HTTP` est conservée telle quelle sous [`STATUS_KEY`].
/// Le décodage n'échoue jamais.
pub fn decode_response(packet: &[u8]) -> DiscoveryResponse {
    let data = String::from_utf8_lossy(packet);
    let mut response = DiscoveryResponse::new();

    for line in data.split("\r\n") {
        if line.is_empty() {
            continue;
        }

        if line.starts_with("HTTP") {
            response.insert(STATUS_KEY, line);
            continue;
        }

        // Split on first ':' only (values may contain ':')
        match line.split_once(':') {
            Some((name, value)) => response.insert(name, value.trim()),
            None => trace!("Skipping line without colon: '{}'", line),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &[u8] = b"HTTP/1.1 200 OK\r\n\
        CACHE-CONTROL: max-age=120\r\n\
        ST: urn:schemas-upnp-org:service:WANIPConnection:1\r\n\
        USN: uuid:1234::urn:schemas-upnp-org:service:WANIPConnection:1\r\n\
        EXT:\r\n\
        SERVER: Linux/3.14 UPnP/1.0 MiniUPnPd/2.1\r\n\
        location:   http://192.168.1.1:5000/rootDesc.xml  \r\n\
        \r\n";

    #[test]
    fn test_decode_search_response() {
        let response = decode_response(REPLY);

        assert_eq!(response.status(), Some("HTTP/1.1 200 OK"));
        assert_eq!(response.get("CACHE-CONTROL"), Some("max-age=120"));
        assert_eq!(
            response.get("location"),
            Some("http://192.168.1.1:5000/rootDesc.xml")
        );
        assert_eq!(response.get("EXT"), Some(""));
        assert_eq!(response.len(), 7);
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let response = decode_response(b"LOCATION: http://10.0.0.1:1900/desc.xml\r\n");
        assert_eq!(response.get("LOCATION"), Some("http://10.0.0.1:1900/desc.xml"));
    }

    #[test]
    fn test_lines_without_colon_are_dropped() {
        let response = decode_response(b"HTTP/1.1 200 OK\r\ngarbage line\r\nST: x\r\n");
        assert_eq!(response.len(), 2);
        assert_eq!(response.get("ST"), Some("x"));
        assert!(response.iter().all(|(k, _)| k != "garbage line"));
    }

    #[test]
    fn test_no_status_without_http_line() {
        let response = decode_response(b"ST: x\r\nUSN: y\r\n");
        assert_eq!(response.status(), None);
        assert_eq!(response.len(), 2);
    }

    #[test]
    fn test_header_names_keep_their_case() {
        let response = decode_response(b"Location: http://a/b\r\n");
        assert_eq!(response.get("location"), None);
        assert_eq!(response.get("Location"), Some("http://a/b"));
        assert_eq!(response.location(), Some("http://a/b"));

        let upper = decode_response(b"LOCATION: http://c/d\r\n");
        assert_eq!(upper.location(), Some("http://c/d"));
    }

    #[test]
    fn test_decode_is_idempotent() {
        assert_eq!(decode_response(REPLY), decode_response(REPLY));
    }

    #[test]
    fn test_truncated_and_empty_payloads() {
        assert!(decode_response(b"").is_empty());

        let truncated = decode_response(b"HTTP/1.1 200 OK\r\nST: urn:sch");
        assert_eq!(truncated.get("ST"), Some("urn:sch"));
    }

    #[test]
    fn test_invalid_utf8_does_not_fail() {
        let response = decode_response(b"ST: \xff\xfe\r\nUSN: ok\r\n");
        assert_eq!(response.get("USN"), Some("ok"));
        assert!(response.get("ST").is_some());
    }
}
