//! Construction de la requête M-SEARCH

use std::fmt;
use std::time::Duration;

use super::{SSDP_MULTICAST_ADDR, SSDP_PORT};
use crate::WAN_IP_CONNECTION;

/// Requête de découverte SSDP restreinte à un type de service.
///
/// Le champ `MX` reprend le timeout de découverte en secondes entières : c'est
/// la fenêtre dans laquelle la passerelle peut étaler sa réponse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryQuery {
    search_target: String,
    mx: u64,
}

impl DiscoveryQuery {
    /// Crée une requête ciblant `WANIPConnection:1`
    pub fn new(timeout: Duration) -> Self {
        Self {
            search_target: WAN_IP_CONNECTION.to_string(),
            mx: timeout.as_secs(),
        }
    }

    /// Remplace la cible de recherche (`ST`)
    pub fn with_search_target(mut self, st: &str) -> Self {
        self.search_target = st.to_string();
        self
    }

    pub fn search_target(&self) -> &str {
        &self.search_target
    }

    pub fn mx(&self) -> u64 {
        self.mx
    }

    /// Payload prêt à être envoyé sur le socket
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for DiscoveryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M-SEARCH * HTTP/1.1\r\n\
             Host: {}:{}\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: {}\r\n\
             ST: {}\r\n\
             \r\n",
            SSDP_MULTICAST_ADDR, SSDP_PORT, self.mx, self.search_target
        )
    }
}
