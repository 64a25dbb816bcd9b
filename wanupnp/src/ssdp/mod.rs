//! # Module SSDP - Simple Service Discovery Protocol
//!
//! Côté *control point* uniquement : WANWatch envoie un M-SEARCH restreint au
//! service `WANIPConnection:1` et attend la première réponse unicast.
//!
//! ## Architecture
//!
//! - [`DiscoveryQuery`] : requête M-SEARCH immuable
//! - [`DiscoveryResponse`] / [`decode_response`] : en-têtes d'une réponse
//! - [`SsdpListener`] : socket UDP, threads de réception/décodage, attente bornée
//! - [`GatewayDiscovery`] : point d'injection pour le pipeline
//!
//! ## Constants SSDP
//!
//! - **Multicast Address**: 239.255.255.250:1900
//! - **Buffer de réception**: 512 octets (les réponses plus longues sont tronquées)

mod listener;
mod query;
mod response;

pub use listener::{DiscoveryError, GatewayDiscovery, SsdpListener};
pub use query::DiscoveryQuery;
pub use response::{DiscoveryResponse, STATUS_KEY, decode_response};

use std::net::Ipv4Addr;

/// Adresse multicast SSDP
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250";

/// Adresse multicast SSDP, sous forme typée
pub const SSDP_MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// Port SSDP
pub const SSDP_PORT: u16 = 1900;

/// TTL des datagrammes multicast (recommandation UPnP)
pub const MULTICAST_TTL: u32 = 2;

/// Taille du buffer de réception d'un datagramme
pub const RECV_BUFFER_SIZE: usize = 512;
