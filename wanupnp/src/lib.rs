//! # wanupnp
//!
//! Couche protocolaire UPnP utilisée par WANWatch pour interroger la
//! passerelle Internet (IGD) :
//!
//! - [`ssdp`] : requête M-SEARCH, décodage des réponses et écoute UDP
//! - [`description`] : modèle et parsing du document de description du device
//! - [`soap`] : enveloppes SOAP des actions de contrôle et décodage des faults
//!
//! Rien ici ne fait d'HTTP : le transport des descriptions et des actions est
//! à la charge de `wancontrol`.

pub mod description;
pub mod soap;
pub mod ssdp;

/// Type de service UPnP exposant l'adresse IP WAN de la passerelle
pub const WAN_IP_CONNECTION: &str = "urn:schemas-upnp-org:service:WANIPConnection:1";
