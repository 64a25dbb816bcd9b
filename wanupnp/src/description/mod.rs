//! # Description de device UPnP
//!
//! Le document `rootDesc.xml` d'une passerelle est un arbre de devices
//! imbriqués (`device` → `deviceList` → `device` …), chacun portant une
//! `serviceList`. Il est représenté ici par un arbre générique, sans
//! hypothèse sur la profondeur : la recherche d'un service se fait sur son
//! `serviceType`.

mod model;
mod parser;

pub use model::{Device, DeviceDescription, Service};
pub use parser::{DescriptionParseError, parse_description};
