//! Parsing du document de description avec quick-xml

use std::io::BufRead;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::{Error as XmlError, Reader, events::Event};
use thiserror::Error;
use tracing::trace;

use super::{Device, DeviceDescription, Service};

#[derive(Debug, Error)]
pub enum DescriptionParseError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] XmlError),

    #[error("Missing required device element: {0}")]
    MissingField(&'static str),
}

/// Construit l'arbre [`DeviceDescription`] à partir d'un document XML.
///
/// Les noms d'éléments sont comparés sans préfixe de namespace. Les éléments
/// inconnus sont ignorés ; seule l'absence de `<device>` racine est une
/// erreur de structure.
pub fn parse_description<R: BufRead>(source: R) -> Result<DeviceDescription, DescriptionParseError> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    let mut url_base: Option<String> = None;
    let mut root: Option<Device> = None;
    let mut devices: Vec<Device> = Vec::new();
    let mut current_service: Option<Service> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "device" => devices.push(Device::default()),
                    "service" if !devices.is_empty() => current_service = Some(Service::default()),
                    _ => {}
                }
                path.push(name);
                text.clear();
            }
            Event::Text(e) => {
                text.push_str(&e.decode().map_err(XmlError::Encoding)?);
            }
            Event::CData(e) => {
                text.push_str(&e.decode().map_err(XmlError::Encoding)?);
            }
            Event::GeneralRef(e) => {
                let entity = e.decode().map_err(XmlError::Encoding)?;
                match resolve_entity(&entity) {
                    Some(resolved) => text.push_str(&resolved),
                    None => trace!("Ignoring unknown entity &{};", entity),
                }
            }
            Event::End(_) => {
                let Some(name) = path.pop() else { continue };
                let parent = path.last().map(String::as_str);
                let value = text.trim();

                match (parent, name.as_str()) {
                    (_, "device") => {
                        if let Some(device) = devices.pop() {
                            match devices.last_mut() {
                                Some(parent_device) => parent_device.devices.push(device),
                                None if root.is_none() => root = Some(device),
                                None => trace!("Ignoring extra root device {}", device.udn),
                            }
                        }
                    }
                    (_, "service") => {
                        if let (Some(service), Some(device)) =
                            (current_service.take(), devices.last_mut())
                        {
                            device.services.push(service);
                        }
                    }
                    (Some("service"), field) => {
                        if let Some(service) = current_service.as_mut() {
                            set_service_field(service, field, value);
                        }
                    }
                    (Some("device"), field) => {
                        if let Some(device) = devices.last_mut() {
                            set_device_field(device, field, value);
                        }
                    }
                    (Some("root"), "URLBase") if !value.is_empty() => {
                        url_base = Some(value.to_string());
                    }
                    _ => {}
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let device = root.ok_or(DescriptionParseError::MissingField("device"))?;
    Ok(DeviceDescription { url_base, device })
}

fn set_service_field(service: &mut Service, field: &str, value: &str) {
    let slot = match field {
        "serviceType" => &mut service.service_type,
        "serviceId" => &mut service.service_id,
        "SCPDURL" => &mut service.scpd_url,
        "controlURL" => &mut service.control_url,
        "eventSubURL" => &mut service.event_sub_url,
        _ => return,
    };
    *slot = value.to_string();
}

fn set_device_field(device: &mut Device, field: &str, value: &str) {
    let slot = match field {
        "deviceType" => &mut device.device_type,
        "friendlyName" => &mut device.friendly_name,
        "UDN" => &mut device.udn,
        "manufacturer" => &mut device.manufacturer,
        "modelName" => &mut device.model_name,
        _ => return,
    };
    *slot = value.to_string();
}

/// Entités prédéfinies XML et références numériques (`#38`, `#x26`)
fn resolve_entity(entity: &str) -> Option<String> {
    if let Some(code) = entity.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_predefined_entity(entity).map(str::to_string)
}
