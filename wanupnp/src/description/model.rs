//! Arbre de description d'un device UPnP

/// Document de description complet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescription {
    /// `URLBase` (UPnP 1.0), base des URLs relatives si présent
    pub url_base: Option<String>,

    /// Device racine
    pub device: Device,
}

/// Device UPnP et ses devices embarqués
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    pub device_type: String,
    pub friendly_name: String,
    pub udn: String,
    pub manufacturer: String,
    pub model_name: String,
    pub services: Vec<Service>,
    pub devices: Vec<Device>,
}

/// Entrée `<service>` d'une `serviceList`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub service_type: String,
    pub service_id: String,
    pub scpd_url: String,
    pub control_url: String,
    pub event_sub_url: String,
}

impl DeviceDescription {
    /// Premier service du type demandé, en profondeur d'abord
    pub fn find_service(&self, service_type: &str) -> Option<&Service> {
        self.device.find_service(service_type)
    }

    /// Tous les services de l'arbre, dans l'ordre du document
    pub fn services(&self) -> Vec<&Service> {
        let mut services = Vec::new();
        self.device.collect_services(&mut services);
        services
    }
}

impl Device {
    pub fn find_service(&self, service_type: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|service| service.service_type == service_type)
            .or_else(|| {
                self.devices
                    .iter()
                    .find_map(|device| device.find_service(service_type))
            })
    }

    fn collect_services<'a>(&'a self, out: &mut Vec<&'a Service>) {
        out.extend(self.services.iter());
        for device in &self.devices {
            device.collect_services(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(service_type: &str, control_url: &str) -> Service {
        Service {
            service_type: service_type.to_string(),
            control_url: control_url.to_string(),
            ..Service::default()
        }
    }

    #[test]
    fn test_find_service_searches_nested_devices() {
        let connection_device = Device {
            services: vec![
                service("urn:schemas-upnp-org:service:WANPPPConnection:1", "/ppp"),
                service("urn:schemas-upnp-org:service:WANIPConnection:1", "/ip"),
            ],
            ..Device::default()
        };
        let wan_device = Device {
            services: vec![service(
                "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1",
                "/common",
            )],
            devices: vec![connection_device],
            ..Device::default()
        };
        let desc = DeviceDescription {
            url_base: None,
            device: Device {
                services: vec![service("urn:schemas-upnp-org:service:Layer3Forwarding:1", "/l3f")],
                devices: vec![wan_device],
                ..Device::default()
            },
        };

        let found = desc
            .find_service("urn:schemas-upnp-org:service:WANIPConnection:1")
            .unwrap();
        assert_eq!(found.control_url, "/ip");
        assert!(desc.find_service("urn:schemas-upnp-org:service:WANIPv6FirewallControl:1").is_none());

        let order: Vec<&str> = desc.services().iter().map(|s| s.control_url.as_str()).collect();
        assert_eq!(order, vec!["/l3f", "/common", "/ppp", "/ip"]);
    }

    #[test]
    fn test_first_match_wins() {
        let desc = DeviceDescription {
            url_base: None,
            device: Device {
                services: vec![
                    service("urn:schemas-upnp-org:service:WANIPConnection:1", "/first"),
                    service("urn:schemas-upnp-org:service:WANIPConnection:1", "/second"),
                ],
                ..Device::default()
            },
        };

        let found = desc
            .find_service("urn:schemas-upnp-org:service:WANIPConnection:1")
            .unwrap();
        assert_eq!(found.control_url, "/first");
    }
}
