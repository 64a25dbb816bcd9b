#![allow(dead_code)]

use wanupnp::soap::{build_soap_fault, build_soap_response, error_codes};

pub const WAN_IP_SERVICE: &str = "urn:schemas-upnp-org:service:WANIPConnection:1";

/// Typical miniupnpd root description: IGD → WANDevice → WANConnectionDevice.
pub fn igd_description(url_base: Option<&str>, control_url: &str) -> String {
    let url_base = url_base
        .map(|base| format!("<URLBase>{}</URLBase>", base))
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  {url_base}
  <device>
    <deviceType>urn:schemas-upnp-org:device:InternetGatewayDevice:1</deviceType>
    <friendlyName>Test router</friendlyName>
    <UDN>uuid:00000000-0000-0000-0000-000000000001</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:Layer3Forwarding:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:L3Forwarding1</serviceId>
        <SCPDURL>/L3F.xml</SCPDURL>
        <controlURL>/ctl/L3F</controlURL>
        <eventSubURL>/evt/L3F</eventSubURL>
      </service>
    </serviceList>
    <deviceList>
      <device>
        <deviceType>urn:schemas-upnp-org:device:WANDevice:1</deviceType>
        <friendlyName>WANDevice</friendlyName>
        <UDN>uuid:00000000-0000-0000-0000-000000000002</UDN>
        <deviceList>
          <device>
            <deviceType>urn:schemas-upnp-org:device:WANConnectionDevice:1</deviceType>
            <friendlyName>WANConnectionDevice</friendlyName>
            <UDN>uuid:00000000-0000-0000-0000-000000000003</UDN>
            <serviceList>
              <service>
                <serviceType>urn:schemas-upnp-org:service:WANIPConnection:1</serviceType>
                <serviceId>urn:upnp-org:serviceId:WANIPConn1</serviceId>
                <SCPDURL>/WANIPCn.xml</SCPDURL>
                <controlURL>{control_url}</controlURL>
                <eventSubURL>/evt/IPConn</eventSubURL>
              </service>
            </serviceList>
          </device>
        </deviceList>
      </device>
    </deviceList>
  </device>
</root>"#
    )
}

/// Description with no WANIPConnection service (a media renderer).
pub const RENDERER_DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>Speaker</friendlyName>
    <UDN>uuid:renderer</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:AVTransport</serviceId>
        <SCPDURL>/AVT.xml</SCPDURL>
        <controlURL>/ctl/AVT</controlURL>
        <eventSubURL>/evt/AVT</eventSubURL>
      </service>
    </serviceList>
  </device>
</root>"#;

/// Gateway answer to `GetExternalIPAddress`.
pub fn external_ip_response(ip: &str) -> String {
    build_soap_response(WAN_IP_SERVICE, "GetExternalIPAddress", &[("NewExternalIPAddress", ip)]).unwrap()
}

/// UPnP 501 "Action Failed" fault, as sent with HTTP 500.
pub fn action_failed_fault() -> String {
    build_soap_fault(
        "s:Client",
        "UPnPError",
        Some((error_codes::ACTION_FAILED, "Action Failed")),
    )
    .unwrap()
}

/// URL on which nothing listens.
pub fn closed_port_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}
