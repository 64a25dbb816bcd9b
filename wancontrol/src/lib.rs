//! Control point side of WANWatch: turns an SSDP reply into the gateway's
//! WAN address and reports changes.
//!
//! ```text
//! GatewayDiscovery ──► DescriptionResolver ──► WanIpClient ──► ChangeCache ──► AddressNotifier
//! ```

mod cache;
mod errors;
mod http;
mod pipeline;
mod resolver;
mod soap_client;
mod updater;
mod wan_ip_client;

pub use cache::{ChangeCache, has_changed, save};
pub use errors::{ControlError, ResolveError, RunError, UpdateError};
pub use pipeline::{Pipeline, PipelineSettings, RunOutcome};
pub use resolver::{DescriptionResolver, resolve_control_url};
pub use soap_client::{SoapCallResult, invoke_upnp_action};
pub use updater::{AddressNotifier, DEFAULT_ENDPOINT, TunnelBrokerConfig, TunnelBrokerNotifier};
pub use wan_ip_client::WanIpClient;

pub use wanupnp::ssdp::{DiscoveryError, DiscoveryResponse, GatewayDiscovery, SsdpListener};
