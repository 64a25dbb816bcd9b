use thiserror::Error;
use wanupnp::description::DescriptionParseError;
use wanupnp::soap::SoapParseError;
use wanupnp::ssdp::DiscoveryError;

/// Failure to turn a discovery response into a control URL.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("discovery response has no 'location' header")]
    MissingLocation,
    #[error("location header appears to be invalid: {0}")]
    InvalidLocationUrl(#[from] url::ParseError),
    #[error("error retrieving device description: {0}")]
    DescriptionFetch(#[from] ureq::Error),
    #[error("error parsing device description: {0}")]
    DescriptionParse(#[from] DescriptionParseError),
    #[error("no {0} service in device description")]
    ServiceNotFound(String),
}

/// Why a control invocation produced no address.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("error building control request: {0}")]
    Build(String),
    #[error("error posting control message: {0}")]
    Http(#[from] ureq::Error),
    #[error("{action} failed with HTTP status {status}: {detail}")]
    Status {
        action: String,
        status: u16,
        detail: String,
    },
    #[error("error parsing SOAP response: {0}")]
    Soap(#[from] SoapParseError),
    #[error("Missing {0} element in SOAP body")]
    MissingValue(String),
}

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("missing Tunnelbroker {0}")]
    MissingCredentials(&'static str),
    #[error("invalid update endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("error requesting tunnel update: {0}")]
    Http(#[from] ureq::Error),
    #[error("tunnel config update failed: {status} {body}")]
    Status { status: u16, body: String },
    #[error("tunnel config update rejected: {0}")]
    Rejected(String),
}

/// Everything that ends a run without a result.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("could not determine WAN IP address from {control_url}")]
    UnknownAddress { control_url: String },
    #[error(transparent)]
    Update(#[from] UpdateError),
}
