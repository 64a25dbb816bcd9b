use std::time::Duration;

use ureq::Agent;

/// Blocking HTTP agent bounded by `timeout`.
///
/// With `status_as_error` off, 4xx/5xx responses come back as regular
/// responses so their body (SOAP fault, updater message) can be read.
pub(crate) fn build_agent(timeout: Duration, status_as_error: bool) -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(status_as_error)
        .build();

    config.into()
}
