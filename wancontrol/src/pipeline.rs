use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};
use wanupnp::ssdp::GatewayDiscovery;

use crate::cache::ChangeCache;
use crate::errors::RunError;
use crate::resolver::DescriptionResolver;
use crate::updater::AddressNotifier;
use crate::wan_ip_client::WanIpClient;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub discovery_timeout: Duration,
    pub http_timeout: Duration,
    pub cache_file: PathBuf,
    pub noop: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            discovery_timeout: Duration::from_secs(10),
            http_timeout: Duration::from_secs(10),
            cache_file: PathBuf::from(".wanwatch.cache"),
            noop: false,
        }
    }
}

/// How a successful run ended. Each variant carries the WAN address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Same address as the cache, nothing sent
    Unchanged(String),
    /// Address changed but no-op mode skipped the update
    DryRun(String),
    /// Update accepted and cache rewritten
    Updated(String),
}

impl RunOutcome {
    pub fn ip(&self) -> &str {
        match self {
            RunOutcome::Unchanged(ip) | RunOutcome::DryRun(ip) | RunOutcome::Updated(ip) => ip,
        }
    }
}

/// One discovery → resolution → query → compare → update pass.
pub struct Pipeline<D, N> {
    discovery: D,
    notifier: N,
    resolver: DescriptionResolver,
    client: WanIpClient,
    cache: ChangeCache,
    settings: PipelineSettings,
}

impl<D: GatewayDiscovery, N: AddressNotifier> Pipeline<D, N> {
    pub fn new(discovery: D, notifier: N, settings: PipelineSettings) -> Self {
        Self {
            discovery,
            notifier,
            resolver: DescriptionResolver::new(settings.http_timeout),
            client: WanIpClient::new(settings.http_timeout),
            cache: ChangeCache::new(settings.cache_file.clone()),
            settings,
        }
    }

    pub fn run(&self) -> Result<RunOutcome, RunError> {
        let response = self.discovery.discover(self.settings.discovery_timeout)?;
        let control_url = self.resolver.resolve(&response)?;
        info!("🎯 Control point: {}", control_url);

        let wan_ip = self.client.external_ip(&control_url);
        if wan_ip.is_empty() {
            return Err(RunError::UnknownAddress { control_url });
        }
        info!("🌐 Current WAN IP is {}", wan_ip);

        if !self.cache.has_changed(&wan_ip) {
            info!("WAN IP has not changed since last run");
            return Ok(RunOutcome::Unchanged(wan_ip));
        }

        if self.settings.noop {
            info!("No-op mode, skipping update for {}", wan_ip);
            return Ok(RunOutcome::DryRun(wan_ip));
        }

        self.notifier.notify(&wan_ip)?;

        info!("💾 Saving {} to {}", wan_ip, self.cache.path().display());
        if let Err(e) = self.cache.save(&wan_ip) {
            warn!("⚠️ Failed to write cache file {}: {}", self.cache.path().display(), e);
        }

        Ok(RunOutcome::Updated(wan_ip))
    }
}
