//! # WANWatch Configuration Module
//!
//! This module provides configuration management for WANWatch, including:
//! - Loading configuration from a YAML file
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters for configuration values
//!
//! ## Usage
//!
//! ```no_run
//! use wanconfig::Config;
//!
//! let config = Config::load_config(None)?;
//! let timeout = config.get_discovery_timeout();
//! let cache = config.get_cache_file();
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Unlike a long-running server configuration, the merged result is never
//! written back to disk: it may hold the Tunnelbroker password.

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    net::Ipv4Addr,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, warn};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("wanwatch.yaml");

pub const ENV_CONFIG_DIR: &str = "WANWATCH_CONFIG";
pub const ENV_PREFIX: &str = "WANWATCH_CONFIG__";

const CONFIG_DIR_NAME: &str = ".wanwatch";
const CONFIG_FILE_NAME: &str = "config.yaml";

// Default values for configuration
const DEFAULT_DISCOVERY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_FILE: &str = ".wanwatch.cache";
const DEFAULT_TUNNELBROKER_ENDPOINT: &str = "https://ipv4.tunnelbroker.net/nic/update";
const DEFAULT_LOG_MIN_LEVEL: &str = "info";
const DEFAULT_NOOP: bool = false;

/// Macro to generate a getter for a string value with default
macro_rules! impl_string_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) => s,
                Ok(Value::Null) | Err(_) => $default.to_string(),
                Ok(other) => scalar_to_string(&other).unwrap_or_else(|| {
                    warn!("{} is not a string, using default", $path.join("."));
                    $default.to_string()
                }),
            }
        }
    };
}

/// Macro to generate a getter for a bool value with default
macro_rules! impl_bool_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                Ok(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
                Ok(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
                Err(_) => $default,
                Ok(other) => {
                    warn!(
                        "Invalid boolean {:?} for {}, using default {}",
                        other,
                        $path.join("."),
                        $default
                    );
                    $default
                }
            }
        }
    };
}

/// Macro to generate a getter for a duration expressed in seconds
macro_rules! impl_duration_config {
    ($getter:ident, $path:expr, $default_secs:expr) => {
        pub fn $getter(&self) -> Duration {
            let value = self.get_value($path).ok();
            match value.as_ref().and_then(duration_from_value) {
                Some(duration) => duration,
                None => {
                    if let Some(v) = value {
                        warn!(
                            "Invalid duration {:?} for {}, using default {}s",
                            v,
                            $path.join("."),
                            $default_secs
                        );
                    }
                    Duration::from_secs($default_secs)
                }
            }
        }
    };
}

/// Configuration manager for WANWatch
///
/// Holds the merged YAML tree (defaults, then `config.yaml`, then
/// `WANWATCH_CONFIG__*` environment variables). Keys are case-insensitive.
#[derive(Debug, Clone)]
pub struct Config {
    config_dir: PathBuf,
    data: Value,
}

impl Config {
    /// Finds the config directory by trying different locations in order
    ///
    /// 1. The provided `directory`
    /// 2. The `WANWATCH_CONFIG` environment variable
    /// 3. `.wanwatch` in the current directory
    /// 4. `.wanwatch` in the user's home directory
    ///
    /// Falls back to `.wanwatch`; the directory does not need to exist.
    pub fn find_config_dir(directory: Option<&Path>) -> PathBuf {
        if let Some(dir) = directory {
            return dir.to_path_buf();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        if Path::new(CONFIG_DIR_NAME).is_dir() {
            return PathBuf::from(CONFIG_DIR_NAME);
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.is_dir() {
                return home_config;
            }
        }

        PathBuf::from(CONFIG_DIR_NAME)
    }

    /// Loads the configuration
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with `config.yaml` from that directory if present
    /// 4. Applies environment variable overrides
    pub fn load_config(directory: Option<&Path>) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join(CONFIG_FILE_NAME);
        let external = match fs::read_to_string(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                Some(data)
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
                None
            }
        };

        Self::from_sources(config_dir, external.as_deref(), env::vars())
    }

    /// Builds a configuration from an optional YAML document and a set of
    /// environment variables
    pub fn from_sources<I>(config_dir: PathBuf, external: Option<&str>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let defaults = lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?);
        let mut data = defaults.clone();

        if let Some(yaml) = external {
            let external_value: Value = serde_yaml::from_str(yaml)?;
            if !external_value.is_null() {
                merge_yaml(&mut data, &lower_keys_value(external_value));
            }
        }

        apply_env_overrides(&mut data, &defaults, vars);

        Ok(Config { config_dir, data })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["discovery", "timeout_secs"]`)
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        get_value_internal(&self.data, path)
    }

    /// Sets a configuration value at the specified path (in memory only)
    pub fn set_value(&mut self, path: &[&str], value: Value) -> Result<()> {
        set_value_internal(&mut self.data, path, value)
    }

    impl_duration_config!(
        get_discovery_timeout,
        &["discovery", "timeout_secs"],
        DEFAULT_DISCOVERY_TIMEOUT_SECS
    );

    impl_duration_config!(
        get_http_timeout,
        &["http", "timeout_secs"],
        DEFAULT_HTTP_TIMEOUT_SECS
    );

    impl_bool_config!(get_noop, &["updater", "noop"], DEFAULT_NOOP);

    impl_string_config!(
        get_tunnelbroker_endpoint,
        &["tunnelbroker", "endpoint"],
        DEFAULT_TUNNELBROKER_ENDPOINT
    );
    impl_string_config!(get_tunnelbroker_username, &["tunnelbroker", "username"], "");
    impl_string_config!(get_tunnelbroker_password, &["tunnelbroker", "password"], "");
    impl_string_config!(get_tunnelbroker_tunnel_id, &["tunnelbroker", "tunnel_id"], "");
    impl_string_config!(get_log_min_level, &["log", "min_level"], DEFAULT_LOG_MIN_LEVEL);

    /// Local IPv4 address the SSDP socket binds to, if configured
    pub fn get_discovery_bind_address(&self) -> Option<Ipv4Addr> {
        match self.get_value(&["discovery", "bind_address"]) {
            Ok(Value::String(s)) if s.trim().is_empty() => None,
            Ok(Value::String(s)) => match s.trim().parse::<Ipv4Addr>() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    warn!("Invalid bind address '{}', binding on all interfaces", s);
                    None
                }
            },
            _ => None,
        }
    }

    /// File holding the last IP reported to the remote endpoint
    pub fn get_cache_file(&self) -> PathBuf {
        match self.get_value(&["cache", "file"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => PathBuf::from(s.trim()),
            _ => PathBuf::from(DEFAULT_CACHE_FILE),
        }
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            let key = key.to_lowercase();

            if let Some(next) = map.get(&Value::String(key)) {
                current = next;
            } else {
                return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
            }
        } else {
            return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

/// Keys whose embedded default is a string keep the raw variable text, so
/// secrets such as `0x1F` or `1.50` are not reinterpreted as numbers.
fn apply_env_overrides<I>(config: &mut Value, defaults: &Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path = stripped.split("__").collect::<Vec<_>>();
        let converted = match get_value_internal(defaults, &key_path) {
            Ok(Value::String(_)) => Value::String(value),
            _ => convert_env_value(&value),
        };
        if let Err(err) = set_value_internal(config, &key_path, converted) {
            warn!("Ignoring env override {}: {}", key, err);
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    match serde_yaml::from_str::<Value>(value) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => parsed,
        _ => Value::String(value.to_string()),
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let new_key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(new_key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn duration_from_value(value: &Value) -> Option<Duration> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(Duration::from_secs)
            .or_else(|| {
                n.as_f64()
                    .and_then(|f| Duration::try_from_secs_f64(f).ok())
            }),
        Value::String(s) => s.trim().parse::<u64>().ok().map(Duration::from_secs),
        _ => None,
    }
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default value.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    fn config(external: Option<&str>, vars: Vec<(&str, &str)>) -> Config {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>();
        Config::from_sources(PathBuf::from(".wanwatch"), external, vars).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(PathBuf::from("x"), None, no_env()).unwrap();

        assert_eq!(config.get_discovery_timeout(), Duration::from_secs(10));
        assert_eq!(config.get_http_timeout(), Duration::from_secs(10));
        assert_eq!(config.get_discovery_bind_address(), None);
        assert_eq!(config.get_cache_file(), PathBuf::from(".wanwatch.cache"));
        assert!(!config.get_noop());
        assert_eq!(
            config.get_tunnelbroker_endpoint(),
            "https://ipv4.tunnelbroker.net/nic/update"
        );
        assert_eq!(config.get_tunnelbroker_username(), "");
        assert_eq!(config.get_log_min_level(), "info");
        assert_eq!(config.config_dir(), Path::new("x"));
    }

    #[test]
    fn test_external_file_is_merged() {
        let yaml = "
Discovery:
  Timeout_Secs: 3
tunnelbroker:
  username: alice
  tunnel_id: 12345
";
        let config = config(Some(yaml), vec![]);

        assert_eq!(config.get_discovery_timeout(), Duration::from_secs(3));
        assert_eq!(config.get_tunnelbroker_username(), "alice");
        assert_eq!(config.get_tunnelbroker_tunnel_id(), "12345");
        // untouched defaults survive the merge
        assert_eq!(config.get_http_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.get_value(&["discovery", "bind_address"]).unwrap(),
            Value::String(String::new())
        );
        assert_eq!(
            config.get_tunnelbroker_endpoint(),
            "https://ipv4.tunnelbroker.net/nic/update"
        );
    }

    #[test]
    fn test_empty_external_file() {
        let config = config(Some(""), vec![]);
        assert_eq!(config.get_discovery_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_overrides_win() {
        let config = config(
            Some("updater:\n  noop: false\n"),
            vec![
                ("WANWATCH_CONFIG__UPDATER__NOOP", "true"),
                ("WANWATCH_CONFIG__TUNNELBROKER__PASSWORD", "s3cr3t:with:colons"),
                ("WANWATCH_CONFIG__DISCOVERY__BIND_ADDRESS", "192.168.1.10"),
                ("OTHER_VAR", "ignored"),
            ],
        );

        assert!(config.get_noop());
        assert_eq!(config.get_tunnelbroker_password(), "s3cr3t:with:colons");
        assert_eq!(
            config.get_discovery_bind_address(),
            Some(Ipv4Addr::new(192, 168, 1, 10))
        );
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let yaml = "
discovery:
  timeout_secs: soon
  bind_address: not-an-ip
updater:
  noop: 42
";
        let config = config(Some(yaml), vec![]);

        assert_eq!(config.get_discovery_timeout(), Duration::from_secs(10));
        assert_eq!(config.get_discovery_bind_address(), None);
        assert!(!config.get_noop());
    }

    #[test]
    fn test_fractional_timeout() {
        let config = config(Some("http:\n  timeout_secs: 2.5\n"), vec![]);
        assert_eq!(config.get_http_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_out_of_range_timeout_falls_back_to_default() {
        let config = config(
            Some("http:\n  timeout_secs: 1.0e30\ndiscovery:\n  timeout_secs: -2.5\n"),
            vec![],
        );
        assert_eq!(config.get_http_timeout(), Duration::from_secs(10));
        assert_eq!(config.get_discovery_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_credentials_keep_their_text() {
        let config = config(
            Some("tunnelbroker:\n  tunnel_id: 42\n"),
            vec![
                ("WANWATCH_CONFIG__TUNNELBROKER__USERNAME", "007"),
                ("WANWATCH_CONFIG__TUNNELBROKER__PASSWORD", "0x1F"),
                ("WANWATCH_CONFIG__TUNNELBROKER__TUNNEL_ID", "1.50"),
                ("WANWATCH_CONFIG__HTTP__TIMEOUT_SECS", "4"),
            ],
        );

        assert_eq!(config.get_tunnelbroker_username(), "007");
        assert_eq!(config.get_tunnelbroker_password(), "0x1F");
        assert_eq!(config.get_tunnelbroker_tunnel_id(), "1.50");
        // non-string keys are still typed
        assert_eq!(
            config.get_value(&["http", "timeout_secs"]).unwrap(),
            Value::Number(4.into())
        );
        assert_eq!(config.get_http_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_get_and_set_value() {
        let mut config = config(None, vec![]);

        config
            .set_value(&["Cache", "File"], Value::String("/tmp/wan.cache".to_string()))
            .unwrap();
        assert_eq!(config.get_cache_file(), PathBuf::from("/tmp/wan.cache"));

        assert!(config.get_value(&["nope", "missing"]).is_err());
        assert!(config.set_value(&["cache", "file", "deeper"], Value::Null).is_err());
    }

    #[test]
    fn test_load_config_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "cache:\n  file: /var/lib/wanwatch/last_ip\n",
        )
        .unwrap();

        let config = Config::load_config(Some(dir.path())).unwrap();
        assert_eq!(config.config_dir(), dir.path());
        assert_eq!(
            config.get_cache_file(),
            PathBuf::from("/var/lib/wanwatch/last_ip")
        );
    }

    #[test]
    fn test_load_config_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(Some(dir.path())).unwrap();
        assert_eq!(config.get_discovery_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let result = Config::from_sources(PathBuf::from("x"), Some("a: [unclosed"), no_env());
        assert!(result.is_err());
    }
}
