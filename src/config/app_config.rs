use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::time::Duration;
use std::{env, io};

use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
    error::ResolveError,
};

use super::monitor_config::MonitorConfig;

const DEFAULT_CONFIG_FILE: &str = "config.yml";
const DEFAULT_LIVENESS_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid YAML in {path}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid DNS host {0:?}")]
    DnsHost(String, #[source] AddrParseError),

    #[error("invalid liveness address {0:?}")]
    LivenessAddr(String, #[source] AddrParseError),

    #[error("failed to load system DNS configuration")]
    SystemResolver(#[from] ResolveError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub dns_hosts: Vec<String>,
    pub liveness_addr: SocketAddr,
    pub telegram: Option<TelegramConfig>,
}

/// Load the application configuration from the environment and the optional YAML file.
/// `CONFIG_FILE` names the YAML file (default `config.yml`); a missing file means defaults.
/// `DNS_HOSTS`, `LIVENESS_ADDR`, `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` come from the environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(|key| env::var(key).ok())
}

fn load_config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, ConfigError> {
    let config_file_location =
        lookup("CONFIG_FILE").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    let monitor = match std::fs::read_to_string(&config_file_location) {
        Ok(config_str) => {
            MonitorConfig::from_yaml(&config_str).map_err(|source| ConfigError::Yaml {
                path: config_file_location.clone(),
                source,
            })?
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("No config file at {config_file_location}, using defaults");
            MonitorConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_file_location,
                source,
            });
        }
    };

    let dns_hosts: Vec<String> = lookup("DNS_HOSTS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if dns_hosts.is_empty() {
        log::info!("Using system DNS configuration");
    } else {
        log::info!("Using DNS hosts: {:?}", dns_hosts);
    }

    let liveness_addr = lookup("LIVENESS_ADDR").unwrap_or_else(|| DEFAULT_LIVENESS_ADDR.to_string());
    let liveness_addr: SocketAddr = liveness_addr
        .parse()
        .map_err(|e| ConfigError::LivenessAddr(liveness_addr.clone(), e))?;

    let bot_token = lookup("TELEGRAM_BOT_TOKEN").filter(|s| !s.is_empty());
    let chat_id = lookup("TELEGRAM_CHAT_ID").filter(|s| !s.is_empty());
    let telegram = match (bot_token, chat_id) {
        (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
        (None, None) => None,
        _ => {
            log::warn!("Telegram needs both TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID; alerts will only be logged");
            None
        }
    };

    Ok(AppConfig {
        monitor,
        dns_hosts,
        liveness_addr,
        telegram,
    })
}

/// Setup a DNS resolver for the certificate probe.
/// With no hosts given, the system configuration is used. Otherwise the resolver
/// queries the given hosts over TCP, with 2 attempts, a 100 millisecond timeout
/// and a cache of 1024 entries.
pub fn setup_resolver(dns_hosts: &[String]) -> Result<TokioAsyncResolver, ConfigError> {
    if dns_hosts.is_empty() {
        return Ok(TokioAsyncResolver::tokio_from_system_conf()?);
    }

    let mut opts = ResolverOpts::default();
    opts.attempts = 2;
    opts.timeout = Duration::from_millis(100);
    opts.cache_size = 1024;

    let mut name_servers = NameServerConfigGroup::new();

    for host in dns_hosts {
        let ip: IpAddr = host
            .parse()
            .map_err(|e| ConfigError::DnsHost(host.clone(), e))?;
        name_servers.push(NameServerConfig {
            socket_addr: (ip, 53).into(),
            protocol: Protocol::Tcp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });
    }

    let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
    Ok(TokioAsyncResolver::tokio(resolver_config, opts))
}
