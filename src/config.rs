// Configuration management for fritz-route
// Supports CLI arguments, config file (TOML), and environment variables

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

use crate::error::{AppError, AppResult};
use crate::routes::reconcile::{ActiveMode, DesiredRoute};

const DEFAULT_CONFIG_FILE: &str = "fritz-route.toml";

/// fritz-route - Add, enable, disable or toggle a static route on a FRITZ!Box
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fritz-route")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Router user name
    #[arg(short, long, env = "FRITZ_USER")]
    pub user: Option<String>,

    /// Router password
    #[arg(short, long, env = "FRITZ_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Base URL of the router web interface, e.g. https://192.168.178.1
    #[arg(long, env = "FRITZ_URL")]
    pub url: Option<String>,

    /// Destination network of the route
    #[arg(short, long)]
    pub network: Option<String>,

    /// Subnet mask of the destination network
    #[arg(short, long)]
    pub subnet: Option<String>,

    /// Gateway the network is reached through
    #[arg(short, long)]
    pub gateway: Option<String>,

    /// Whether the route should be active (default: true)
    #[arg(long)]
    pub active: Option<bool>,

    /// Invert the active flag of the existing route
    #[arg(long, conflicts_with = "active")]
    pub toggle: bool,

    /// Only print the current route table
    #[arg(long)]
    pub list: bool,

    /// Verify the router's TLS certificate (off by default, routers use self-signed ones)
    #[arg(long, env = "FRITZ_VERIFY_TLS")]
    pub verify_tls: bool,

    /// Request timeout in seconds (default: none)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(short, long, env = "FRITZ_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Path to configuration file
    #[arg(short, long, env = "FRITZ_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Configuration file structure (TOML format)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Router access
    #[serde(default)]
    pub router: RouterConfig,

    /// Route to reconcile
    #[serde(default)]
    pub route: RouteConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,

    /// Verify the router's TLS certificate
    #[serde(default)]
    pub verify_tls: bool,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub network: Option<String>,
    pub subnet: Option<String>,
    pub gateway: Option<String>,
    pub active: Option<bool>,
    pub toggle: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl ConfigFile {
    /// Read `path`, or `fritz-route.toml` from the working directory if it exists.
    /// Returns the file that was used alongside its contents.
    pub fn load(path: Option<&Path>) -> AppResult<Option<(PathBuf, ConfigFile)>> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default_path.exists() {
                    return Ok(None);
                }
                default_path
            }
        };

        let content = std::fs::read_to_string(&path)?;
        let file = toml::from_str::<ConfigFile>(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Some((path, file)))
    }
}

/// Connection settings for the router
#[derive(Clone)]
pub struct RouterSettings {
    pub url: String,
    pub user: String,
    pub password: String,
    pub verify_tls: bool,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for RouterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterSettings")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// What a run does once logged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print the route table
    List,
    /// Create or update one route
    Apply(DesiredRoute),
}

/// Merged configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub router: RouterSettings,
    pub action: Action,
    pub log_level: Level,
    /// Config file the settings were read from, if any
    pub source: Option<PathBuf>,
    /// Conflicting settings that were resolved while merging; logged once
    /// the subscriber is up
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration from all sources (CLI args, config file, defaults)
    /// Priority: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> AppResult<Self> {
        let cli_args = CliArgs::parse();
        let loaded = ConfigFile::load(cli_args.config.as_deref())?;
        let (source, file) = match loaded {
            Some((path, file)) => (Some(path), file),
            None => (None, ConfigFile::default()),
        };
        let mut config = Config::merge(cli_args, file)?;
        config.source = source;
        Ok(config)
    }

    /// Merge CLI arguments over the config file and validate the result.
    ///
    /// Every missing setting is reported, not only the first one.
    pub fn merge(cli_args: CliArgs, file: ConfigFile) -> AppResult<Self> {
        let user = cli_args.user.or(file.router.user);
        let password = cli_args.password.or(file.router.password);
        let url = cli_args.url.or(file.router.url);
        let network = cli_args.network.or(file.route.network);
        let subnet = cli_args.subnet.or(file.route.subnet);
        let gateway = cli_args.gateway.or(file.route.gateway);

        let mut missing = Vec::new();
        require(&mut missing, &user, "Please specify a valid user!");
        require(&mut missing, &password, "Please specify a valid password!");
        require(&mut missing, &url, "Please specify a valid URL for the FritzBox!");
        if !cli_args.list {
            require(&mut missing, &network, "Please specify a valid network address!");
            require(&mut missing, &subnet, "Please specify a valid subnet mask!");
            require(&mut missing, &gateway, "Please specify a valid gateway IP address!");
        }

        let (Some(user), Some(password), Some(url)) = (user, password, url) else {
            return Err(AppError::ConfigurationInvalid(missing));
        };
        if !missing.is_empty() {
            return Err(AppError::ConfigurationInvalid(missing));
        }

        let log_level = cli_args.log_level.as_deref().unwrap_or(&file.logging.level);
        let log_level = parse_log_level(log_level)?;

        let mut warnings = Vec::new();

        let action = match (cli_args.list, network, subnet, gateway) {
            (true, ..) => Action::List,
            (false, Some(network), Some(subnet), Some(gateway)) => {
                let cli_flags = (cli_args.toggle, cli_args.active);
                let file_flags = (file.route.toggle.unwrap_or(false), file.route.active);
                let mode = resolve_mode(cli_flags, file_flags, &mut warnings);
                Action::Apply(DesiredRoute {
                    network: network.parse()?,
                    subnet_mask: subnet.parse()?,
                    gateway: gateway.parse()?,
                    mode,
                })
            }
            (false, ..) => return Err(AppError::ConfigurationInvalid(missing)),
        };

        let timeout = cli_args
            .timeout
            .or(file.router.timeout_seconds)
            .map(Duration::from_secs);

        Ok(Config {
            router: RouterSettings {
                url,
                user,
                password,
                verify_tls: cli_args.verify_tls || file.router.verify_tls,
                timeout,
            },
            action,
            log_level,
            source: None,
            warnings,
        })
    }
}

/// Pick the active mode from `(toggle, active)` pairs of both sources.
///
/// Command-line flags beat the config file. Within the file, `toggle` wins
/// over `active`.
fn resolve_mode(
    (cli_toggle, cli_active): (bool, Option<bool>),
    (file_toggle, file_active): (bool, Option<bool>),
    warnings: &mut Vec<String>,
) -> ActiveMode {
    if cli_toggle {
        return ActiveMode::Toggle;
    }
    if let Some(active) = cli_active {
        if file_toggle {
            warnings.push(format!(
                "--active {} overrides toggle = true from the config file",
                active
            ));
        }
        return ActiveMode::Explicit(active);
    }
    if file_toggle {
        if let Some(active) = file_active {
            warnings.push(format!(
                "Config file sets both active = {} and toggle = true, toggling",
                active
            ));
        }
        return ActiveMode::Toggle;
    }
    ActiveMode::Explicit(file_active.unwrap_or(true))
}

fn require(missing: &mut Vec<String>, value: &Option<String>, message: &str) {
    if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
        missing.push(message.to_string());
    }
}

fn parse_log_level(level_str: &str) -> AppResult<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(AppError::Config(format!("Invalid log level: {}", level_str))),
    }
}
