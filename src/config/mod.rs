use anyhow::Context;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::analytics::classifier::DevicePolicy;
use crate::analytics::session::DEFAULT_SESSION_WINDOW_MINUTES;
use crate::models::{Route, RouteTable};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub routes: RouteTable,
    pub analytics: AnalyticsConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Use the socket address only
    #[default]
    None,
    /// Trust Forwarded / X-Forwarded-For
    Standard,
    /// Trust CF-Connecting-IP
    Cloudflare,
}

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Rule order used by the user-agent classifier
    pub device_policy: DevicePolicy,

    /// Default gap for session window detection
    pub session_window_minutes: u32,

    pub trusted_proxy_mode: TrustedProxyMode,

    /// CIDR ranges of proxies whose forwarding headers are trusted
    pub trusted_proxies: Vec<IpNet>,

    /// Fixed number of trusted hops, counted from the right of the chain
    pub num_trusted_proxies: Option<usize>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            device_policy: DevicePolicy::default(),
            session_window_minutes: DEFAULT_SESSION_WINDOW_MINUTES,
            trusted_proxy_mode: TrustedProxyMode::default(),
            trusted_proxies: Vec::new(),
            num_trusted_proxies: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allow any origin, method and header
    pub allow_any: bool,
}

/// A routes file: `[[routes]]` entries with `slug` and `url`
#[derive(Debug, Deserialize)]
struct RoutesFile {
    #[serde(default)]
    routes: Vec<Route>,
}

fn flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

/// Load routes from a TOML, YAML or JSON file
pub fn load_routes_file(path: &str) -> anyhow::Result<Vec<Route>> {
    let settings = ::config::Config::builder()
        .add_source(::config::File::with_name(path))
        .build()
        .with_context(|| format!("Failed to read routes file {}", path))?;

    let file: RoutesFile = settings
        .try_deserialize()
        .with_context(|| format!("Invalid routes file {}", path))?;

    Ok(file.routes)
}

/// Built-in routes, then the routes file, then `REDIRECT_<SLUG>` overrides
pub fn resolve_routes(routes_file: Option<&str>) -> anyhow::Result<RouteTable> {
    resolve_routes_with(routes_file, |key| std::env::var(key).ok())
}

pub fn resolve_routes_with<F>(routes_file: Option<&str>, lookup: F) -> anyhow::Result<RouteTable>
where
    F: Fn(&str) -> Option<String>,
{
    let mut routes = RouteTable::builtin();

    if let Some(path) = routes_file {
        let extra = load_routes_file(path)?;
        tracing::info!("Loaded {} routes from {}", extra.len(), path);
        routes.extend(extra);
    }

    routes.apply_overrides(lookup);
    routes.validate()?;
    Ok(routes)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let routes_file = lookup("ROUTES_FILE");
        let routes = resolve_routes_with(routes_file.as_deref(), &lookup)?;

        Ok(Config {
            server: ServerConfig { host, port },
            routes,
            analytics: AnalyticsConfig::from_lookup(&lookup)?,
            cors: CorsConfig {
                allow_any: flag(lookup("CORS_ALLOW_ANY"), true),
            },
        })
    }
}

impl AnalyticsConfig {
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let device_policy = if flag(lookup("ANALYTICS_TABLET_PRECEDENCE"), false) {
            DevicePolicy::TabletFirst
        } else {
            DevicePolicy::MobileFirst
        };

        let session_window_minutes = lookup("ANALYTICS_SESSION_WINDOW_MINUTES")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&m| m > 0)
            .unwrap_or(DEFAULT_SESSION_WINDOW_MINUTES);

        let trusted_proxy_mode = match lookup("TRUSTED_PROXY_MODE")
            .unwrap_or_else(|| "none".to_string())
            .to_lowercase()
            .as_str()
        {
            "none" => TrustedProxyMode::None,
            "standard" => TrustedProxyMode::Standard,
            "cloudflare" => TrustedProxyMode::Cloudflare,
            other => {
                tracing::warn!(
                    "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'none'. Supported values: none, standard, cloudflare"
                );
                TrustedProxyMode::None
            }
        };

        let trusted_proxies = match lookup("TRUSTED_PROXIES") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<IpNet>()
                        .with_context(|| format!("Invalid CIDR in TRUSTED_PROXIES: {}", s))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let num_trusted_proxies =
            lookup("NUM_TRUSTED_PROXIES").and_then(|v| v.parse::<usize>().ok());

        Ok(AnalyticsConfig {
            device_policy,
            session_window_minutes,
            trusted_proxy_mode,
            trusted_proxies,
            num_trusted_proxies,
        })
    }
}
