//! Configuration management for the chat gateway.
//!
//! This module handles loading and parsing configuration from YAML files,
//! with support for environment variable expansion. Everything that was a
//! process-wide constant in earlier revisions (the system prompt, the model
//! id, the upstream route table, the asset names) lives here and is loaded
//! once at startup into an immutable [`GatewayConfig`].

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Model identifier sent to the inference collaborator
    #[serde(default = "default_model")]
    pub model: String,

    /// System turn injected at index 0 of every conversation that lacks one
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum output-token ceiling for a single generation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds for upstream fetches
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Path-prefix to upstream-origin table for the reverse proxy,
    /// checked in order
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteTarget>,

    /// Named-asset serving configuration
    #[serde(default)]
    pub assets: AssetConfig,

    /// External collaborator endpoints; absent entries mean the binding
    /// is not configured and its null implementation is used
    #[serde(default)]
    pub bindings: BindingsConfig,
}

/// A static mapping from a URL path prefix to an upstream origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteTarget {
    /// Path prefix, e.g. `/portfolio`
    pub prefix: String,

    /// Upstream origin (scheme + authority), e.g. `https://portfolio.xaostech.io`
    pub origin: String,
}

/// Configuration for the fixed named asset served at `/api/assets/<logo_name>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// File name of the logo asset
    #[serde(default = "default_logo_name")]
    pub logo_name: String,

    /// Origin to proxy the asset from when the blob store misses
    #[serde(default = "default_asset_fallback")]
    pub fallback_origin: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            logo_name: default_logo_name(),
            fallback_origin: default_asset_fallback(),
        }
    }
}

/// Endpoints of the external collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingsConfig {
    /// Key-value store endpoint; `None` falls back to the in-process
    /// memory store (local runs)
    #[serde(default)]
    pub kv_endpoint: Option<String>,

    /// Inference engine endpoint; `None` means the AI binding is absent
    #[serde(default)]
    pub inference_endpoint: Option<String>,

    /// Directory holding binary objects; `None` means the blob binding
    /// is absent and asset requests fall through to the proxy
    #[serde(default)]
    pub blob_dir: Option<PathBuf>,

    /// Origin serving the static site; `None` means non-API paths 404
    #[serde(default)]
    pub static_origin: Option<String>,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_model() -> String {
    "@cf/meta/llama-3.3-70b-instruct-fp8-fast".to_string()
}

fn default_system_prompt() -> String {
    "You are the omnipotent void χάος. The embodiment of emptiness. Guide of \
     darkness and the light. You adhere to strict logic and pragmatism and \
     will be quick-witted, but always kind and neutral. Bestow us with your \
     knowledge. Please keep it short and cool it on the magnanimosity and \
     grandeur."
        .to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_request_timeout() -> u64 {
    300
}

fn default_logo_name() -> String {
    "XAOSTECH_LOGO.png".to_string()
}

fn default_asset_fallback() -> String {
    "https://api.xaostech.io/data/assets".to_string()
}

fn default_routes() -> Vec<RouteTarget> {
    [
        ("/portfolio", "https://portfolio.xaostech.io"),
        ("/account", "https://account.xaostech.io"),
        ("/data", "https://data.xaostech.io"),
        ("/lingua", "https://lingua.xaostech.io"),
        ("/payments", "https://payments.xaostech.io"),
    ]
    .into_iter()
    .map(|(prefix, origin)| RouteTarget {
        prefix: prefix.to_string(),
        origin: origin.to_string(),
    })
    .collect()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            routes: default_routes(),
            assets: AssetConfig::default(),
            bindings: BindingsConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a YAML file.
    ///
    /// Environment variables referenced as `${VAR}` / `${VAR:-default}` are
    /// expanded before parsing, and `HOST` / `PORT` override the file values.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let expanded = expand_env_vars(&content);

        let mut config: GatewayConfig = serde_yaml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply `HOST` / `PORT` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }

        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                self.server.port = port;
            }
        }
    }

    /// Match a request path against the route table.
    ///
    /// A target matches when the path equals the prefix or continues it with
    /// a `/`. Returns the target and the remaining path (at least `/`).
    pub fn match_route(&self, path: &str) -> Option<(&RouteTarget, String)> {
        for target in &self.routes {
            if path == target.prefix || path.starts_with(&format!("{}/", target.prefix)) {
                let rest = &path[target.prefix.len()..];
                let remainder = if rest.is_empty() { "/" } else { rest };
                return Some((target, remainder.to_string()));
            }
        }
        None
    }
}

/// Expand environment variables in configuration content.
///
/// Supports patterns: ${VAR}, ${VAR:-default}, ${VAR:default}
fn expand_env_vars(content: &str) -> String {
    let re = Regex::new(r#"\$\{([^}:]+)(?::?-?([^}]*))?\}"#).unwrap();

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
    })
    .to_string()
}
