use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{ProxyError, Result};

pub const DEFAULT_LISTING_URL: &str = "https://api.github.com/repos/user/repo/contents/";

/// Environment variable consulted when no token is passed on the command line
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "ghproxy")]
#[command(about = "Serve a GitHub repository as a flat file server")]
#[command(version)]
pub struct Args {
    /// Contents API url to proxy
    #[arg(long, default_value = DEFAULT_LISTING_URL)]
    pub url: String,

    /// GitHub token (falls back to GITHUB_TOKEN when empty)
    #[arg(long = "github-token", default_value = "")]
    pub github_token: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 9000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Deadline for each upstream call, in seconds
    #[arg(long = "timeout-secs", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

/// CLI log level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Process configuration, resolved once at startup and never mutated
#[derive(Debug, Clone)]
pub struct Config {
    pub listing_url: String,
    pub token: Option<String>,
    pub listen_addr: SocketAddr,
    pub request_timeout: Duration,
    pub log_level: LogLevel,
}

impl Config {
    /// Resolve arguments against the process environment
    pub fn from_args(args: Args) -> Result<Self> {
        let env_token = std::env::var(TOKEN_ENV_VAR).ok();
        Self::resolve(args, env_token)
    }

    /// Resolve arguments with an explicit fallback token
    pub fn resolve(args: Args, env_token: Option<String>) -> Result<Self> {
        if args.url.is_empty() {
            return Err(ProxyError::InvalidConfig {
                message: "listing url must not be empty".to_string(),
            });
        }
        if args.timeout_secs == 0 {
            return Err(ProxyError::InvalidConfig {
                message: "timeout must be at least one second".to_string(),
            });
        }

        let listen_addr = format!("{}:{}", args.host, args.port)
            .parse::<SocketAddr>()
            .map_err(|e| ProxyError::InvalidConfig {
                message: format!("invalid listen address {}:{}: {}", args.host, args.port, e),
            })?;

        Ok(Self {
            listing_url: args.url,
            token: resolve_token(args.github_token, env_token),
            listen_addr,
            request_timeout: Duration::from_secs(args.timeout_secs),
            log_level: args.log_level,
        })
    }
}

/// An empty flag falls back to the environment; empty everywhere means no credential
fn resolve_token(flag: String, env_token: Option<String>) -> Option<String> {
    if !flag.is_empty() {
        return Some(flag);
    }
    env_token.filter(|token| !token.is_empty())
}
