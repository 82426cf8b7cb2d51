//! Server command-line arguments using clap.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use crudgate_axum::CorsConfig;
use crudgate_mongodb::MongoConfig;

use crate::error::{ServerError, ServerResult};

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// crudgate - generic CRUD over HTTP for document stores
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "crudgate")]
#[command(version)]
#[command(about = "Generic CRUD over HTTP for document stores", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI")]
    pub mongodb_uri: Option<String>,

    /// Database used by entities that do not name one
    #[arg(long, env = "MONGODB_DATABASE", default_value = crudgate_mongodb::config::DEFAULT_DATABASE)]
    pub database: String,

    /// Application name reported to MongoDB (overrides `appName` in the URI)
    #[arg(long, env = "MONGODB_APP_NAME")]
    pub mongodb_app_name: Option<String>,

    /// Maximum MongoDB connection pool size (overrides `maxPoolSize` in the URI)
    #[arg(long, env = "MONGODB_MAX_POOL_SIZE")]
    pub mongodb_max_pool_size: Option<u32>,

    /// MongoDB connect timeout in seconds
    #[arg(long, env = "MONGODB_CONNECT_TIMEOUT")]
    pub mongodb_connect_timeout: Option<u64>,

    /// MongoDB server selection timeout in seconds
    #[arg(long, env = "MONGODB_SERVER_SELECTION_TIMEOUT")]
    pub mongodb_server_selection_timeout: Option<u64>,

    /// Do not pin MongoDB to Stable API version 1
    #[arg(long, env = "MONGODB_NO_STABLE_API")]
    pub mongodb_no_stable_api: bool,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "ALLOWED_ORIGINS")]
    pub allowed_origins: Option<String>,

    /// Accept requests from any origin, including `null` (development only)
    #[arg(long, env = "ALLOW_NULL_ORIGIN")]
    pub allow_null_origin: bool,

    /// Serve from an in-memory store instead of MongoDB
    #[arg(long)]
    pub memory: bool,
}

impl Cli {
    /// The parsed listen address.
    pub fn bind_addr(&self) -> ServerResult<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| ServerError::config(format!("invalid bind address '{}': {}", self.bind, e)))
    }

    /// CORS settings.
    pub fn cors(&self) -> CorsConfig {
        self.allowed_origins
            .as_deref()
            .map(CorsConfig::from_list)
            .unwrap_or_default()
            .allow_null_origin(self.allow_null_origin)
    }

    /// MongoDB settings. A URI is required unless `--memory` is set.
    pub fn mongo_config(&self) -> ServerResult<MongoConfig> {
        let uri = self.mongodb_uri.clone().ok_or_else(|| {
            ServerError::config("a MongoDB URI is required (--mongodb-uri or MONGODB_URI), or pass --memory")
        })?;
        let mut builder = MongoConfig::builder()
            .uri(uri)
            .database(self.database.clone())
            .stable_api(!self.mongodb_no_stable_api);
        if let Some(name) = &self.mongodb_app_name {
            builder = builder.app_name(name.clone());
        }
        if let Some(size) = self.mongodb_max_pool_size {
            builder = builder.max_pool_size(size);
        }
        if let Some(secs) = self.mongodb_connect_timeout {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.mongodb_server_selection_timeout {
            builder = builder.server_selection_timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("crudgate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags() {
        let cli = parse(&[
            "--bind",
            "127.0.0.1:9000",
            "--mongodb-uri",
            "mongodb://db:27017",
            "--database",
            "app",
            "--allowed-origins",
            "https://a.example,https://b.example",
        ]);
        assert_eq!(cli.bind_addr().unwrap().port(), 9000);
        assert_eq!(
            cli.cors().effective_origins(),
            vec!["https://a.example", "https://b.example"]
        );
        let config = cli.mongo_config().unwrap();
        assert_eq!(config.uri, "mongodb://db:27017");
        assert_eq!(config.database, "app");
        assert_eq!(config.max_pool_size, None);
        assert!(config.stable_api);
        assert!(!cli.memory);
    }

    #[test]
    fn test_mongodb_tuning_flags() {
        let cli = parse(&[
            "--mongodb-uri",
            "mongodb://db:27017",
            "--mongodb-app-name",
            "billing",
            "--mongodb-max-pool-size",
            "25",
            "--mongodb-connect-timeout",
            "4",
            "--mongodb-server-selection-timeout",
            "9",
            "--mongodb-no-stable-api",
        ]);
        let config = cli.mongo_config().unwrap();
        assert_eq!(config.app_name.as_deref(), Some("billing"));
        assert_eq!(config.max_pool_size, Some(25));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(4)));
        assert_eq!(config.server_selection_timeout, Some(Duration::from_secs(9)));
        assert!(!config.stable_api);
    }

    #[test]
    fn test_rejects_bad_pool_size() {
        let args = ["crudgate", "--memory", "--mongodb-max-pool-size", "lots"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_memory_without_uri() {
        let cli = parse(&["--memory", "--bind", "127.0.0.1:0"]);
        assert!(cli.memory);
        assert!(cli.mongo_config().is_err());
    }

    #[test]
    fn test_bad_bind() {
        let cli = parse(&["--memory", "--bind", "nowhere"]);
        assert!(matches!(cli.bind_addr(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_null_origin_flag() {
        let cli = parse(&["--memory", "--allow-null-origin"]);
        assert!(cli.cors().mirrors_origin());
    }
}
