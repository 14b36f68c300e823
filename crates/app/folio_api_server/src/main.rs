//! Folio API server binary.
//!
//! Builds the user repository, the refresh-session store and the services
//! once, then serves the REST API until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use folio_api::AppState;
use folio_api::config::ApiConfig;
use folio_core::auth::{
    AuthError, MemoryRefreshTokenStore, RedisRefreshTokenStore, RefreshTokenStore,
};
use folio_core::users::PgUserRepository;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Backend for refresh sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Shared Redis instance.
    Redis,
    /// Process memory; sessions are lost on restart.
    Memory,
}

/// CLI arguments for the API server.
///
/// Settings left unset here fall back to the environment, see
/// [`ApiConfig::from_env`].
#[derive(Parser, Debug)]
#[command(name = "folio_api_server", about = "Folio API server")]
struct Args {
    /// Address to listen on (overrides BIND_ADDR).
    #[arg(long)]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL (overrides DATABASE_URL).
    #[arg(long)]
    database_url: Option<String>,

    /// Redis connection URL (overrides REDIS_URL).
    #[arg(long)]
    redis_url: Option<String>,

    /// Refresh-session store backend.
    #[arg(long, value_enum, default_value_t = StoreKind::Redis)]
    store: StoreKind,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Access token lifetime in seconds (overrides JWT_ACCESS_TOKEN_TTL_SECS).
    #[arg(long)]
    access_token_ttl_secs: Option<u64>,

    /// Refresh token lifetime in seconds (overrides JWT_REFRESH_TOKEN_TTL_SECS).
    #[arg(long)]
    refresh_token_ttl_secs: Option<u64>,

    /// Timeout for each refresh-session store command, in milliseconds
    /// (overrides STORE_TIMEOUT_MS).
    #[arg(long)]
    store_timeout_ms: Option<u64>,
}

impl Args {
    /// Layer the flags over `base` and validate the result.
    fn into_config(self, base: ApiConfig) -> Result<(ApiConfig, StoreKind, u32), AuthError> {
        let config = ApiConfig {
            bind_addr: self.bind_addr.unwrap_or(base.bind_addr),
            database_url: self.database_url.unwrap_or(base.database_url),
            redis_url: self.redis_url.unwrap_or(base.redis_url),
            jwt_secret: base.jwt_secret,
            access_token_ttl: self
                .access_token_ttl_secs
                .map_or(base.access_token_ttl, Duration::from_secs),
            refresh_token_ttl: self
                .refresh_token_ttl_secs
                .map_or(base.refresh_token_ttl, Duration::from_secs),
            store_timeout: self
                .store_timeout_ms
                .map_or(base.store_timeout, Duration::from_millis),
        };
        config.validate()?;
        Ok((config, self.store, self.max_connections))
    }
}

async fn refresh_store(
    kind: StoreKind,
    config: &ApiConfig,
) -> Result<Arc<dyn RefreshTokenStore>, Box<dyn std::error::Error>> {
    match kind {
        StoreKind::Redis => {
            let store =
                RedisRefreshTokenStore::connect(&config.redis_url, config.store_timeout).await?;
            store.ping().await?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            warn!("using in-memory refresh session store; sessions will not survive restart");
            Ok(Arc::new(MemoryRefreshTokenStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,folio_api=debug,folio_core=debug")
                }),
        )
        .init();

    let args = Args::parse();
    let (config, store_kind, max_connections) = args.into_config(ApiConfig::from_env())?;

    info!(
        bind_addr = %config.bind_addr,
        store = ?store_kind,
        max_connections,
        "starting folio_api_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    folio_core::migrate::migrate(&pool).await?;

    let store = refresh_store(store_kind, &config).await?;
    let state = AppState::compose(&config, store, Arc::new(PgUserRepository::new(pool)));
    let app = folio_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn store_defaults_to_redis() {
        let args = Args::try_parse_from(["folio_api_server"]).unwrap();
        assert_eq!(args.store, StoreKind::Redis);
    }

    fn base() -> ApiConfig {
        ApiConfig {
            bind_addr: "127.0.0.1:8080".into(),
            database_url: "postgres://localhost:5432/folio".into(),
            redis_url: "redis://127.0.0.1:6379/0".into(),
            jwt_secret: "secret".into(),
            access_token_ttl: Duration::from_secs(900),
            refresh_token_ttl: Duration::from_secs(3600),
            store_timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn unset_flags_keep_base_config() {
        let args = Args::try_parse_from(["folio_api_server"]).unwrap();
        let (config, _, max_connections) = args.into_config(base()).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.access_token_ttl, Duration::from_secs(900));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(3600));
        assert_eq!(max_connections, 5);
    }

    #[test]
    fn ttl_flags_flow_into_config() {
        let args = Args::try_parse_from([
            "folio_api_server",
            "--store",
            "memory",
            "--access-token-ttl-secs",
            "60",
            "--refresh-token-ttl-secs",
            "120",
        ])
        .unwrap();
        let (config, kind, _) = args.into_config(base()).unwrap();
        assert_eq!(kind, StoreKind::Memory);
        assert_eq!(config.access_token_ttl, Duration::from_secs(60));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(120));
        assert_eq!(config.jwt_secret, "secret");
    }

    #[test]
    fn zero_ttl_flag_is_rejected() {
        let args =
            Args::try_parse_from(["folio_api_server", "--access-token-ttl-secs", "0"]).unwrap();
        assert!(matches!(args.into_config(base()), Err(AuthError::Internal(_))));
    }

    #[test]
    fn huge_ttl_flag_is_rejected() {
        let huge = u64::MAX.to_string();
        let args = Args::try_parse_from([
            "folio_api_server",
            "--store",
            "memory",
            "--refresh-token-ttl-secs",
            huge.as_str(),
        ])
        .unwrap();
        assert!(matches!(args.into_config(base()), Err(AuthError::Internal(_))));
    }
}
