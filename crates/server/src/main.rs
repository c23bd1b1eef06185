use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediamatch_core::{
    assistant::build_name_assistant,
    blacklist::SqliteBlacklist,
    cache::SqliteResultCache,
    load_config, validate_config,
    web_lookup::TmdbWebLookup,
    BlacklistStore, KeywordInference, MediaCatalog, ResultCache, Resolver, TmdbClient,
};

use mediamatch_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MEDIAMATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // SQLite stores (resolution cache and blacklist share the database file)
    let cache: Arc<dyn ResultCache> = Arc::new(
        SqliteResultCache::new(&config.database.path).context("Failed to create result cache")?,
    );
    info!("Result cache initialized");

    let blacklist: Arc<dyn BlacklistStore> = Arc::new(
        SqliteBlacklist::new(&config.database.path).context("Failed to create blacklist")?,
    );
    info!("Blacklist initialized");

    // Keyword inference is served by the API even when the fallback is off
    let keywords = Arc::new(
        KeywordInference::from_config(config.keyword.clone())
            .context("Failed to create keyword inference")?,
    );

    // Catalog client and resolver
    let resolver = match TmdbClient::new(config.tmdb.clone()) {
        Ok(client) => {
            info!("Initializing TMDB client (language: {})", config.tmdb.language);
            let catalog: Arc<dyn MediaCatalog> = Arc::new(client);
            let mut resolver = Resolver::new(
                catalog,
                Arc::clone(&cache),
                Arc::clone(&blacklist),
                config.matching.clone(),
            )
            .with_language(Some(config.tmdb.language.clone()));

            if config.fallbacks.web_lookup {
                info!("Website lookup fallback enabled");
                let web_lookup =
                    TmdbWebLookup::new(config.tmdb.web_url.clone(), config.fallbacks.web_timeout_secs)
                        .context("Failed to create website lookup")?;
                resolver = resolver.with_web_lookup(Arc::new(web_lookup));
            }

            if config.fallbacks.assistant {
                if let Some(llm_config) = &config.llm {
                    match build_name_assistant(llm_config) {
                        Ok(assistant) => {
                            info!(
                                "Assistant fallback enabled ({} / {})",
                                llm_config.provider.as_str(),
                                llm_config.model
                            );
                            resolver = resolver.with_assistant(assistant);
                        }
                        Err(e) => error!("Failed to create name assistant: {}", e),
                    }
                }
            }

            if config.fallbacks.keyword_search {
                info!("Keyword search fallback enabled");
                resolver = resolver.with_keyword_inference(Arc::clone(&keywords));
            }

            Some(Arc::new(resolver))
        }
        Err(e) => {
            warn!("Name resolution disabled: {}", e);
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), resolver, keywords, blacklist));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
