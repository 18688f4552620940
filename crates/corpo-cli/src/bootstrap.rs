//! Process setup: configuration, logging and the client containers.

use anyhow::{Context, Result};
use corpo_application::CorpoClient;
use corpo_core::config::ClientConfig;
use corpo_core::navigation::{Navigator, Route};
use corpo_core::storage::KeyValueStore;
use corpo_core::transport::HttpTransport;
use corpo_infrastructure::{ConfigService, FileKeyValueStore};
use corpo_interaction::{LoggingTransport, ReqwestTransport};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub struct AppContext {
    pub client: CorpoClient,
}

impl AppContext {
    pub fn load(config_service: ConfigService) -> Result<Self> {
        let config = config_service
            .load()
            .context("Failed to load configuration")?;
        init_logging(&config);

        let storage_dir = config_service.storage_dir(&config)?;
        tracing::debug!(
            api_base_url = %config.api_base_url,
            storage_dir = %storage_dir.display(),
            "starting client"
        );

        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(storage_dir));
        let transport: Arc<dyn HttpTransport> = Arc::new(LoggingTransport::new(Arc::new(
            ReqwestTransport::new(config.api_base_url.clone()),
        )));

        Ok(Self {
            client: CorpoClient::new(transport, store, Arc::new(CliNavigator)),
        })
    }
}

/// `RUST_LOG` wins; otherwise the configured level. Logs go to stderr so
/// command output stays clean.
fn init_logging(config: &ClientConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// There is no view to switch to; the user is told what to run instead.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, route: Route) {
        if route == Route::Login {
            eprintln!("Signed out. Run `corpo login` to sign in again.");
        }
    }
}
