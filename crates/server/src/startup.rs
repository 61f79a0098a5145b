use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, ServerConfig};
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{
    lookup::LookupService,
    runtime,
    scan::ScanPolicy,
    storage::{CsvRecordStore, RecordStore},
};

/// Resolve host/port from the server section
fn bind_addr(server: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}:{}: {e}", server.host, server.port)))
}

/// Wire the lookup service over `store` into a router.
pub fn build_app(store: Arc<dyn RecordStore>, max_scans: u32) -> Router {
    let lookup = LookupService::new(store, ScanPolicy::new(max_scans));
    routes::build_router(AppState { lookup })
}

/// Open (and if needed create) the record store; a corrupt file aborts here.
pub async fn open_store(cfg: &AppConfig) -> Result<Arc<CsvRecordStore>, StartupError> {
    runtime::ensure_env(&cfg.store.path).await?;
    let store = CsvRecordStore::open(&cfg.store.path).await?;
    Ok(store)
}

/// Public entry: build the app and run the HTTP server until `shutdown` resolves
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let store = open_store(&cfg).await?;
    let app = build_app(store, cfg.scan.max_scans);

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, max_scans = cfg.scan.max_scans, store = %cfg.store.path.display(), "starting verification server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("cannot bind {addr}: {e}")))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!("verification server stopped");
    Ok(())
}
