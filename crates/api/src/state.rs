use std::sync::Arc;

use teamhub_db::PgGateway;
use teamhub_engine::ProjectEngine;
use teamhub_events::{EventBus, InboxSink};

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: everything inside is an `Arc` or a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: teamhub_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Lifecycle, review and completion operations over Postgres.
    pub engine: Arc<ProjectEngine<PgGateway>>,
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Wire the engine to `pool`, delivering notifications into the inbox
    /// table and onto `event_bus`.
    pub fn new(pool: teamhub_db::DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        let sink = Arc::new(InboxSink::new(pool.clone(), Arc::clone(&event_bus)));
        let engine = ProjectEngine::new(PgGateway::new(pool.clone()), sink, config.engine_config());

        Self {
            pool,
            config: Arc::new(config),
            engine: Arc::new(engine),
            event_bus,
        }
    }
}
