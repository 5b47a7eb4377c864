// Application state module
// Couples the loaded configuration with the registered route table

use crate::routing::RouteSet;

use super::types::Config;

/// Application state, built once at startup and immutable afterwards
///
/// Concurrent reads need no synchronization because nothing here mutates
/// after construction; per-request state lives on the request task.
pub struct AppState {
    pub config: Config,
    pub routes: RouteSet,
}

impl AppState {
    pub const fn new(config: Config, routes: RouteSet) -> Self {
        Self { config, routes }
    }
}
