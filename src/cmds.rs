pub mod data;
pub mod events;
pub mod lifecycle;

use std::sync::Arc;

use crate::cache::FileStorage;
use crate::clients::DesktopClients;
use crate::config::ConfigProperties;
use crate::controller::{CacheController, ControllerConfig};
use crate::error::{AddContext, SWError};
use crate::http::Client;
use crate::Result;
use crate::log_debug;

/// Controller used by the command line: entries persist on disk between
/// invocations and the network is reached through `ureq`.
pub type DesktopController = CacheController<FileStorage, Client, DesktopClients>;

pub fn desktop_controller(config: &impl ConfigProperties) -> Result<DesktopController> {
    let location = config.cache_location().ok_or_else(|| {
        SWError::ConfigurationError("no cache location configured".to_string())
    })?;
    std::fs::create_dir_all(location)
        .err_context(format!("Could not create cache location {location}"))?;
    let storage = FileStorage::new(location);
    storage.validate_cache_location()?;
    log_debug!("Cache location: {}", storage.root().display());
    let runner = Client::new(config.fetch_timeout());
    Ok(CacheController::new(
        ControllerConfig::from_config(config),
        Arc::new(storage),
        Arc::new(runner),
        Arc::new(DesktopClients),
    ))
}
