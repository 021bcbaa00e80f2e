//! Offline cache controller.
//!
//! Owns one versioned cache generation and drives it through the
//! `Uninstalled -> Installing -> Installed -> Activating -> Active` lifecycle.
//! Once active, every GET over http(s) goes network-first: fresh 200s are
//! copied into the cache, and when the network rejects the request the
//! controller answers from the cache, the offline page (navigations) or a
//! synthetic 503 (sub-resources). A fetch never ends in an error once the
//! controller is active.

use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api_defaults;
use crate::cache::{Cache, CacheStorage};
use crate::clients::Clients;
use crate::config::ConfigProperties;
use crate::error::SWError;
use crate::http::{resolve_url, Method, Request, RequestKey};
use crate::io::{HttpRunner, Response};
use crate::notification::Notification;
use crate::Result;
use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Uninstalled,
    Installing,
    /// Installed and waiting for the previous generation's clients to go.
    Installed,
    Activating,
    Active,
    /// Failed to install or superseded by a newer generation.
    Redundant,
}

impl ControllerState {
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, ControllerState::Active)
    }
}

impl Display for ControllerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = match self {
            ControllerState::Uninstalled => "uninstalled",
            ControllerState::Installing => "installing",
            ControllerState::Installed => "installed",
            ControllerState::Activating => "activating",
            ControllerState::Active => "active",
            ControllerState::Redundant => "redundant",
        };
        write!(f, "{state}")
    }
}

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Cache generation tag, also the name of the cache store.
    pub cache_name: String,
    pub origin: String,
    pub offline_url: String,
    /// Seed set pre-cached on install. Paths resolve against `origin`.
    pub manifest: Vec<String>,
    pub notification_title: String,
    pub skip_waiting: bool,
}

impl ControllerConfig {
    pub fn from_config(config: &impl ConfigProperties) -> Self {
        ControllerConfig {
            cache_name: config.cache_name().to_string(),
            origin: config.origin().to_string(),
            offline_url: config.offline_url().to_string(),
            manifest: config.manifest(),
            notification_title: config.notification_title().to_string(),
            skip_waiting: config.skip_waiting(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            cache_name: api_defaults::CACHE_NAME.to_string(),
            origin: api_defaults::DEFAULT_ORIGIN.to_string(),
            offline_url: api_defaults::OFFLINE_URL.to_string(),
            manifest: api_defaults::SEED_MANIFEST
                .iter()
                .map(|url| url.to_string())
                .collect(),
            notification_title: api_defaults::NOTIFICATION_TITLE.to_string(),
            skip_waiting: true,
        }
    }
}

/// Outcome of intercepting a request.
#[derive(Debug, PartialEq)]
pub enum FetchEvent {
    /// Not handled; the request goes to the network untouched.
    Passthrough,
    Respond(Response),
}

#[derive(Debug, Default, PartialEq)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub enum NotificationClick {
    Opened(String),
    Closed,
}

#[derive(Debug, PartialEq)]
pub enum SyncOutcome {
    Acknowledged,
    Ignored,
}

pub struct CacheController<S, R, C> {
    config: ControllerConfig,
    storage: Arc<S>,
    runner: Arc<R>,
    clients: Arc<C>,
    state: Mutex<ControllerState>,
    skip_waiting: AtomicBool,
}

impl<S, R, C> CacheController<S, R, C> {
    pub fn new(config: ControllerConfig, storage: Arc<S>, runner: Arc<R>, clients: Arc<C>) -> Self {
        CacheController {
            config,
            storage,
            runner,
            clients,
            state: Mutex::new(ControllerState::Uninstalled),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Network runner behind the controller. Requests sent straight to it
    /// bypass the offline policy.
    pub fn runner(&self) -> Arc<R> {
        self.runner.clone()
    }

    pub fn state(&self) -> ControllerState {
        *self.lock_state()
    }

    /// Whether install asked to take over without waiting for the previous
    /// generation's clients to close.
    pub fn skips_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Mark this generation as superseded.
    pub fn retire(&self) {
        log_info!("Cache generation {} is now redundant", self.config.cache_name);
        self.set_state(ControllerState::Redundant);
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        // The state is a plain Copy value; a panic while holding the lock
        // cannot leave it half written.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: ControllerState) {
        *self.lock_state() = state;
    }

    /// Move from one of `from` to `to`, or fail without touching the state.
    fn transition(&self, from: &[ControllerState], to: ControllerState) -> Result<()> {
        let mut state = self.lock_state();
        if !from.contains(&*state) {
            return Err(SWError::InvalidTransition(format!("cannot go from {} to {}", *state, to)).into());
        }
        *state = to;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        resolve_url(&self.config.origin, path)
    }
}

impl<S: CacheStorage, R: HttpRunner, C: Clients> CacheController<S, R, C> {
    /// Pre-cache the seed manifest. All or nothing: if any seed URL fails to
    /// fetch or answers non-2xx the generation becomes redundant and no
    /// cache store is left behind. Installing an already installed
    /// generation again only refreshes its entries.
    pub fn install(&self) -> Result<()> {
        self.transition(
            &[ControllerState::Uninstalled, ControllerState::Installed],
            ControllerState::Installing,
        )?;
        log_info!("Installing cache generation {}", self.config.cache_name);
        match self.precache() {
            Ok(count) => {
                if self.config.skip_waiting {
                    self.skip_waiting.store(true, Ordering::SeqCst);
                }
                self.set_state(ControllerState::Installed);
                log_info!(
                    "Installed cache generation {} with {} entries",
                    self.config.cache_name,
                    count
                );
                Ok(())
            }
            Err(err) => {
                self.set_state(ControllerState::Redundant);
                log_error!(
                    "Install of cache generation {} failed: {}",
                    self.config.cache_name,
                    err
                );
                Err(err)
            }
        }
    }

    fn precache(&self) -> Result<usize> {
        let mut entries = Vec::with_capacity(self.config.manifest.len());
        // Fetch everything before touching the storage so a failed install
        // never leaves a partial cache.
        for path in &self.config.manifest {
            let request = Request::get(&self.url(path));
            let response = self.runner.fetch(&request).map_err(|err| {
                SWError::InstallFailed(format!("could not fetch {}: {}", request.url(), err))
            })?;
            if !response.is_ok() {
                return Err(SWError::InstallFailed(format!(
                    "{} answered with status {}",
                    request.url(),
                    response.status
                ))
                .into());
            }
            log_debug!("Fetched seed entry {}", request.url());
            entries.push((request.key(), response));
        }

        let name = &self.config.cache_name;
        let existed = self.storage.has(name)?;
        let cache = self.storage.open(name)?;
        for (key, response) in &entries {
            if let Err(err) = cache.put(key, response) {
                if !existed {
                    if let Err(delete_err) = self.storage.delete(name) {
                        log_error!("Could not remove partial cache {}: {}", name, delete_err);
                    }
                }
                return Err(SWError::InstallFailed(format!("could not store {key}: {err}")).into());
            }
        }
        Ok(entries.len())
    }

    /// Drop every cache generation but the current one and take control of
    /// the open pages. Failing to delete a stale cache is logged and does not
    /// stop the activation.
    pub fn activate(&self) -> Result<ActivationReport> {
        self.transition(&[ControllerState::Installed], ControllerState::Activating)?;
        log_info!("Activating cache generation {}", self.config.cache_name);
        let mut report = ActivationReport::default();
        let names = match self.storage.keys() {
            Ok(names) => names,
            Err(err) => {
                log_error!("Could not list cache generations: {}", err);
                Vec::new()
            }
        };
        for name in names {
            if name == self.config.cache_name {
                continue;
            }
            match self.storage.delete(&name) {
                Ok(_) => {
                    log_info!("Deleted stale cache generation {}", name);
                    report.deleted.push(name);
                }
                Err(err) => {
                    log_error!("Could not delete stale cache generation {}: {}", name, err);
                    report.failed.push(name);
                }
            }
        }
        if let Err(err) = self.clients.claim() {
            log_warn!("Could not claim clients: {}", err);
        }
        self.set_state(ControllerState::Active);
        log_info!("Cache generation {} is active", self.config.cache_name);
        Ok(report)
    }

    /// Pick up a generation that a previous process already installed. The
    /// controller becomes active when its cache store exists.
    pub fn resume(&self) -> Result<ControllerState> {
        if self.state() != ControllerState::Uninstalled {
            return Err(SWError::InvalidTransition(format!(
                "cannot resume a controller that is {}",
                self.state()
            ))
            .into());
        }
        if self.storage.has(&self.config.cache_name)? {
            self.set_state(ControllerState::Active);
            log_debug!("Resumed cache generation {}", self.config.cache_name);
        }
        Ok(self.state())
    }

    pub fn handle_fetch(&self, request: &Request) -> FetchEvent {
        if request.method != Method::GET {
            return FetchEvent::Passthrough;
        }
        if !request.is_http() {
            return FetchEvent::Passthrough;
        }
        if !self.state().can_intercept_fetch() {
            return FetchEvent::Passthrough;
        }
        FetchEvent::Respond(self.network_first(request))
    }

    fn network_first(&self, request: &Request) -> Response {
        match self.runner.fetch(request) {
            Ok(response) => {
                if response.status == 200 {
                    self.cache_put(&request.key(), &response);
                }
                response
            }
            Err(err) => {
                log_warn!("Network fetch for {} failed: {}", request.url(), err);
                self.cache_fallback(request)
            }
        }
    }

    fn cache_fallback(&self, request: &Request) -> Response {
        if let Some(response) = self.cache_match(&request.key()) {
            log_info!("Serving {} from cache", request.url());
            return response;
        }
        if request.is_navigation() {
            let offline_key = RequestKey::get(&self.url(&self.config.offline_url));
            if let Some(response) = self.cache_match(&offline_key) {
                log_info!("Serving offline page for {}", request.url());
                return response;
            }
            log_warn!("Offline page {} is not cached", offline_key.url);
        }
        Response::service_unavailable()
    }

    fn cache_match(&self, key: &RequestKey) -> Option<Response> {
        let lookup = || -> Result<Option<Response>> {
            if !self.storage.has(&self.config.cache_name)? {
                return Ok(None);
            }
            self.storage.open(&self.config.cache_name)?.get(key)
        };
        match lookup() {
            Ok(response) => response,
            Err(err) => {
                log_error!("Cache lookup for {} failed: {}", key, err);
                None
            }
        }
    }

    fn cache_put(&self, key: &RequestKey, response: &Response) {
        let store = || -> Result<()> {
            self.storage
                .open(&self.config.cache_name)?
                .put(key, response)
        };
        if let Err(err) = store() {
            log_error!("Could not cache {}: {}", key, err);
        }
    }

    /// Names of every cache generation in storage, current one included.
    pub fn generations(&self) -> Result<Vec<String>> {
        self.storage.keys()
    }

    /// Entries of the current generation.
    pub fn entries(&self) -> Result<Vec<RequestKey>> {
        if !self.storage.has(&self.config.cache_name)? {
            return Ok(Vec::new());
        }
        self.storage.open(&self.config.cache_name)?.keys()
    }

    pub fn build_notification(&self, payload: Option<&[u8]>) -> Notification {
        Notification::from_push(&self.config.notification_title, payload)
    }

    pub fn handle_push(&self, payload: Option<&[u8]>) -> Notification {
        log_info!("Push notification received");
        let notification = self.build_notification(payload);
        if let Err(err) = self.clients.show_notification(&notification) {
            log_error!("Could not show notification: {}", err);
        }
        notification
    }

    /// The notification is always closed. The explore action, or a click on
    /// the notification body, also opens the application root.
    pub fn handle_notification_click(
        &self,
        notification: &Notification,
        action: Option<&str>,
    ) -> NotificationClick {
        log_info!("Notification clicked, action: {:?}", action);
        if let Err(err) = self.clients.close_notification(notification) {
            log_warn!("Could not close notification: {}", err);
        }
        match action {
            None | Some("") | Some(api_defaults::NOTIFICATION_ACTION_EXPLORE) => {
                let root = self.url("/");
                if let Err(err) = self.clients.open_window(&root) {
                    log_error!("Could not open window at {}: {}", root, err);
                }
                NotificationClick::Opened(root)
            }
            Some(_) => NotificationClick::Closed,
        }
    }

    pub fn handle_sync(&self, tag: &str) -> SyncOutcome {
        if tag != api_defaults::BACKGROUND_SYNC_TAG {
            log_debug!("Ignoring sync event tagged {}", tag);
            return SyncOutcome::Ignored;
        }
        // Deferred retries hook in here; nothing is queued yet.
        log_info!("Background sync acknowledged");
        SyncOutcome::Acknowledged
    }
}

/// Pages route their traffic through the controller: intercepted requests
/// get the offline policy, everything else goes straight to the network.
impl<S: CacheStorage, R: HttpRunner, C: Clients> HttpRunner for CacheController<S, R, C> {
    fn fetch(&self, request: &Request) -> Result<Response> {
        match self.handle_fetch(request) {
            FetchEvent::Respond(response) => Ok(response),
            FetchEvent::Passthrough => self.runner.fetch(request),
        }
    }
}
