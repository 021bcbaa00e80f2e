use std::sync::Arc;

use crate::cache::CacheStorage;
use crate::clients::Clients;
use crate::controller::{ActivationReport, CacheController};
use crate::http::Request;
use crate::io::{HttpRunner, Response};
use crate::Result;
use crate::{log_error, log_info};

#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    /// The candidate took over and is now serving.
    Activated(ActivationReport),
    /// The candidate is installed but waits for the previous generation's
    /// clients to go away.
    Waiting,
}

/// Tracks which cache generation serves the pages and which one, if any, is
/// waiting to take over.
pub struct Registration<S, R, C> {
    runner: Arc<R>,
    active: Option<CacheController<S, R, C>>,
    waiting: Option<CacheController<S, R, C>>,
}

impl<S, R, C> Registration<S, R, C> {
    pub fn new(runner: Arc<R>) -> Self {
        Registration {
            runner,
            active: None,
            waiting: None,
        }
    }

    pub fn active(&self) -> Option<&CacheController<S, R, C>> {
        self.active.as_ref()
    }

    pub fn waiting(&self) -> Option<&CacheController<S, R, C>> {
        self.waiting.as_ref()
    }
}

impl<S: CacheStorage, R: HttpRunner, C: Clients> Registration<S, R, C> {
    /// Adopt a controller that is already active, e.g. one resumed over
    /// persisted storage.
    pub fn with_active(mut self, controller: CacheController<S, R, C>) -> Self {
        self.active = Some(controller);
        self
    }

    /// Install `candidate`. A failed install discards it and the current
    /// generation keeps serving. A successful one takes over right away when
    /// it skips waiting or nothing is active yet; otherwise it waits.
    pub fn update(&mut self, candidate: CacheController<S, R, C>) -> Result<UpdateOutcome> {
        if let Err(err) = candidate.install() {
            log_error!(
                "Discarding cache generation {}, {} keeps serving",
                candidate.cache_name(),
                self.active
                    .as_ref()
                    .map(|active| active.cache_name())
                    .unwrap_or("nothing")
            );
            return Err(err);
        }
        if candidate.skips_waiting() || self.active.is_none() {
            let report = self.promote(candidate)?;
            return Ok(UpdateOutcome::Activated(report));
        }
        log_info!(
            "Cache generation {} is waiting to activate",
            candidate.cache_name()
        );
        if let Some(previous) = self.waiting.replace(candidate) {
            previous.retire();
        }
        Ok(UpdateOutcome::Waiting)
    }

    /// Activate the waiting generation once the pages controlled by the
    /// current one are gone.
    pub fn activate_waiting(&mut self) -> Result<Option<ActivationReport>> {
        match self.waiting.take() {
            Some(candidate) => Ok(Some(self.promote(candidate)?)),
            None => Ok(None),
        }
    }

    fn promote(&mut self, candidate: CacheController<S, R, C>) -> Result<ActivationReport> {
        let report = candidate.activate()?;
        if let Some(previous) = self.active.replace(candidate) {
            previous.retire();
        }
        Ok(report)
    }
}

impl<S: CacheStorage, R: HttpRunner, C: Clients> HttpRunner for Registration<S, R, C> {
    fn fetch(&self, request: &Request) -> Result<Response> {
        match &self.active {
            Some(controller) => controller.fetch(request),
            None => self.runner.fetch(request),
        }
    }
}
