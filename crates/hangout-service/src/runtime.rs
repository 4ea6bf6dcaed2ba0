//! Task-per-event registry.
//!
//! At most one coordinator runs per event: in-process through the task map, across
//! processes through the store lease taken before spawning. Events whose lease is held
//! elsewhere can be retried once the lease had time to lapse, which is how a restarted node
//! takes over from one that died without releasing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use hangout_core::model::EventId;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing_futures::Instrument;

use crate::coordinator::{CoordinatorContext, EventCoordinator, lease_expiry};
use crate::error::ServiceResult;
use crate::recovery::is_resumable;

/// Result of asking the runtime to manage an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// This process already runs a coordinator for the event.
    AlreadyRunning,
    /// Another process holds an unexpired lease.
    ClaimedElsewhere,
    ShuttingDown,
}

pub struct CoordinatorRuntime {
    ctx: Arc<CoordinatorContext>,
    tasks: Mutex<HashMap<EventId, JoinHandle<()>>>,
    /// Pending lease retries, at most one per event.
    retries: Mutex<HashMap<EventId, JoinHandle<()>>>,
    shutdown: watch::Sender<bool>,
}

impl CoordinatorRuntime {
    #[must_use]
    pub fn new(ctx: CoordinatorContext) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            ctx: Arc::new(ctx),
            tasks: Mutex::new(HashMap::new()),
            retries: Mutex::new(HashMap::new()),
            shutdown,
        })
    }

    #[must_use]
    pub fn context(&self) -> &CoordinatorContext {
        &self.ctx
    }

    /// ## Summary
    /// Claims the event and spawns its coordinator, unless one is already running here or
    /// another holder has it.
    ///
    /// ## Errors
    /// Returns an error if the lease cannot be written.
    #[tracing::instrument(skip(self), fields(event_id = %event_id))]
    pub async fn start(&self, event_id: EventId) -> ServiceResult<StartOutcome> {
        let mut tasks = self.tasks.lock().await;
        if *self.shutdown.borrow() {
            return Ok(StartOutcome::ShuttingDown);
        }

        tasks.retain(|_, handle| !handle.is_finished());
        if tasks.contains_key(&event_id) {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let now = Utc::now();
        let claimed = self
            .ctx
            .store
            .try_claim(
                &event_id,
                &self.ctx.holder_id,
                now,
                lease_expiry(now, self.ctx.claim_ttl),
            )
            .await?;
        if !claimed {
            tracing::info!("Event is claimed by another holder");
            return Ok(StartOutcome::ClaimedElsewhere);
        }

        let coordinator =
            EventCoordinator::new(self.ctx.clone(), event_id.clone(), self.shutdown.subscribe());
        let ctx = self.ctx.clone();
        let task_event_id = event_id.clone();
        let span = tracing::info_span!("coordinator", event_id = %event_id);

        let handle = tokio::spawn(
            async move {
                tracing::info!("Coordinator started");
                match coordinator.run().await {
                    Ok(outcome) => tracing::info!(?outcome, "Coordinator finished"),
                    Err(error) => tracing::error!(%error, "Coordinator aborted"),
                }
                if let Err(error) = ctx.store.release_claim(&task_event_id, &ctx.holder_id).await {
                    tracing::warn!(%error, "Failed to release lease");
                }
            }
            .instrument(span),
        );

        tasks.insert(event_id, handle);
        Ok(StartOutcome::Started)
    }

    /// ## Summary
    /// Schedules another claim attempt for an event held by a different holder. The attempt
    /// repeats every claim TTL until this process owns the event, the event no longer needs a
    /// coordinator, or the runtime shuts down.
    ///
    /// Returns `false` if a retry for the event is already pending or the runtime is
    /// shutting down.
    #[tracing::instrument(skip(self), fields(event_id = %event_id))]
    pub async fn retry_when_lease_lapses(self: &Arc<Self>, event_id: EventId) -> bool {
        let mut retries = self.retries.lock().await;
        if *self.shutdown.borrow() {
            return false;
        }
        retries.retain(|_, handle| !handle.is_finished());
        if retries.contains_key(&event_id) {
            return false;
        }

        let span = tracing::info_span!("lease_retry", event_id = %event_id);
        let handle = tokio::spawn(self.clone().retry_loop(event_id.clone()).instrument(span));
        retries.insert(event_id, handle);
        true
    }

    async fn retry_loop(self: Arc<Self>, event_id: EventId) {
        let mut shutdown = self.shutdown.subscribe();
        loop {
            if *shutdown.borrow_and_update() {
                return;
            }
            tokio::select! {
                () = tokio::time::sleep(self.ctx.claim_ttl) => {}
                _ = shutdown.changed() => return,
            }

            match self.ctx.store.get_event(&event_id).await {
                Ok(event) if !is_resumable(&event, Utc::now()) => {
                    tracing::debug!("Event no longer needs a coordinator; dropping retry");
                    return;
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(%error, "Failed to reload event for lease retry");
                    continue;
                }
            }

            match self.start(event_id.clone()).await {
                Ok(StartOutcome::ClaimedElsewhere) => {
                    tracing::debug!("Lease still held elsewhere");
                }
                Ok(outcome) => {
                    tracing::info!(?outcome, "Lease retry finished");
                    return;
                }
                Err(error) => tracing::warn!(%error, "Lease retry failed"),
            }
        }
    }

    /// Number of coordinators still running.
    pub async fn active_count(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.len()
    }

    #[cfg(test)]
    pub async fn is_running(&self, event_id: &EventId) -> bool {
        self.tasks
            .lock()
            .await
            .get(event_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Waits for the coordinator of `event_id` to end. Returns `false` if none was tracked.
    #[cfg(test)]
    pub async fn wait_for(&self, event_id: &EventId) -> bool {
        let handle = self.tasks.lock().await.remove(event_id);
        match handle {
            Some(handle) => {
                if let Err(error) = handle.await {
                    tracing::error!(%event_id, %error, "Coordinator task panicked");
                }
                true
            }
            None => false,
        }
    }

    /// Number of events waiting on a lease retry.
    pub async fn pending_retries(&self) -> usize {
        let mut retries = self.retries.lock().await;
        retries.retain(|_, handle| !handle.is_finished());
        retries.len()
    }

    /// ## Summary
    /// Signals every coordinator to stop at its next wait and waits for all of them. Pending
    /// lease retries are dropped.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);
        let retries: Vec<JoinHandle<()>> =
            self.retries.lock().await.drain().map(|(_, handle)| handle).collect();
        for handle in retries {
            if let Err(error) = handle.await {
                tracing::error!(%error, "Lease retry task panicked");
            }
        }
        let handles: Vec<(EventId, JoinHandle<()>)> =
            self.tasks.lock().await.drain().collect();
        tracing::info!(coordinators = handles.len(), "Stopping coordinators");
        for (event_id, handle) in handles {
            if let Err(error) = handle.await {
                tracing::error!(%event_id, %error, "Coordinator task panicked");
            }
        }
    }
}
