// Dashboard controller
//
// Owns the gateway client and publishes the view model through a watch
// channel. Timers (poll, message stream, animation frames) and user actions
// all end up as `ViewDelta`s applied to the same model.

use crate::api_service::ApiService;
use crate::config::DashboardConfig;
use crate::export::ExportDocument;
use crate::modal::{EntityModal, Submission};
use crate::view_model::{
    Charts, Connectivity, LogEntry, Notification, PendingDelete, Section, Snapshot, ViewDelta,
    ViewModel,
};
use crate::{ClientError, Result};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use streamgraph_core::{Ack, EntityKind};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const STREAM_TOPICS: [&str; 5] = [
    "user-events",
    "system-logs",
    "transactions",
    "analytics",
    "alerts",
];

const STREAM_MESSAGES: [&str; 5] = [
    "User session started",
    "Transaction completed",
    "System check passed",
    "New registration",
    "Cache updated",
];

/// Cosmetic log entry number `seq`. Walks every topic/message pairing in turn.
pub fn stream_entry(seq: usize, at: DateTime<Utc>) -> LogEntry {
    let n = STREAM_TOPICS.len();
    LogEntry {
        at,
        topic: STREAM_TOPICS[seq % n].to_string(),
        content: STREAM_MESSAGES[(seq + seq / n) % STREAM_MESSAGES.len()].to_string(),
    }
}

pub struct Dashboard {
    api: ApiService,
    config: DashboardConfig,
    state: watch::Sender<ViewModel>,
    stream_seq: AtomicUsize,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let (state, _) = watch::channel(ViewModel::with_log_capacity(config.log_capacity));
        Self {
            api: ApiService::new(&config),
            config,
            state,
            stream_seq: AtomicUsize::new(0),
        }
    }

    pub fn api(&self) -> &ApiService {
        &self.api
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.state.subscribe()
    }

    /// Current view model
    pub fn view(&self) -> ViewModel {
        self.state.borrow().clone()
    }

    fn apply(&self, delta: ViewDelta) {
        self.state.send_modify(|vm| {
            let prev = std::mem::take(vm);
            *vm = prev.apply(delta);
        });
    }

    fn ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.notification_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(3))
    }

    fn notify_success(&self, message: impl Into<String>) {
        let notification = Notification::success(message, Utc::now(), self.ttl());
        self.apply(ViewDelta::Notify(notification));
    }

    fn notify_error(&self, message: impl Into<String>) {
        let notification = Notification::error(message, Utc::now(), self.ttl());
        self.apply(ViewDelta::Notify(notification));
    }

    // =========================
    // Read-render cycle
    // =========================

    /// Probe `/health` and record connectivity. Never fails.
    pub async fn probe_health(&self) -> Connectivity {
        let connectivity = if self.api.check_health().await {
            Connectivity::Live
        } else {
            Connectivity::Offline
        };
        self.apply(ViewDelta::Connectivity(connectivity));
        connectivity
    }

    /// Fetch stats and the three lists together. On failure the previous
    /// data stays in place and an error notification is raised.
    pub async fn refresh(&self) -> Result<()> {
        let fetched = tokio::try_join!(
            self.api.stats(),
            self.api.topics(),
            self.api.producers(),
            self.api.consumers(),
        );

        let (stats, topics, producers, consumers) = match fetched {
            Ok(parts) => parts,
            Err(e) => {
                warn!(target: "dashboard", error = %e, "Failed to load dashboard data");
                self.notify_error(format!("Failed to load dashboard data: {}", e));
                return Err(e);
            }
        };

        debug!(
            target: "dashboard",
            topics = topics.len(),
            producers = producers.len(),
            consumers = consumers.len(),
            "Dashboard data loaded"
        );
        self.apply(ViewDelta::Snapshot {
            snapshot: Snapshot {
                stats,
                topics,
                producers,
                consumers,
            },
            at: Utc::now(),
        });

        if self.state.borrow().analytics_initialized {
            self.load_charts().await?;
        }
        Ok(())
    }

    pub async fn load_charts(&self) -> Result<()> {
        let fetched = tokio::try_join!(
            self.api.topic_distribution(),
            self.api.producer_activity(),
            self.api.entity_distribution(),
        );
        match fetched {
            Ok((topic_distribution, producer_activity, entity_distribution)) => {
                self.apply(ViewDelta::Charts(Charts {
                    topic_distribution,
                    producer_activity,
                    entity_distribution,
                }));
                Ok(())
            }
            Err(e) => {
                warn!(target: "dashboard", error = %e, "Failed to load charts");
                self.notify_error(format!("Failed to load charts: {}", e));
                Err(e)
            }
        }
    }

    /// Switch sections. Charts load the first time analytics is shown.
    pub async fn show_section(&self, section: Section) -> Result<()> {
        let first_analytics =
            section == Section::Analytics && !self.state.borrow().analytics_initialized;
        self.apply(ViewDelta::ShowSection(section));
        if first_analytics {
            info!(target: "dashboard", "Initializing analytics charts");
            self.load_charts().await?;
        }
        Ok(())
    }

    /// One animation tick. Skipped entirely when nothing would change.
    pub fn frame(&self) {
        let at = Utc::now();
        self.state.send_if_modified(|vm| {
            if !vm.needs_frame(at) {
                return false;
            }
            let prev = std::mem::take(vm);
            *vm = prev.apply(ViewDelta::Frame { at });
            true
        });
    }

    /// Append the next cosmetic message to the log.
    pub fn stream_tick(&self) {
        let seq = self.stream_seq.fetch_add(1, Ordering::Relaxed);
        self.apply(ViewDelta::Log(stream_entry(seq, Utc::now())));
    }

    // =========================
    // Edits
    // =========================

    /// Validate and send the modal, then refresh.
    pub async fn submit(&self, modal: &EntityModal) -> Result<Ack> {
        let submission = match modal.validate() {
            Ok(submission) => submission,
            Err(e) => {
                self.notify_error(e.to_string());
                return Err(e);
            }
        };

        let sent = match &submission {
            Submission::CreateTopic(req) => self.api.create_topic(req).await,
            Submission::UpdateTopic { name, body } => self.api.update_topic(name, body).await,
            Submission::CreateProducer(req) => self.api.create_producer(req).await,
            Submission::UpdateProducer { id, body } => self.api.update_producer(id, body).await,
            Submission::CreateConsumer(req) => self.api.create_consumer(req).await,
            Submission::UpdateConsumer { id, body } => self.api.update_consumer(id, body).await,
            Submission::Publish(req) => self.api.link_publisher(req).await,
            Submission::Subscribe(req) => self.api.link_subscriber(req).await,
        };

        match sent {
            Ok(ack) => {
                info!(target: "dashboard", message = %ack.message, "Submission accepted");
                self.notify_success(submission.success_message());
                self.refresh_quietly().await;
                Ok(ack)
            }
            Err(e) => {
                warn!(target: "dashboard", error = %e, "Submission failed");
                self.notify_error(format!("Operation failed: {}", e));
                Err(e)
            }
        }
    }

    /// Ask for confirmation before deleting.
    pub fn request_delete(&self, kind: EntityKind, key: impl Into<String>) {
        self.apply(ViewDelta::RequestDelete(PendingDelete {
            kind,
            key: key.into(),
        }));
    }

    pub fn cancel_delete(&self) {
        self.apply(ViewDelta::ClearDelete);
    }

    /// Delete the pending entity, then refresh.
    pub async fn confirm_delete(&self) -> Result<Ack> {
        let pending = self
            .state
            .borrow()
            .pending_delete
            .clone()
            .ok_or_else(|| ClientError::Validation("No delete awaiting confirmation".into()))?;
        self.apply(ViewDelta::ClearDelete);

        match self.api.delete(pending.kind, &pending.key).await {
            Ok(ack) => {
                info!(target: "dashboard", kind = %pending.kind, key = %pending.key, "Deleted");
                self.notify_success(format!("{} deleted successfully!", pending.kind));
                self.refresh_quietly().await;
                Ok(ack)
            }
            Err(e) => {
                warn!(target: "dashboard", error = %e, "Delete failed");
                self.notify_error(format!("Delete failed: {}", e));
                Err(e)
            }
        }
    }

    async fn refresh_quietly(&self) {
        // failures already surface as notifications
        if let Err(e) = self.refresh().await {
            debug!(target: "dashboard", error = %e, "Refresh after edit failed");
        }
    }

    // =========================
    // Export
    // =========================

    /// Fetch topics and producers together and write them into `dir`.
    pub async fn export(&self, dir: &Path) -> Result<PathBuf> {
        let (topics, producers) = tokio::try_join!(self.api.topics(), self.api.producers())?;
        let at = Utc::now();
        let path = ExportDocument::new(at, topics, producers)
            .write_to(dir, at)
            .await?;
        info!(target: "dashboard", path = %path.display(), "Export completed");
        self.notify_success("Export completed!");
        Ok(path)
    }

    // =========================
    // Loop
    // =========================

    async fn poll(&self) {
        self.probe_health().await;
        if let Err(e) = self.refresh().await {
            debug!(target: "dashboard", error = %e, "Poll refresh failed");
        }
    }

    /// Run timers until `shutdown` resolves. Every poll tick spawns its own
    /// refresh; slow refreshes may overlap and the last to arrive wins.
    pub async fn run<F>(self: Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            target: "dashboard",
            api = %self.api.base_url(),
            poll_secs = self.config.poll_interval.as_secs(),
            "Dashboard started"
        );
        self.poll().await;

        let mut poll = tokio::time::interval(self.config.poll_interval);
        let mut stream = tokio::time::interval(self.config.stream_interval);
        let mut frames = tokio::time::interval(self.config.frame_interval);
        for timer in [&mut poll, &mut stream, &mut frames] {
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }
        // first ticks complete immediately
        poll.tick().await;
        stream.tick().await;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = poll.tick() => {
                    let this = Arc::clone(&self);
                    tokio::spawn(async move { this.poll().await });
                }
                _ = stream.tick() => self.stream_tick(),
                _ = frames.tick() => self.frame(),
            }
        }
        info!(target: "dashboard", "Dashboard stopped");
    }
}
