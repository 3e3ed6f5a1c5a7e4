//! Dashboard view model.
//!
//! Everything the dashboard shows lives in one `ViewModel` value. It only
//! changes through `ViewModel::apply`, a pure function of the previous value
//! and a `ViewDelta`, so the polling tasks, timers and user actions all
//! funnel through the same reducer.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use streamgraph_core::{
    ConsumerSummary, EntityCount, EntityKind, ProducerActivity, ProducerSummary, Stats,
    TopicCount, TopicSummary,
};

/// Frames a counter takes to reach its new value
pub const ANIMATION_FRAMES: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    Live,
    #[default]
    Offline,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Overview,
    Analytics,
}

/// One coordinated read of the gateway
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub stats: Stats,
    pub topics: Vec<TopicSummary>,
    pub producers: Vec<ProducerSummary>,
    pub consumers: Vec<ConsumerSummary>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Charts {
    pub topic_distribution: Vec<TopicCount>,
    pub producer_activity: Vec<ProducerActivity>,
    pub entity_distribution: Vec<EntityCount>,
}

/// Counter easing linearly from `from` to `to` over `ANIMATION_FRAMES`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterAnimation {
    from: u64,
    to: u64,
    frame: u32,
}

impl Default for CounterAnimation {
    fn default() -> Self {
        Self::settled(0)
    }
}

impl CounterAnimation {
    pub fn settled(value: u64) -> Self {
        Self {
            from: value,
            to: value,
            frame: ANIMATION_FRAMES,
        }
    }

    /// Restart from the currently displayed value towards `target`.
    pub fn retarget(self, target: u64) -> Self {
        Self {
            from: self.current(),
            to: target,
            frame: 0,
        }
    }

    pub fn advance(self) -> Self {
        Self {
            frame: (self.frame + 1).min(ANIMATION_FRAMES),
            ..self
        }
    }

    pub fn current(&self) -> u64 {
        let diff = self.to as i128 - self.from as i128;
        let step = (diff * self.frame as i128) as f64 / ANIMATION_FRAMES as f64;
        (self.from as i128 + step.round() as i128).max(0) as u64
    }

    pub fn target(&self) -> u64 {
        self.to
    }

    pub fn is_done(&self) -> bool {
        self.frame >= ANIMATION_FRAMES
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub topics: CounterAnimation,
    pub producers: CounterAnimation,
    pub consumers: CounterAnimation,
    pub relations: CounterAnimation,
}

impl Counters {
    fn retarget(self, stats: &Stats) -> Self {
        Self {
            topics: self.topics.retarget(stats.topics),
            producers: self.producers.retarget(stats.producers),
            consumers: self.consumers.retarget(stats.consumers),
            relations: self.relations.retarget(stats.relations),
        }
    }

    fn advance(self) -> Self {
        Self {
            topics: self.topics.advance(),
            producers: self.producers.advance(),
            consumers: self.consumers.advance(),
            relations: self.relations.advance(),
        }
    }

    pub fn is_animating(&self) -> bool {
        !(self.topics.is_done()
            && self.producers.is_done()
            && self.consumers.is_done()
            && self.relations.is_done())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub topic: String,
    pub content: String,
}

/// Newest-first message log with a fixed capacity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageLog {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(15)
    }
}

impl MessageLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(mut self, entry: LogEntry) -> Self {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>, at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            expires_at: at + ttl,
        }
    }

    pub fn error(message: impl Into<String>, at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            expires_at: at + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Delete waiting for confirmation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDelete {
    pub kind: EntityKind,
    pub key: String,
}

impl PendingDelete {
    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete {} \"{}\"?",
            self.kind.label().to_lowercase(),
            self.key
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewDelta {
    Connectivity(Connectivity),
    /// Fresh read; counters start animating towards the new stats
    Snapshot {
        snapshot: Snapshot,
        at: DateTime<Utc>,
    },
    Charts(Charts),
    ShowSection(Section),
    /// Animation tick; also drops expired notifications
    Frame {
        at: DateTime<Utc>,
    },
    Log(LogEntry),
    Notify(Notification),
    RequestDelete(PendingDelete),
    ClearDelete,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub connectivity: Connectivity,
    pub section: Section,
    /// Set the first time the analytics section is shown
    pub analytics_initialized: bool,
    pub snapshot: Snapshot,
    pub charts: Charts,
    pub counters: Counters,
    pub log: MessageLog,
    pub notifications: Vec<Notification>,
    pub pending_delete: Option<PendingDelete>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ViewModel {
    pub fn with_log_capacity(capacity: usize) -> Self {
        Self {
            log: MessageLog::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn apply(mut self, delta: ViewDelta) -> Self {
        match delta {
            ViewDelta::Connectivity(connectivity) => {
                self.connectivity = connectivity;
            }
            ViewDelta::Snapshot { snapshot, at } => {
                self.counters = self.counters.retarget(&snapshot.stats);
                self.snapshot = snapshot;
                self.last_updated = Some(at);
            }
            ViewDelta::Charts(charts) => {
                self.charts = charts;
            }
            ViewDelta::ShowSection(section) => {
                if section == Section::Analytics {
                    self.analytics_initialized = true;
                }
                self.section = section;
            }
            ViewDelta::Frame { at } => {
                self.counters = self.counters.advance();
                self.notifications.retain(|n| !n.is_expired(at));
            }
            ViewDelta::Log(entry) => {
                self.log = self.log.push(entry);
            }
            ViewDelta::Notify(notification) => {
                self.notifications.push(notification);
            }
            ViewDelta::RequestDelete(pending) => {
                self.pending_delete = Some(pending);
            }
            ViewDelta::ClearDelete => {
                self.pending_delete = None;
            }
        }
        self
    }

    /// Whether a `Frame` at `now` would change anything
    pub fn needs_frame(&self, now: DateTime<Utc>) -> bool {
        self.counters.is_animating() || self.notifications.iter().any(|n| n.is_expired(now))
    }
}

/// Render an integer with thousands separators (`12345` -> `12,345`).
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(topics: u64) -> Stats {
        Stats::from_counts(topics, 0, 0, 0)
    }

    fn snapshot(topics: u64) -> ViewDelta {
        ViewDelta::Snapshot {
            snapshot: Snapshot {
                stats: stats(topics),
                ..Snapshot::default()
            },
            at: Utc::now(),
        }
    }

    #[test]
    fn counter_reaches_target_after_twenty_frames() {
        let mut counter = CounterAnimation::settled(0).retarget(100);
        assert_eq!(counter.current(), 0);
        for _ in 0..10 {
            counter = counter.advance();
        }
        assert_eq!(counter.current(), 50);
        for _ in 0..10 {
            counter = counter.advance();
        }
        assert_eq!(counter.current(), 100);
        assert!(counter.is_done());
        assert_eq!(counter.advance().current(), 100);
    }

    #[test]
    fn counter_animates_downwards() {
        let mut counter = CounterAnimation::settled(40).retarget(0);
        counter = counter.advance();
        assert_eq!(counter.current(), 38);
        for _ in 0..19 {
            counter = counter.advance();
        }
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn retarget_starts_from_displayed_value() {
        let mut counter = CounterAnimation::settled(0).retarget(20);
        for _ in 0..5 {
            counter = counter.advance();
        }
        let counter = counter.retarget(100);
        assert_eq!(counter.current(), 5);
        assert_eq!(counter.target(), 100);
    }

    #[test]
    fn snapshot_replaces_data_and_restarts_counters() {
        let vm = ViewModel::default().apply(snapshot(7));
        assert_eq!(vm.snapshot.stats.topics, 7);
        assert!(vm.counters.is_animating());
        assert!(vm.last_updated.is_some());

        let vm = (0..ANIMATION_FRAMES).fold(vm, |vm, _| vm.apply(ViewDelta::Frame { at: Utc::now() }));
        assert_eq!(vm.counters.topics.current(), 7);
        assert!(!vm.counters.is_animating());
    }

    #[test]
    fn analytics_is_initialized_once() {
        let vm = ViewModel::default();
        assert_eq!(vm.section, Section::Overview);
        assert!(!vm.analytics_initialized);

        let vm = vm.apply(ViewDelta::ShowSection(Section::Analytics));
        assert!(vm.analytics_initialized);
        let vm = vm.apply(ViewDelta::ShowSection(Section::Overview));
        assert_eq!(vm.section, Section::Overview);
        assert!(vm.analytics_initialized);
    }

    #[test]
    fn log_keeps_newest_fifteen() {
        let vm = (0..20).fold(ViewModel::default(), |vm, i| {
            vm.apply(ViewDelta::Log(LogEntry {
                at: Utc::now(),
                topic: "alerts".into(),
                content: format!("message {}", i),
            }))
        });
        assert_eq!(vm.log.len(), 15);
        let newest = vm.log.entries().next().unwrap();
        assert_eq!(newest.content, "message 19");
        let oldest = vm.log.entries().last().unwrap();
        assert_eq!(oldest.content, "message 5");
    }

    #[test]
    fn notifications_expire_on_frame() {
        let now = Utc::now();
        let vm = ViewModel::default().apply(ViewDelta::Notify(Notification::error(
            "Failed to load dashboard data",
            now,
            Duration::seconds(3),
        )));
        assert!(!vm.needs_frame(now + Duration::seconds(1)));

        let vm = vm.apply(ViewDelta::Frame {
            at: now + Duration::seconds(1),
        });
        assert_eq!(vm.notifications.len(), 1);

        let later = now + Duration::seconds(3);
        assert!(vm.needs_frame(later));
        let vm = vm.apply(ViewDelta::Frame { at: later });
        assert!(vm.notifications.is_empty());
    }

    #[test]
    fn pending_delete_round_trip() {
        let pending = PendingDelete {
            kind: EntityKind::Topic,
            key: "orders".into(),
        };
        assert_eq!(pending.prompt(), "Are you sure you want to delete topic \"orders\"?");

        let vm = ViewModel::default().apply(ViewDelta::RequestDelete(pending.clone()));
        assert_eq!(vm.pending_delete, Some(pending));
        let vm = vm.apply(ViewDelta::ClearDelete);
        assert!(vm.pending_delete.is_none());
    }

    #[test]
    fn numbers_get_thousands_separators() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(12345), "12,345");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
