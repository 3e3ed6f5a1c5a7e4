//! Dashboard Client Tests
//!
//! Runs the dashboard against a real gateway bound to an ephemeral port with
//! the in-memory backend:
//! - refresh / health probe / chart initialization
//! - modal submissions and confirmed deletes
//! - failure handling keeps previous data
//! - export document

use std::sync::Arc;
use std::time::Duration;
use streamgraph_core::{EntityKind, GraphService, InMemoryStore};
use streamgraph_dashboard::{
    ClientError, Connectivity, Dashboard, DashboardConfig, EntityModal, ExportDocument,
    ModalForm, ModalMode, NotificationLevel, Section,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

type ServeResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

struct TestGateway {
    base_url: String,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<ServeResult>>,
}

impl TestGateway {
    /// Stop serving and wait until the listener is closed
    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn start_gateway() -> TestGateway {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = GraphService::new(Arc::new(InMemoryStore::new()));
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(streamgraph_gateway::serve_on(listener, service, async {
        let _ = stopped.await;
    }));
    TestGateway {
        base_url: format!("http://{}/api", addr),
        stop: Some(stop),
        task: Some(task),
    }
}

fn dashboard_for(base_url: &str) -> Dashboard {
    let config = DashboardConfig {
        request_timeout: Duration::from_secs(5),
        ..DashboardConfig::default()
    }
    .with_base_url(base_url);
    Dashboard::new(config)
}

fn topic_modal(name: &str, count: &str) -> EntityModal {
    EntityModal {
        mode: ModalMode::Create,
        form: ModalForm::Topic {
            name: name.into(),
            message_count: count.into(),
        },
    }
}

// =============================================================================
// Read-render cycle
// =============================================================================

#[tokio::test]
async fn probe_and_refresh_against_live_gateway() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);

    assert_eq!(dashboard.probe_health().await, Connectivity::Live);
    dashboard.submit(&topic_modal("orders", "1200")).await.unwrap();

    let vm = dashboard.view();
    assert_eq!(vm.connectivity, Connectivity::Live);
    assert_eq!(vm.snapshot.stats.topics, 1);
    assert_eq!(vm.snapshot.topics[0].name, "orders");
    assert_eq!(vm.snapshot.topics[0].message_count, 1200);
    assert_eq!(vm.counters.topics.target(), 1);
    assert!(vm.last_updated.is_some());
    assert!(vm
        .notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Success && n.message == "Topic created successfully!"));
}

#[tokio::test]
async fn lost_gateway_goes_offline_and_keeps_data() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);
    dashboard.submit(&topic_modal("orders", "3")).await.unwrap();
    let before = dashboard.view().snapshot;
    assert_eq!(before.topics.len(), 1);

    gateway.shutdown().await;

    assert_eq!(dashboard.probe_health().await, Connectivity::Offline);
    assert!(dashboard.refresh().await.is_err());
    let vm = dashboard.view();
    assert_eq!(vm.connectivity, Connectivity::Offline);
    assert_eq!(vm.snapshot, before);
    assert!(vm
        .notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Error
            && n.message.starts_with("Failed to load dashboard data")));
}

#[tokio::test]
async fn analytics_charts_load_on_first_show() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);
    dashboard.submit(&topic_modal("A", "50")).await.unwrap();
    dashboard.submit(&topic_modal("B", "10")).await.unwrap();
    assert!(dashboard.view().charts.topic_distribution.is_empty());

    dashboard.show_section(Section::Analytics).await.unwrap();
    let vm = dashboard.view();
    assert!(vm.analytics_initialized);
    let names: Vec<_> = vm
        .charts
        .topic_distribution
        .iter()
        .map(|t| (t.name.as_str(), t.count))
        .collect();
    assert_eq!(names, vec![("A", 50), ("B", 10)]);
    assert_eq!(vm.charts.entity_distribution[0].name, "Topics");
    assert_eq!(vm.charts.entity_distribution[0].count, 2);
}

// =============================================================================
// Edits
// =============================================================================

#[tokio::test]
async fn client_validation_never_reaches_gateway() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);

    let err = dashboard.submit(&topic_modal("   ", "0")).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(ref msg) if msg == "Topic name is required"));

    let stats = dashboard.api().stats().await.unwrap();
    assert_eq!(stats.topics, 0);
}

#[tokio::test]
async fn edit_modal_renames_topic() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);
    dashboard.submit(&topic_modal("user events", "7")).await.unwrap();

    let mut modal = EntityModal::edit(EntityKind::Topic, "user events");
    modal.form = ModalForm::Topic {
        name: "user-events".into(),
        message_count: "9".into(),
    };
    dashboard.submit(&modal).await.unwrap();

    let topics = dashboard.view().snapshot.topics;
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name, "user-events");
    assert_eq!(topics[0].message_count, 9);
}

#[tokio::test]
async fn renaming_topic_from_listing_keeps_message_count() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);
    dashboard.submit(&topic_modal("orders", "50")).await.unwrap();

    let listed = dashboard.view().snapshot.topics[0].clone();
    let mut modal = EntityModal::edit_topic(&listed);
    if let ModalForm::Topic { name, .. } = &mut modal.form {
        *name = "orders-v2".into();
    }
    dashboard.submit(&modal).await.unwrap();

    // blank count on a bare edit leaves the stored value alone
    let mut modal = EntityModal::edit(EntityKind::Topic, "orders-v2");
    if let ModalForm::Topic { name, .. } = &mut modal.form {
        *name = "orders-v3".into();
    }
    dashboard.submit(&modal).await.unwrap();

    let topics = dashboard.view().snapshot.topics;
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name, "orders-v3");
    assert_eq!(topics[0].message_count, 50);
}

#[tokio::test]
async fn gateway_errors_surface_with_message() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);

    let modal = EntityModal::edit(EntityKind::Producer, "ghost");
    let err = dashboard.submit(&modal).await.unwrap_err();
    match err {
        ClientError::Gateway { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Producer not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(dashboard
        .view()
        .notifications
        .iter()
        .any(|n| n.message == "Operation failed: Producer not found"));
}

#[tokio::test]
async fn relationships_and_confirmed_delete() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);
    dashboard.submit(&topic_modal("orders", "0")).await.unwrap();
    dashboard
        .submit(&EntityModal {
            mode: ModalMode::Create,
            form: ModalForm::Producer { id: "p1".into() },
        })
        .await
        .unwrap();
    dashboard
        .submit(&EntityModal {
            mode: ModalMode::Create,
            form: ModalForm::Publish {
                producer_id: "p1".into(),
                topic_name: "orders".into(),
                message_count: "25".into(),
            },
        })
        .await
        .unwrap();

    let vm = dashboard.view();
    assert_eq!(vm.snapshot.stats.relations, 1);
    assert_eq!(vm.snapshot.producers[0].message_count, 25);

    dashboard.request_delete(EntityKind::Topic, "orders");
    dashboard.cancel_delete();
    assert!(dashboard.view().pending_delete.is_none());
    assert_eq!(dashboard.api().stats().await.unwrap().topics, 1);

    dashboard.request_delete(EntityKind::Topic, "orders");
    dashboard.confirm_delete().await.unwrap();
    let vm = dashboard.view();
    assert!(vm.pending_delete.is_none());
    assert_eq!(vm.snapshot.stats.topics, 0);
    assert_eq!(vm.snapshot.stats.relations, 0);
    assert_eq!(vm.snapshot.producers[0].topic_count, 0);
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn export_writes_topics_and_producers() {
    let gateway = start_gateway().await;
    let dashboard = dashboard_for(&gateway.base_url);
    dashboard.submit(&topic_modal("orders", "5")).await.unwrap();

    let dir = std::env::temp_dir().join(format!("streamgraph-export-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dashboard.export(&dir).await.unwrap();

    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("streaming-export-"));
    assert!(file_name.ends_with(".json"));

    let text = tokio::fs::read_to_string(&path).await.unwrap();
    let doc: ExportDocument = serde_json::from_str(&text).unwrap();
    assert_eq!(doc.topics.len(), 1);
    assert!(doc.producers.is_empty());
    assert!(doc.exported_at.ends_with('Z'));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
