// Streamgraph Dashboard
//
// Headless dashboard client: keeps a view model in sync with the gateway by
// polling, renders it as text and submits CRUD edits.

mod api_service;
pub mod config;
mod controller;
pub mod export;
pub mod modal;
pub mod render;
pub mod view_model;

pub use api_service::ApiService;
pub use config::DashboardConfig;
pub use controller::Dashboard;
pub use export::ExportDocument;
pub use modal::{EntityModal, ModalForm, ModalMode, Submission};
pub use view_model::{
    format_number, Charts, Connectivity, CounterAnimation, Counters, LogEntry, MessageLog,
    Notification, NotificationLevel, PendingDelete, Section, Snapshot, ViewDelta, ViewModel,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Gateway { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
