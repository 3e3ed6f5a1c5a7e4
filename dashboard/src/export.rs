// Snapshot export
//
// Writes topics and producers to `streaming-export-<unix-millis>.json`.

use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use streamgraph_core::{ProducerSummary, TopicSummary};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: String,
    pub topics: Vec<TopicSummary>,
    pub producers: Vec<ProducerSummary>,
}

impl ExportDocument {
    pub fn new(
        at: DateTime<Utc>,
        topics: Vec<TopicSummary>,
        producers: Vec<ProducerSummary>,
    ) -> Self {
        Self {
            exported_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            topics,
            producers,
        }
    }

    pub fn file_name(at: DateTime<Utc>) -> String {
        format!("streaming-export-{}.json", at.timestamp_millis())
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document into `dir`, returning the full path.
    pub async fn write_to(&self, dir: &Path, at: DateTime<Utc>) -> Result<PathBuf> {
        let path = dir.join(Self::file_name(at));
        tokio::fs::write(&path, self.to_pretty_json()?).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_uses_unix_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            ExportDocument::file_name(at),
            "streaming-export-1700000000123.json"
        );
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let doc = ExportDocument::new(
            at,
            vec![TopicSummary {
                name: "orders".into(),
                message_count: 3,
                producer_count: 1,
                status: "active".into(),
            }],
            vec![],
        );
        let value: serde_json::Value = serde_json::from_str(&doc.to_pretty_json().unwrap()).unwrap();
        assert_eq!(value["exportedAt"], "2023-11-14T22:13:20.123Z");
        assert_eq!(value["topics"][0]["messageCount"], 3);
        assert!(value["producers"].as_array().unwrap().is_empty());
    }
}
