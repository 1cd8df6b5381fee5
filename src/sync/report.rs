use serde::{Deserialize, Serialize};

/// Result of one reconciliation run, as returned by `POST /api/sync`.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub pulled: usize,
    #[serde(default)]
    pub pushed: usize,
    #[serde(default)]
    pub updated: usize,
    #[serde(default)]
    pub completed: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SyncReport {
    /// Some items failed but the run itself went through.
    ///
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }

    /// One-line summary of the counts, e.g. `2 pulled, 1 pushed`.
    ///
    pub fn summary(&self) -> String {
        let parts: Vec<String> = [
            (self.pulled, "pulled"),
            (self.pushed, "pushed"),
            (self.updated, "updated"),
            (self.completed, "completed"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();
        if parts.is_empty() {
            "everything is up to date".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Answer of the sync status query.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub configured: bool,
    #[serde(default)]
    pub last_sync: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_lists_non_zero_counts() {
        let report = SyncReport {
            pulled: 2,
            pushed: 1,
            completed: 1,
            ..SyncReport::default()
        };
        assert_eq!(report.summary(), "2 pulled, 1 pushed, 1 completed");
        assert_eq!(SyncReport::default().summary(), "everything is up to date");
    }

    #[test]
    fn deserializes_server_payload() {
        let report: SyncReport = serde_json::from_value(json!({
            "success": false,
            "pulled": 2, "pushed": 1, "updated": 0, "completed": 1,
            "errors": ["task X not found remotely"]
        }))
        .unwrap();
        assert!(report.is_partial());
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn status_tolerates_missing_last_sync() {
        let status: SyncStatus = serde_json::from_value(json!({"configured": true})).unwrap();
        assert!(status.configured);
        assert_eq!(status.last_sync, None);
    }
}
