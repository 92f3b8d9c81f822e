use serde::Serialize;

use crate::skip::Skip;

/// Summary of one batch run: keys completed, keys skipped per reason, and
/// hard failures. The batch always runs to completion over the full key
/// space; this is how the operator finds out what it stepped over.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunReport {
    pub completed: usize,
    pub missing_input: usize,
    pub missing_crs: usize,
    pub reprojection_failed: usize,
    pub overlay_failed: usize,
    pub schema_mismatch: usize,
    /// Labels of keys that hit a hard error (unreadable file, write failure,
    /// unknown state name).
    pub failed: Vec<String>,
}

impl RunReport {
    pub fn record_completed(&mut self) {
        self.completed += 1;
    }

    pub fn record_skip(&mut self, skip: &Skip) {
        match skip {
            Skip::MissingInput { .. } => self.missing_input += 1,
            Skip::MissingCrs { .. } => self.missing_crs += 1,
            Skip::Reprojection { .. } => self.reprojection_failed += 1,
            Skip::Overlay { .. } => self.overlay_failed += 1,
            Skip::SchemaMismatch { .. } => self.schema_mismatch += 1,
        }
    }

    pub fn record_failure(&mut self, key: String) {
        self.failed.push(key);
    }

    pub fn skipped(&self) -> usize {
        self.missing_input
            + self.missing_crs
            + self.reprojection_failed
            + self.overlay_failed
            + self.schema_mismatch
    }

    pub fn total(&self) -> usize {
        self.completed + self.skipped() + self.failed.len()
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
