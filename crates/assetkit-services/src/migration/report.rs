use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordError {
    pub record_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSkip {
    pub record_id: i64,
    pub reason: String,
}

/// Outcome of one migration run over one field.
///
/// Every listed record lands in exactly one of `migrated`, `skipped` or
/// `failed`. `skips` only holds skips worth reporting; unset and already
/// migrated values are counted without an entry.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub field: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub migrated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<RecordError>,
    pub skips: Vec<RecordSkip>,
}

impl MigrationReport {
    pub fn new(field: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            field: field.into(),
            started_at: now,
            finished_at: now,
            migrated: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            skips: Vec::new(),
        }
    }

    pub fn record_migrated(&mut self) {
        self.migrated += 1;
    }

    pub fn record_skipped(&mut self, record_id: i64, reason: Option<&str>) {
        self.skipped += 1;
        if let Some(reason) = reason {
            self.skips.push(RecordSkip {
                record_id,
                reason: reason.to_string(),
            });
        }
    }

    pub fn record_failed(&mut self, record_id: i64, reason: impl Into<String>) {
        self.failed += 1;
        self.errors.push(RecordError {
            record_id,
            reason: reason.into(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn total(&self) -> usize {
        self.migrated + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
