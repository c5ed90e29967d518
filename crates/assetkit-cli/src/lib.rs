use assetkit_core::{find_field, AssetField, ConfigError, ASSET_FIELDS};
use assetkit_db::AssetRecordStore;
use assetkit_services::{MigrationJob, MigrationReport};
use serde::Serialize;
use std::fmt::Write;

/// Catalog entries selected by `--field` keys; all of them when none are given.
pub fn select_fields(keys: &[String]) -> Result<Vec<&'static AssetField>, ConfigError> {
    if keys.is_empty() {
        return Ok(ASSET_FIELDS.iter().collect());
    }

    keys.iter()
        .map(|key| {
            find_field(key).ok_or_else(|| {
                let known: Vec<String> = ASSET_FIELDS.iter().map(|f| f.key()).collect();
                ConfigError::invalid(
                    "--field",
                    format!("unknown field {} (expected one of: {})", key, known.join(", ")),
                )
            })
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub migrated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// A field whose records could not be listed; none of its records were touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: String,
    pub reason: String,
}

/// Everything a multi-field run produced, including fields that never started.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub reports: Vec<MigrationReport>,
    pub field_failures: Vec<FieldFailure>,
}

impl RunOutcome {
    pub fn has_field_failures(&self) -> bool {
        !self.field_failures.is_empty()
    }
}

/// Run the job over each field in turn. A field that cannot be listed is
/// recorded and the remaining fields still run.
pub async fn migrate_fields(
    job: &MigrationJob,
    store: &dyn AssetRecordStore,
    fields: &[&'static AssetField],
) -> RunOutcome {
    let mut outcome = RunOutcome::default();

    for field in fields {
        match job.run(store, field).await {
            Ok(report) => outcome.reports.push(report),
            Err(e) => {
                tracing::error!(field = %field.key(), error = %e, "Field migration aborted");
                outcome.field_failures.push(FieldFailure {
                    field: field.key(),
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome
}

/// JSON output of `migrate_assets`.
#[derive(Debug, Serialize)]
pub struct MigrationSummary<'a> {
    pub reports: &'a [MigrationReport],
    pub field_failures: &'a [FieldFailure],
    pub totals: Totals,
}

impl<'a> MigrationSummary<'a> {
    pub fn new(outcome: &'a RunOutcome) -> Self {
        let totals = outcome
            .reports
            .iter()
            .fold(Totals::default(), |acc, r| Totals {
                migrated: acc.migrated + r.migrated,
                skipped: acc.skipped + r.skipped,
                failed: acc.failed + r.failed,
            });
        Self {
            reports: &outcome.reports,
            field_failures: &outcome.field_failures,
            totals,
        }
    }
}

/// Human-readable summary: one row per field, a total, then every skip
/// reason, failure and field that could not be listed.
pub fn format_report_table(outcome: &RunOutcome) -> String {
    let summary = MigrationSummary::new(outcome);
    let reports = &outcome.reports;
    let mut out = String::new();

    let _ = writeln!(out, "\n=== Asset Migration ===\n");
    let _ = writeln!(
        out,
        "{:<28} {:>9} {:>9} {:>9}",
        "Field", "Migrated", "Skipped", "Failed"
    );
    for report in reports {
        let _ = writeln!(
            out,
            "{:<28} {:>9} {:>9} {:>9}",
            report.field, report.migrated, report.skipped, report.failed
        );
    }
    let _ = writeln!(
        out,
        "{:<28} {:>9} {:>9} {:>9}",
        "Total", summary.totals.migrated, summary.totals.skipped, summary.totals.failed
    );

    let skips: Vec<_> = reports
        .iter()
        .flat_map(|r| r.skips.iter().map(move |s| (r.field.as_str(), s.record_id, &s.reason)))
        .collect();
    if !skips.is_empty() {
        let _ = writeln!(out, "\n--- Skipped ---");
        for (field, record_id, reason) in skips {
            let _ = writeln!(out, "{} #{}: {}", field, record_id, reason);
        }
    }

    let failures: Vec<_> = reports
        .iter()
        .flat_map(|r| r.errors.iter().map(move |e| (r.field.as_str(), e.record_id, &e.reason)))
        .collect();
    if !failures.is_empty() {
        let _ = writeln!(out, "\n--- Failures ---");
        for (field, record_id, reason) in failures {
            let _ = writeln!(out, "{} #{}: {}", field, record_id, reason);
        }
    }

    if !outcome.field_failures.is_empty() {
        let _ = writeln!(out, "\n--- Fields not migrated ---");
        for failure in &outcome.field_failures {
            let _ = writeln!(out, "{}: {}", failure.field, failure.reason);
        }
    }

    out
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays
/// parseable with `--format json`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
