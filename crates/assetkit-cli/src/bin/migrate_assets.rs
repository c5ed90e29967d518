use anyhow::{Context, Result};
use clap::Parser;

use assetkit_cli::{
    format_report_table, init_tracing, migrate_fields, select_fields, MigrationSummary,
};
use assetkit_core::Config;
use assetkit_db::{connect, PgAssetRecordRepository};
use assetkit_services::{MigrationJob, MigrationOptions};
use assetkit_storage::{create_gateway, create_media_source};

#[derive(Parser, Debug)]
#[command(name = "migrate_assets")]
#[command(about = "Upload legacy local media to the remote asset store and rewrite identifiers")]
struct Args {
    /// Restrict the run to these fields (repeatable), e.g. gallery.video
    #[arg(long = "field", value_name = "ENTITY.FIELD")]
    fields: Vec<String>,

    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,

    /// Upload attempts per record (overrides MIGRATION_MAX_UPLOAD_ATTEMPTS)
    #[arg(long, value_name = "N")]
    max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::from_env().context("Invalid configuration")?;
    let fields = select_fields(&args.fields)?;

    let mut options = MigrationOptions::from(&config.migration);
    if let Some(max_attempts) = args.max_attempts {
        anyhow::ensure!(max_attempts > 0, "--max-attempts must be greater than zero");
        options.max_upload_attempts = max_attempts;
    }

    let gateway = create_gateway(&config).context("Failed to create remote store gateway")?;
    let source = create_media_source(&config)
        .await
        .context("Failed to open legacy media directory")?;
    let pool = connect(&config)
        .await
        .context("Failed to connect to database")?;
    let store = PgAssetRecordRepository::new(pool);

    tracing::info!(
        fields = fields.len(),
        max_upload_attempts = options.max_upload_attempts,
        "Starting asset migration run"
    );
    let job = MigrationJob::new(gateway, source).with_options(options);

    let outcome = migrate_fields(&job, &store, &fields).await;

    match args.format.as_str() {
        "json" => {
            println!(
                "{}",
                serde_json::to_string_pretty(&MigrationSummary::new(&outcome))?
            );
        }
        _ => {
            print!("{}", format_report_table(&outcome));
        }
    }

    if outcome.has_field_failures() {
        let failed: Vec<&str> = outcome
            .field_failures
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        anyhow::bail!("Could not list records for: {}", failed.join(", "));
    }

    Ok(())
}
