use anyhow::{Context, Result};
use clap::Parser;

use assetkit_cli::init_tracing;
use assetkit_core::{find_field, Config};
use assetkit_services::StorageResolver;
use assetkit_storage::create_gateway;

#[derive(Parser, Debug)]
#[command(name = "resolve_asset")]
#[command(about = "Print the public URL a stored asset value resolves to")]
struct Args {
    /// Stored field value, e.g. leadership/john.jpg or v1700000000/leadership/john
    raw: String,

    /// Catalog field the value belongs to; selects folder and resource type
    #[arg(long, value_name = "ENTITY.FIELD")]
    field: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::from_env().context("Invalid configuration")?;
    let gateway = create_gateway(&config).context("Failed to create remote store gateway")?;
    let resolver = StorageResolver::from_config(gateway, &config);

    let url = match args.field.as_deref() {
        Some(key) => {
            let field = find_field(key).with_context(|| format!("Unknown field: {}", key))?;
            resolver.resolve_for_field(Some(args.raw.as_str()), field).await
        }
        None => {
            resolver
                .resolve_url(Some(args.raw.as_str()), "", resolver.media_url())
                .await
        }
    };

    println!("{}", url.as_deref().unwrap_or("null"));
    Ok(())
}
