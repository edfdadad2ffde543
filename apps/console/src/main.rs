use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use shared::domain::{EntityKind, RecordId};
use sync_core::{HttpGateway, SyncClient, TracingSink};

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the configured server URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Collection to operate on (users, grades, units, links, labour-logs,
    /// attachments, settings).
    #[arg(long)]
    entity: EntityKind,
    #[command(subcommand)]
    command: ConsoleCommand,
}

#[derive(Subcommand, Debug)]
enum ConsoleCommand {
    /// Fetch the collection, optionally filtered by a JSON object.
    List {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Create a record from a JSON object.
    Create { input: String },
    /// Apply a JSON patch to one record.
    Update { id: i64, patch: String },
    /// Change only the status field of one record.
    SetStatus { id: i64, status: String },
    /// Delete one record.
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = load_settings();
    let server_url = args.server_url.unwrap_or(settings.server_url);

    let gateway = HttpGateway::new(
        &server_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    let client = SyncClient::new(Arc::new(gateway), Arc::new(TracingSink));
    let mut notices = client.subscribe_notices();

    let outcome = match args.command {
        ConsoleCommand::List { filter } => {
            let filter = filter
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()?;
            client.list(args.entity, filter).await
        }
        ConsoleCommand::Create { input } => {
            client.create(args.entity, serde_json::from_str(&input)?).await
        }
        ConsoleCommand::Update { id, patch } => {
            client
                .update(args.entity, RecordId(id), serde_json::from_str(&patch)?)
                .await
        }
        ConsoleCommand::SetStatus { id, status } => {
            client.set_status(args.entity, RecordId(id), status).await
        }
        ConsoleCommand::Delete { id } => client.delete(args.entity, RecordId(id)).await,
    };

    while let Ok(notice) = notices.try_recv() {
        println!("[{:?}] {}", notice.kind, notice.text);
    }

    let state = client.snapshot(args.entity).await;
    println!("outcome: {outcome:?}");
    if let Some(error) = &state.error {
        println!("error: {error}");
    }
    if let Some(total) = state.total_records {
        println!("server total: {total}");
    }
    println!("{}", serde_json::to_string_pretty(&state.data)?);

    Ok(())
}
