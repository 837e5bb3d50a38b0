//! Document CRUD Example
//!
//! Walks through the document lifecycle against a running CouchDB:
//! - Connecting (and creating the database if needed)
//! - Saving, finding and updating a document
//! - Fire-and-forget batch writes
//! - Removing a document
//!
//! Point it at a server with a config file or the defaults (127.0.0.1:5984):
//!
//! Run with: cargo run --example document_crud -- [config.json]

use couchkit_rs::{Config, CouchDbClient};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Serialize, Deserialize)]
struct Note {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    rev: Option<String>,
    text: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("couchkit_rs=debug,document_crud=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;

    let client = match std::env::args().nth(1) {
        Some(path) => CouchDbClient::from_file(&path).await?,
        None => {
            let mut config = Config::for_database("couchkit-example");
            config.create_db_if_not_exist = true;
            CouchDbClient::connect(config).await?
        }
    };
    println!("Connected to {}\n", client.db_uri());

    // Save a new document; the id is generated
    let saved = client
        .save(&Note {
            id: None,
            rev: None,
            text: "Buy milk".to_string(),
        })
        .await?;
    println!("Saved {} at rev {}", saved.id, saved.rev);

    // Read it back and update it
    let mut note: Note = client.find(&saved.id).await?;
    note.text = "Buy oat milk".to_string();
    let updated = client.update(&note).await?;
    println!("Updated to rev {}", updated.rev);

    // The first revision is still readable until compaction
    let first: Note = client.find_rev(&saved.id, &saved.rev).await?;
    println!("Revision {} said: {}", saved.rev, first.text);

    // Batch writes return before the server commits them
    client
        .batch(&serde_json::json!({"text": "written in batch mode"}))
        .await?;

    // Remove the document
    let removed = client.remove(&updated.id, &updated.rev).await?;
    println!("Removed {} (rev {})", removed.id, removed.rev);
    println!("Still there? {}", client.contains(&saved.id).await?);

    let info = client.context().info().await?;
    println!("\n{} holds {} documents", info.db_name, info.doc_count);

    Ok(())
}
