use anyhow::Result;
use serde::Serialize;

use mindstream::config::MindstreamConfig;
use mindstream::journal::Thought;

use super::open_app;

/// Export format: the two persisted collections.
#[derive(Debug, Serialize)]
struct ExportData<'a> {
    thoughts: &'a [Thought],
    registered_users: &'a [String],
}

/// Export all thoughts and registered users as JSON to stdout.
pub async fn export(config: &MindstreamConfig) -> Result<()> {
    let app = open_app(config).await;

    let data = ExportData {
        thoughts: app.thoughts(),
        registered_users: app.registered_users(),
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!(
        "Exported {} thoughts and {} registered users.",
        data.thoughts.len(),
        data.registered_users.len()
    );

    Ok(())
}
