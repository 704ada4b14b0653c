//! CLI `doctor` command: database diagnostics and a configuration summary.

use anyhow::{Context, Result};

use mindstream::config::MindstreamConfig;
use mindstream::db;

use super::open_app;

/// Run database diagnostics and print a health report.
pub async fn doctor(config: &MindstreamConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("It is created on first write, e.g. `mindstream register <name>`.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;
    drop(conn);

    let app = open_app(config).await;

    println!("MindStream Health Report");
    println!("========================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Persistence:       {:?}", config.storage.persistence);
    println!(
        "Stored keys:       {} ({})",
        report.key_count,
        report.keys.join(", ")
    );
    println!();
    println!("Thoughts:          {}", app.thoughts().len());
    println!("Registered users:  {}", app.registered_users().len());
    println!("Session:           {}", app.session().name);
    println!("Theme:             {}", app.theme());
    println!("Author name:       {}", app.policy().admin_name());
    println!(
        "AI enhancement:    {}",
        if config.enhance.api_key().is_some() {
            format!("configured ({})", config.enhance.model)
        } else {
            "off (set GEMINI_API_KEY or API_KEY)".to_string()
        }
    );
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db {}", db_path.display());
        println!("  2. Or export from a good copy: mindstream export > backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
