pub mod doctor;
pub mod export;
pub mod session;
pub mod thoughts;

use std::sync::Arc;

use anyhow::{bail, Result};

use mindstream::config::MindstreamConfig;
use mindstream::enhance::create_enhancer;
use mindstream::journal::{AccessPolicy, App, AppOptions};
use mindstream::render::Palette;
use mindstream::shell::{self as repl, ShellOptions};
use mindstream::storage::SqliteStore;

/// Load the journal from the configured database.
pub async fn open_app(config: &MindstreamConfig) -> App {
    let store = Arc::new(SqliteStore::new(config.resolved_db_path()));
    let enhancer = create_enhancer(&config.enhance);
    let options = AppOptions {
        policy: AccessPolicy::new(config.auth.admin_name.clone()),
        persistence: config.storage.persistence,
    };
    App::load(store, enhancer, options).await
}

pub fn palette(config: &MindstreamConfig, app: &App) -> Palette {
    Palette::for_theme(app.theme(), config.display.color)
}

/// Fail unless the current session may add, edit or delete thoughts.
pub fn require_author(app: &App) -> Result<()> {
    if !app.session().role.can_author() {
        bail!(
            "only the author can change the journal (logged in as {})",
            app.session().name
        );
    }
    Ok(())
}

/// Run the interactive session on stdin/stdout.
pub async fn shell(config: &MindstreamConfig) -> Result<()> {
    let mut app = open_app(config).await;
    let options = ShellOptions {
        images: config.images.clone(),
        color: config.display.color,
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    repl::run(&mut app, &options, stdin.lock(), stdout.lock()).await?;

    app.close().await;
    Ok(())
}
