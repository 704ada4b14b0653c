//! CLI session commands: `register`, `login`, `logout`, `whoami`, `theme`.

use anyhow::Result;

use mindstream::config::MindstreamConfig;
use mindstream::journal::{AuthMode, Theme};

use super::open_app;

pub enum ThemeChange {
    Set(Theme),
    Toggle,
}

pub async fn register(config: &MindstreamConfig, name: &str) -> Result<()> {
    authenticate(config, AuthMode::Register, name).await
}

pub async fn login(config: &MindstreamConfig, name: &str) -> Result<()> {
    authenticate(config, AuthMode::Login, name).await
}

async fn authenticate(config: &MindstreamConfig, mode: AuthMode, name: &str) -> Result<()> {
    let mut app = open_app(config).await;
    let greeting = {
        let identity = app.authenticate(mode, name).await?;
        let suffix = if identity.role.can_author() {
            " You can log thoughts."
        } else {
            ""
        };
        format!("Hi, {}.{suffix}", identity.first_name())
    };
    app.close().await;
    println!("{greeting}");
    Ok(())
}

pub async fn logout(config: &MindstreamConfig) -> Result<()> {
    let mut app = open_app(config).await;
    let was = app.session().name.clone();
    app.logout().await;
    app.close().await;
    println!("Logged out {was}.");
    Ok(())
}

pub async fn whoami(config: &MindstreamConfig) -> Result<()> {
    let app = open_app(config).await;
    let session = app.session();
    if session.is_visitor() {
        println!("Visitor (not logged in)");
    } else {
        println!("{} ({:?})", session.name, session.role);
    }
    Ok(())
}

pub async fn theme(config: &MindstreamConfig, change: Option<ThemeChange>) -> Result<()> {
    let mut app = open_app(config).await;
    match change {
        Some(ThemeChange::Set(theme)) => app.set_theme(theme).await,
        Some(ThemeChange::Toggle) => {
            app.toggle_theme().await;
        }
        None => {}
    }
    println!("Theme: {}", app.theme());
    app.close().await;
    Ok(())
}
