use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use mindstream::config::MindstreamConfig;
use mindstream::images::prepare_image;
use mindstream::journal::{short_id, Draft, View};
use mindstream::render::{render_header, render_thoughts};

use super::{open_app, palette, require_author};

/// Print the journal. From the landing state this continues as visitor.
pub async fn list(config: &MindstreamConfig) -> Result<()> {
    let mut app = open_app(config).await;
    if app.view() == View::Landing {
        app.continue_as_visitor();
    }

    let palette = palette(config, &app);
    print!("{}", render_header(app.session(), &palette));
    println!();
    print!(
        "{}",
        render_thoughts(app.thoughts(), app.session().role, &palette)
    );
    Ok(())
}

pub async fn add(
    config: &MindstreamConfig,
    text: Option<String>,
    image: Option<&Path>,
    enhance: bool,
) -> Result<()> {
    let mut app = open_app(config).await;
    require_author(&app)?;

    let text = match text.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read thought from stdin")?;
            buf
        }
        Some(t) => t.to_string(),
        None => String::new(),
    };

    let image = image
        .map(|path| prepare_image(path, &config.images))
        .transpose()?;

    let draft = Draft {
        text,
        image,
        enhance,
    };

    let spinner = enhance.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Processing");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = app.add_thought(draft).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let thought = result?;
    app.close().await;

    let note = if thought.ai_enhanced {
        " (AI polished)"
    } else if enhance {
        " (enhancement unavailable, kept as written)"
    } else {
        ""
    };
    println!("Logged [{}]{note}", thought.short_id());
    if !thought.tags.is_empty() {
        let tags: Vec<String> = thought.tags.iter().map(|t| format!("#{t}")).collect();
        println!("  {}", tags.join(" "));
    }
    Ok(())
}

pub async fn edit(config: &MindstreamConfig, id: &str, text: &str) -> Result<()> {
    let mut app = open_app(config).await;
    require_author(&app)?;

    let id = app.resolve_id(id)?;
    let changed = app.edit_thought(&id, text).await?;
    app.close().await;

    if changed {
        println!("Saved [{}]", short_id(&id));
    } else {
        println!("Nothing saved: the new text is empty.");
    }
    Ok(())
}

pub async fn delete(config: &MindstreamConfig, id: &str) -> Result<()> {
    let mut app = open_app(config).await;
    require_author(&app)?;

    let id = app.resolve_id(id)?;
    let removed = app.delete_thought(&id).await?;
    app.close().await;

    println!("Deleted [{}]", removed.short_id());
    Ok(())
}
