mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use mindstream::config::MindstreamConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mindstream", version, about = "Document your journey: a single-author journal")]
struct Cli {
    /// Config file (defaults to ~/.mindstream/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new name and log in with it
    Register {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Log in with a registered name
    Login {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// End the current session
    Logout,
    /// Show the current session
    Whoami,
    /// Show the journal, newest first
    List,
    /// Log a new thought (author only)
    Add {
        /// Thought text; `-` reads it from stdin
        text: Option<String>,
        /// Attach an image file
        #[arg(long)]
        image: Option<PathBuf>,
        /// Polish the text and suggest tags with AI
        #[arg(long)]
        enhance: bool,
    },
    /// Replace the text of a thought (author only)
    Edit {
        /// Thought id or unique id prefix
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Delete a thought (author only)
    Delete {
        /// Thought id or unique id prefix
        id: String,
    },
    /// Show or change the theme
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },
    /// Start an interactive session
    Shell,
    /// Print thoughts and registered users as JSON
    Export,
    /// Check the database and configuration
    Doctor,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MindstreamConfig::load_from(path)?,
        None => MindstreamConfig::load()?,
    };

    // Log to stderr so stdout stays clean for listings and exports.
    let filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Register { name } => cli::session::register(&config, &name.join(" ")).await?,
        Command::Login { name } => cli::session::login(&config, &name.join(" ")).await?,
        Command::Logout => cli::session::logout(&config).await?,
        Command::Whoami => cli::session::whoami(&config).await?,
        Command::List => cli::thoughts::list(&config).await?,
        Command::Add {
            text,
            image,
            enhance,
        } => cli::thoughts::add(&config, text, image.as_deref(), enhance).await?,
        Command::Edit { id, text } => cli::thoughts::edit(&config, &id, &text.join(" ")).await?,
        Command::Delete { id } => cli::thoughts::delete(&config, &id).await?,
        Command::Theme { choice } => {
            let choice = choice.map(|c| match c {
                ThemeChoice::Light => cli::session::ThemeChange::Set(mindstream::journal::Theme::Light),
                ThemeChoice::Dark => cli::session::ThemeChange::Set(mindstream::journal::Theme::Dark),
                ThemeChoice::Toggle => cli::session::ThemeChange::Toggle,
            });
            cli::session::theme(&config, choice).await?
        }
        Command::Shell => cli::shell(&config).await?,
        Command::Export => cli::export::export(&config).await?,
        Command::Doctor => cli::doctor::doctor(&config).await?,
    }

    Ok(())
}
