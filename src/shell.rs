//! Interactive line-oriented session.
//!
//! Keeps one [`App`] alive across commands so the landing → authenticated
//! flow, visitor sessions and re-authentication from the main view behave as
//! one continuous session. Input and output are generic so the whole loop can
//! be driven from tests.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::ImageConfig;
use crate::images::prepare_image;
use crate::journal::{App, AuthMode, Draft, View};
use crate::render::{render_header, render_thoughts, Palette};

const LANDING_HELP: &str = "Commands: login <name>, register <name>, visitor, theme, help, quit";
const MAIN_HELP: &str = "Commands: list, add <text>, polish <text>, attach <path>, detach, \
edit <id> <text>, delete <id>, login <name>, register <name>, logout, whoami, theme, help, quit";

#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub images: ImageConfig,
    pub color: bool,
}

enum Flow {
    Continue,
    Quit,
}

struct Shell<'a, W: Write> {
    app: &'a mut App,
    options: &'a ShellOptions,
    out: W,
    pending_image: Option<String>,
}

/// Run the session until `quit` or end of input.
pub async fn run<R: BufRead, W: Write>(
    app: &mut App,
    options: &ShellOptions,
    input: R,
    out: W,
) -> io::Result<()> {
    let mut shell = Shell {
        app,
        options,
        out,
        pending_image: None,
    };
    shell.banner()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        if let Flow::Quit = shell.dispatch(command, rest.trim()).await? {
            break;
        }
    }

    shell.app.flush().await;
    Ok(())
}

impl<W: Write> Shell<'_, W> {
    fn palette(&self) -> Palette {
        Palette::for_theme(self.app.theme(), self.options.color)
    }

    fn banner(&mut self) -> io::Result<()> {
        let header = render_header(self.app.session(), &self.palette());
        write!(self.out, "{header}")?;
        match self.app.view() {
            View::Landing => writeln!(self.out, "{LANDING_HELP}"),
            View::Authenticated => self.list(),
        }
    }

    fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    fn list(&mut self) -> io::Result<()> {
        let rendered = render_thoughts(
            self.app.thoughts(),
            self.app.session().role,
            &self.palette(),
        );
        write!(self.out, "{rendered}")
    }

    async fn dispatch(&mut self, command: &str, rest: &str) -> io::Result<Flow> {
        match command {
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => {
                let help = match self.app.view() {
                    View::Landing => LANDING_HELP,
                    View::Authenticated => MAIN_HELP,
                };
                self.say(help)?;
            }
            "theme" => {
                let theme = self.app.toggle_theme().await;
                self.say(format!("Theme: {theme}"))?;
            }
            "login" => self.authenticate(AuthMode::Login, rest).await?,
            "register" => self.authenticate(AuthMode::Register, rest).await?,
            "visitor" if self.app.view() == View::Landing => {
                self.app.continue_as_visitor();
                self.banner()?;
            }
            _ if self.app.view() == View::Landing => {
                self.say("Log in, register, or continue as visitor first.")?;
            }
            "list" => self.list()?,
            "whoami" => {
                let session = self.app.session();
                let line = format!("{} ({:?})", session.name, session.role);
                self.say(line)?;
            }
            "logout" => {
                self.app.logout().await;
                self.pending_image = None;
                self.banner()?;
            }
            "add" | "polish" | "attach" | "detach" | "edit" | "delete" => {
                if !self.app.session().role.can_author() {
                    self.say("Only the author can do that.")?;
                } else {
                    self.author_command(command, rest).await?;
                }
            }
            other => self.say(format!("Unknown command: {other}. Type help."))?,
        }
        Ok(Flow::Continue)
    }

    async fn authenticate(&mut self, mode: AuthMode, name: &str) -> io::Result<()> {
        match self.app.authenticate(mode, name).await {
            Ok(identity) => {
                let greeting = format!("Welcome, {}.", identity.first_name());
                self.say(greeting)?;
                self.list()
            }
            Err(e) => self.say(e),
        }
    }

    async fn author_command(&mut self, command: &str, rest: &str) -> io::Result<()> {
        match command {
            "add" | "polish" => {
                let draft = Draft {
                    text: rest.to_string(),
                    image: self.pending_image.take(),
                    enhance: command == "polish",
                };
                match self.app.add_thought(draft).await {
                    Ok(thought) => {
                        let note = if thought.ai_enhanced { " (AI polished)" } else { "" };
                        self.say(format!("Logged [{}]{note}", thought.short_id()))
                    }
                    Err(e) => self.say(e),
                }
            }
            "attach" => match prepare_image(Path::new(rest), &self.options.images) {
                Ok(uri) => {
                    self.pending_image = Some(uri);
                    self.say("Image attached to the next thought.")
                }
                Err(e) => self.say(format!("{e:#}")),
            },
            "detach" => {
                self.pending_image = None;
                self.say("Image cleared.")
            }
            "edit" => {
                let (prefix, text) = rest.split_once(' ').unwrap_or((rest, ""));
                let id = match self.app.resolve_id(prefix) {
                    Ok(id) => id,
                    Err(e) => return self.say(e),
                };
                match self.app.edit_thought(&id, text).await {
                    Ok(true) => self.say("Saved."),
                    Ok(false) => self.say("Nothing saved: the new text is empty."),
                    Err(e) => self.say(e),
                }
            }
            "delete" => {
                let id = match self.app.resolve_id(rest) {
                    Ok(id) => id,
                    Err(e) => return self.say(e),
                };
                match self.app.delete_thought(&id).await {
                    Ok(removed) => self.say(format!("Deleted [{}]", removed.short_id())),
                    Err(e) => self.say(e),
                }
            }
            _ => Ok(()),
        }
    }
}
