//! Terminal rendering of the journal.

use std::fmt::Write;

use chrono::{Local, TimeZone};

use crate::images::data_uri_size;
use crate::journal::{Identity, Role, Theme, Thought};

/// ANSI styling for one theme. `plain()` disables color.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    accent: &'static str,
    muted: &'static str,
    reset: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme, color: bool) -> Self {
        if !color {
            return Self::plain();
        }
        match theme {
            // bright teal / grey on dark backgrounds
            Theme::Dark => Self {
                accent: "\x1b[96m",
                muted: "\x1b[90m",
                reset: "\x1b[0m",
            },
            Theme::Light => Self {
                accent: "\x1b[36m",
                muted: "\x1b[2m",
                reset: "\x1b[0m",
            },
        }
    }

    pub fn plain() -> Self {
        Self {
            accent: "",
            muted: "",
            reset: "",
        }
    }

    fn accent(&self, text: &str) -> String {
        format!("{}{text}{}", self.accent, self.reset)
    }

    fn muted(&self, text: &str) -> String {
        format!("{}{text}{}", self.muted, self.reset)
    }
}

/// Title block plus the session line.
pub fn render_header(session: &Identity, palette: &Palette) -> String {
    let greeting = if session.is_visitor() {
        "Visitor (login to sign in)".to_string()
    } else {
        format!("Hi, {}", session.first_name())
    };
    format!(
        "{}\n{}\n{}\n",
        palette.accent("MindStream"),
        palette.muted("Document your journey."),
        palette.muted(&greeting)
    )
}

/// Render thoughts in stored order (newest first). Ids are shown only to the
/// author, who needs them for `edit` and `delete`.
pub fn render_thoughts(thoughts: &[Thought], viewer: Role, palette: &Palette) -> String {
    if thoughts.is_empty() {
        let message = if viewer.can_author() {
            "Nothing here yet. Log a thought to clear your mind."
        } else {
            "The author hasn't posted anything yet."
        };
        return format!("{}\n", palette.muted(message));
    }

    let mut out = String::new();
    for (i, thought) in thoughts.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_thought(&mut out, thought, viewer, palette);
    }
    out
}

fn render_thought(out: &mut String, thought: &Thought, viewer: Role, palette: &Palette) {
    let mut meta = format_timestamp(thought.timestamp);
    if thought.ai_enhanced {
        meta.push_str("  ✨ AI Polished");
    }
    if viewer.can_author() {
        let _ = write!(meta, "  [{}]", thought.short_id());
    }
    let _ = writeln!(out, "{}", palette.muted(&meta));

    if !thought.content.is_empty() {
        for line in thought.content.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }

    if let Some(image) = &thought.image {
        let kb = data_uri_size(image).div_ceil(1024);
        let _ = writeln!(out, "  {}", palette.muted(&format!("[image, {kb} KB]")));
    }

    if !thought.tags.is_empty() {
        let tags: Vec<String> = thought.tags.iter().map(|t| format!("#{t}")).collect();
        let _ = writeln!(out, "  {}", palette.accent(&tags.join(" ")));
    }
}

/// Local time as `Mon D, HH:MM AM`.
pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%b %-d, %I:%M %p").to_string(),
        None => "unknown time".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thought(id: &str, content: &str) -> Thought {
        Thought {
            id: id.into(),
            content: content.into(),
            timestamp: 1_760_000_000_000,
            tags: Vec::new(),
            ai_enhanced: false,
            image: None,
        }
    }

    #[test]
    fn empty_list_message_depends_on_viewer() {
        let plain = Palette::plain();
        assert!(render_thoughts(&[], Role::Admin, &plain).contains("Log a thought"));
        assert_eq!(
            render_thoughts(&[], Role::Visitor, &plain),
            "The author hasn't posted anything yet.\n"
        );
    }

    #[test]
    fn ids_only_for_author() {
        let plain = Palette::plain();
        let list = [thought("0123456789abcdef", "hello")];
        assert!(render_thoughts(&list, Role::Admin, &plain).contains("[01234567]"));
        assert!(!render_thoughts(&list, Role::Member, &plain).contains("0123"));
    }

    #[test]
    fn keeps_stored_order_and_shows_markers() {
        let plain = Palette::plain();
        let mut newer = thought("b", "second");
        newer.ai_enhanced = true;
        newer.tags = vec!["work".into(), "focus".into()];
        let older = thought("a", "first");

        let out = render_thoughts(&[newer, older], Role::Visitor, &plain);
        let second = out.find("second").unwrap();
        let first = out.find("first").unwrap();
        assert!(second < first);
        assert!(out.contains("✨ AI Polished"));
        assert!(out.contains("#work #focus"));
    }

    #[test]
    fn image_marker_reports_size() {
        let plain = Palette::plain();
        let mut t = thought("c", "");
        t.image = Some(format!("data:image/jpeg;base64,{}", "A".repeat(4096)));
        let out = render_thoughts(&[t], Role::Visitor, &plain);
        assert!(out.contains("[image, 3 KB]"));
    }

    #[test]
    fn header_greets_by_first_name() {
        let id = Identity {
            name: "Leslie Lyu".into(),
            role: Role::Admin,
        };
        assert!(render_header(&id, &Palette::plain()).contains("Hi, Leslie"));
    }

    #[test]
    fn palette_wraps_only_when_colored() {
        let colored = Palette::for_theme(Theme::Dark, true);
        assert!(colored.accent("x").starts_with("\x1b["));
        let plain = Palette::for_theme(Theme::Light, false);
        assert_eq!(plain.accent("x"), "x");
    }
}
