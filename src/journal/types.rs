//! Journal record and session type definitions.
//!
//! [`Thought`] is the stored entry, [`Theme`] the display preference,
//! [`Role`] and [`Identity`] describe who is using the journal, and
//! [`View`] / [`AuthMode`] drive the authentication flow.

use serde::{Deserialize, Serialize};

/// Name of the anonymous session.
pub const VISITOR: &str = "Visitor";

/// A journal entry, stored with the camelCase field names of the
/// `thoughts` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    /// UUID v4, assigned at creation.
    pub id: String,
    /// Entry text. The only field that can change after creation.
    pub content: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Lowercase topic labels from enhancement, frozen at creation.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether enhancement succeeded when the entry was created.
    #[serde(default)]
    pub ai_enhanced: bool,
    /// Downscaled image as a `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Thought {
    /// The id as shown in listings, see [`short_id`].
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// First eight bytes of an id, or the whole id when it is shorter or the
/// cut would split a character.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("unknown theme: {s}")),
        }
    }
}

/// What a session is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Anonymous reader.
    Visitor,
    /// Registered reader.
    Member,
    /// The single author: may add, edit and delete thoughts.
    Admin,
}

impl Role {
    pub fn can_author(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// The user behind the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn is_visitor(&self) -> bool {
        self.role == Role::Visitor
    }

    /// First word of the name, used in greetings.
    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or(&self.name)
    }
}

/// Top-level screen of the authentication flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Unauthenticated entry screen.
    Landing,
    /// Main journal view, as a named user or as a visitor.
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Input for a new thought. Consumed by `App::add_thought`.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub text: String,
    /// Prepared `data:` URI, see [`crate::images::prepare_image`].
    pub image: Option<String>,
    /// Request AI polish and tagging.
    pub enhance: bool,
}

impl Draft {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn enhanced(mut self) -> Self {
        self.enhance = true;
        self
    }

    pub fn with_image(mut self, data_uri: impl Into<String>) -> Self {
        self.image = Some(data_uri.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn thought_uses_camel_case_fields() {
        let thought = Thought {
            id: "abc".into(),
            content: "hello".into(),
            timestamp: 1_700_000_000_000,
            tags: vec!["life".into()],
            ai_enhanced: true,
            image: None,
        };
        let value = serde_json::to_value(&thought).unwrap();
        assert_eq!(value["aiEnhanced"], json!(true));
        assert!(value.get("image").is_none());
    }

    #[test]
    fn thought_reads_sparse_records() {
        let thought: Thought = serde_json::from_value(json!({
            "id": "1",
            "content": "old entry",
            "timestamp": 1
        }))
        .unwrap();
        assert!(thought.tags.is_empty());
        assert!(!thought.ai_enhanced);
        assert!(thought.image.is_none());
    }

    #[test]
    fn short_id_never_splits_a_character() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
        // "é" spans bytes 7..9, so there is no boundary at 8.
        assert_eq!(short_id("abcdefgé-legacy"), "abcdefgé-legacy");
        assert_eq!(short_id("日記-entry"), "日記-e");
    }

    #[test]
    fn theme_round_trips_through_str() {
        assert_eq!("light".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(serde_json::to_value(Theme::Dark).unwrap(), json!("dark"));
    }

    #[test]
    fn first_name_splits_on_space() {
        let id = Identity {
            name: "Leslie Lyu".into(),
            role: Role::Admin,
        };
        assert_eq!(id.first_name(), "Leslie");
    }
}
