//! Registry of usernames and the role policy.
//!
//! Names are unverified strings. The registry keeps names as typed but
//! compares them case-insensitively; the author role goes to exactly one
//! configured name, matched case-sensitively.

use thiserror::Error;

use super::types::{AuthMode, Identity, Role, VISITOR};

/// Validation failures of the login/registration form. Messages are shown to
/// the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please enter a name.")]
    EmptyName,

    #[error("Username already taken.")]
    NameTaken,

    #[error("User not registered.")]
    NotRegistered,
}

/// Append-only set of registered usernames, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    names: Vec<String>,
}

impl Registry {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.names.iter().any(|n| n.to_lowercase() == wanted)
    }

    fn push(&mut self, name: String) {
        self.names.push(name);
    }
}

/// Maps names to roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    admin_name: String,
}

impl AccessPolicy {
    pub fn new(admin_name: impl Into<String>) -> Self {
        Self {
            admin_name: admin_name.into(),
        }
    }

    pub fn admin_name(&self) -> &str {
        &self.admin_name
    }

    pub fn role_for(&self, name: &str) -> Role {
        if name == VISITOR {
            Role::Visitor
        } else if name == self.admin_name {
            Role::Admin
        } else {
            Role::Member
        }
    }

    pub fn identity(&self, name: &str) -> Identity {
        Identity {
            name: name.to_string(),
            role: self.role_for(name),
        }
    }

    pub fn visitor(&self) -> Identity {
        Identity {
            name: VISITOR.to_string(),
            role: Role::Visitor,
        }
    }

    /// Validate a form submission against the registry. Returns the trimmed
    /// name on success; nothing is mutated.
    pub fn check(&self, mode: AuthMode, name: &str, registry: &Registry) -> Result<String, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::EmptyName);
        }

        match mode {
            AuthMode::Register => {
                if registry.contains(name) || name == VISITOR {
                    return Err(AuthError::NameTaken);
                }
            }
            AuthMode::Login => {
                if !registry.contains(name) && name != self.admin_name {
                    return Err(AuthError::NotRegistered);
                }
            }
        }

        Ok(name.to_string())
    }

    /// Validate and, for registrations, record the name.
    pub fn admit(
        &self,
        mode: AuthMode,
        name: &str,
        registry: &mut Registry,
    ) -> Result<Identity, AuthError> {
        let name = self.check(mode, name, registry)?;
        if mode == AuthMode::Register {
            registry.push(name.clone());
        }
        Ok(self.identity(&name))
    }
}
