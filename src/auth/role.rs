use serde::Serialize;
use std::fmt;

/// Coarse permission tier attached to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Owner,
    Admin,
    Manager,
    Member,
    Other(String),
}

impl Role {
    /// Parse a role string. Never fails: unknown values become `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "owner" => Role::Owner,
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "member" => Role::Member,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Member => "member",
            Role::Other(s) => s,
        }
    }

    pub fn view(&self) -> View {
        match self {
            Role::Owner | Role::Admin | Role::Manager => View::Admin,
            Role::Member | Role::Other(_) => View::Member,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which dashboard a user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Admin,
    Member,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Admin => "admin",
            View::Member => "member",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Admin => "Executive dashboard",
            View::Member => "My dashboard",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// owner | admin | manager → admin view, anything else (missing included) → member view.
pub fn route_for_role(role: Option<&str>) -> View {
    role.map(Role::parse)
        .map(|r| r.view())
        .unwrap_or(View::Member)
}
