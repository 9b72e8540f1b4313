use std::fmt;

/// Application-level action that drives preparation and validation during binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Login,
    Signup,
    /// Bound without any validation. Kept so the permissive default is explicit.
    Unrecognized(String),
}

impl Action {
    /// Parse an action tag, ignoring case.
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "create" => Action::Create,
            "update" => Action::Update,
            "login" => Action::Login,
            "signup" => Action::Signup,
            _ => Action::Unrecognized(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Login => "login",
            Action::Signup => "signup",
            Action::Unrecognized(tag) => tag,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
