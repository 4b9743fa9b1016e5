// ── Signed-in user ──

use serde::{Deserialize, Serialize};
use strum::Display;

/// How the current user got in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthMode {
    Demo,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// From the `https://netop.cloud/roles` claim; `user` when absent.
    pub role: String,
    pub auth_mode: AuthMode,
}

pub const DEMO_USER_ID: &str = "demo-user-123";
pub const DEFAULT_ROLE: &str = "user";

impl User {
    /// The fixed identity used in demo mode.
    pub fn demo() -> Self {
        Self {
            id: DEMO_USER_ID.into(),
            email: Some("demo@netop.cloud".into()),
            display_name: Some("Demo User".into()),
            role: "admin".into(),
            auth_mode: AuthMode::Demo,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.auth_mode == AuthMode::Demo
    }

    /// Best label for greetings and status lines.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}
