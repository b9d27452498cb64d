//! Contact methods and where they lead

use serde::{Deserialize, Serialize};

use crate::bridge::HostBridge;

/// Contact orbs on the contact section
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    /// Bot chat inside the messenger
    Telegram,
    /// Mail client
    Email,
    /// External freelance work profile
    Upwork,
}

impl ContactMethod {
    /// Parse a contact identifier as used by the surface
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "telegram" => Some(Self::Telegram),
            "email" => Some(Self::Email),
            "upwork" => Some(Self::Upwork),
            _ => None,
        }
    }
}

/// Destinations for each contact method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLinks {
    /// Messenger link
    pub telegram: String,
    /// `mailto:` link
    pub email: String,
    /// Work profile URL
    pub work_profile: String,
}

impl Default for ContactLinks {
    fn default() -> Self {
        Self {
            telegram: "https://t.me/Real1editorBot".to_string(),
            email: "mailto:real1editor@gmail.com".to_string(),
            work_profile: "https://www.upwork.com/freelancers/~01a6fc21cc80922abf".to_string(),
        }
    }
}

impl ContactLinks {
    /// Hand the link for `method` to the host
    ///
    /// Messenger links stay inside the host; everything else opens externally.
    pub fn open(&self, method: ContactMethod, bridge: &mut dyn HostBridge) {
        match method {
            ContactMethod::Telegram => bridge.open_host_messaging_link(&self.telegram),
            ContactMethod::Email => bridge.open_link(&self.email),
            ContactMethod::Upwork => bridge.open_link(&self.work_profile),
        }
        tracing::debug!(?method, "Opened contact link");
    }
}
