//! Host Platform Bridge
//!
//! The messaging platform that embeds the mini-app exposes a handful of
//! one-way calls: chrome theming, opening links, and pushing a data payload
//! back to the bot. None of them return anything and none confirm delivery,
//! so the trait is plain `&mut self` methods with no results.

use serde::{Deserialize, Serialize};

/// Capabilities consumed from the host platform
pub trait HostBridge {
    /// Expand the mini-app to full height
    fn expand(&mut self);

    /// Ask before the user closes the mini-app
    fn enable_closing_confirmation(&mut self);

    /// Tint the host header
    fn set_header_color(&mut self, color: &str);

    /// Tint the host background
    fn set_background_color(&mut self, color: &str);

    /// Tell the host the app finished loading
    fn ready(&mut self);

    /// Open an external link
    fn open_link(&mut self, url: &str);

    /// Open a link inside the host messenger
    fn open_host_messaging_link(&mut self, url: &str);

    /// Push a payload to the bot
    fn send_data(&mut self, payload: &str);

    /// Whether `send_data` is available on this host
    fn supports_send_data(&self) -> bool {
        true
    }
}

/// Header/background colors applied at boot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    /// Header color
    pub header: String,
    /// Background color
    pub background: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            header: "#0a0e17".to_string(),
            background: "#0a0e17".to_string(),
        }
    }
}

/// Host initialization sequence
pub fn boot(bridge: &mut dyn HostBridge, theme: &ThemeColors) {
    bridge.expand();
    bridge.enable_closing_confirmation();
    bridge.set_header_color(&theme.header);
    bridge.set_background_color(&theme.background);
    bridge.ready();
}

/// A single bridge invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum BridgeCall {
    /// `expand()`
    Expand,
    /// `enableClosingConfirmation()`
    EnableClosingConfirmation,
    /// `setHeaderColor(color)`
    SetHeaderColor {
        /// Color
        color: String,
    },
    /// `setBackgroundColor(color)`
    SetBackgroundColor {
        /// Color
        color: String,
    },
    /// `ready()`
    Ready,
    /// `openLink(url)`
    OpenLink {
        /// Target
        url: String,
    },
    /// `openHostMessagingLink(url)`
    OpenHostMessagingLink {
        /// Target
        url: String,
    },
    /// `sendData(payload)`
    SendData {
        /// Serialized payload
        payload: String,
    },
}

/// Bridge that records every call
///
/// Used by tests and by the headless daemon, which drains the recorded calls
/// and forwards them to its own surface.
#[derive(Clone, Debug)]
pub struct RecordingBridge {
    calls: Vec<BridgeCall>,
    send_data_supported: bool,
}

impl Default for RecordingBridge {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            send_data_supported: true,
        }
    }
}

impl RecordingBridge {
    /// Recording bridge with every capability
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Host without `sendData`
    #[must_use]
    pub fn without_send_data() -> Self {
        Self {
            send_data_supported: false,
            ..Self::default()
        }
    }

    /// Calls recorded so far
    #[must_use]
    pub fn calls(&self) -> &[BridgeCall] {
        &self.calls
    }

    /// Drain recorded calls
    pub fn take_calls(&mut self) -> Vec<BridgeCall> {
        std::mem::take(&mut self.calls)
    }

    /// Payloads passed to `send_data`
    #[must_use]
    pub fn sent_data(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BridgeCall::SendData { payload } => Some(payload.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl HostBridge for RecordingBridge {
    fn expand(&mut self) {
        self.calls.push(BridgeCall::Expand);
    }

    fn enable_closing_confirmation(&mut self) {
        self.calls.push(BridgeCall::EnableClosingConfirmation);
    }

    fn set_header_color(&mut self, color: &str) {
        self.calls.push(BridgeCall::SetHeaderColor {
            color: color.to_string(),
        });
    }

    fn set_background_color(&mut self, color: &str) {
        self.calls.push(BridgeCall::SetBackgroundColor {
            color: color.to_string(),
        });
    }

    fn ready(&mut self) {
        self.calls.push(BridgeCall::Ready);
    }

    fn open_link(&mut self, url: &str) {
        self.calls.push(BridgeCall::OpenLink {
            url: url.to_string(),
        });
    }

    fn open_host_messaging_link(&mut self, url: &str) {
        self.calls.push(BridgeCall::OpenHostMessagingLink {
            url: url.to_string(),
        });
    }

    fn send_data(&mut self, payload: &str) {
        if !self.send_data_supported {
            return;
        }
        self.calls.push(BridgeCall::SendData {
            payload: payload.to_string(),
        });
    }

    fn supports_send_data(&self) -> bool {
        self.send_data_supported
    }
}
