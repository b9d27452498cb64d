//! Conductor Messages
//!
//! Messages sent from the Conductor to the rendering surface. These describe
//! everything the page needs to show: which section is visible, which effects
//! are alive, what the voice orb is doing, and the state of the contact form.
//!
//! # Design Philosophy
//!
//! The surface is a pure renderer. It never decides whether a section should
//! be visible or when an effect disappears; it just applies these messages.
//! That keeps every timed decision inside the Conductor where a virtual clock
//! can drive it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::effects::{EffectId, EffectKind, NotificationPayload, NotificationPhase};
use crate::navigation::SectionId;
use crate::skills::SkillId;

/// Messages from Conductor to the rendering surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConductorMessage {
    // ============================================
    // Lifecycle
    // ============================================
    /// Conductor changed operational state
    State {
        /// The new state
        state: ConductorState,
    },

    /// Boot loader progressed
    Loader {
        /// Current loader phase
        phase: LoaderPhase,
    },

    // ============================================
    // Navigation
    // ============================================
    /// Every section lost its active flag (exit effect may render)
    SectionsDeactivated,

    /// A section became the visible one
    SectionActivated {
        /// The section now shown
        section: SectionId,
    },

    /// Navigation control selection changed
    NavSelected {
        /// The control marked as selected
        section: SectionId,
    },

    // ============================================
    // Effects
    // ============================================
    /// A transient effect instance was created
    EffectSpawned {
        /// Handle of the new instance
        effect_id: EffectId,
        /// What kind of effect to render
        kind: EffectKind,
        /// Lifetime in milliseconds
        ttl_ms: u64,
        /// Notification text and severity (notifications only)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notification: Option<NotificationPayload>,
    },

    /// A notification moved to another animation phase
    EffectPhase {
        /// Which notification
        effect_id: EffectId,
        /// The phase it entered
        phase: NotificationPhase,
    },

    /// An effect instance expired and must be removed
    EffectRemoved {
        /// Which instance
        effect_id: EffectId,
        /// Its kind
        kind: EffectKind,
    },

    /// Decorative orb pulse toggled (ambient refresh)
    OrbPulse {
        /// Whether the pulse animation is running
        running: bool,
    },

    // ============================================
    // Voice
    // ============================================
    /// Voice control availability (probed once at startup)
    VoiceControl {
        /// False hides the voice orb for good
        available: bool,
    },

    /// Voice orb listening highlight
    VoiceOrb {
        /// Whether the orb shows the listening state
        active: bool,
    },

    /// Voice feedback line shown with the given text
    VoiceFeedback {
        /// Text to display
        text: String,
    },

    /// Voice feedback line hidden
    VoiceFeedbackCleared,

    // ============================================
    // Contact form
    // ============================================
    /// Submit control state
    SubmitControl {
        /// Whether the control accepts clicks
        enabled: bool,
        /// Label to display
        label: String,
    },

    /// All contact inputs were emptied
    FormCleared,

    // ============================================
    // Skills
    // ============================================
    /// Skill detail panel content
    SkillSelected {
        /// Selected skill node
        skill: SkillId,
        /// Panel heading
        title: String,
        /// Panel body
        description: String,
    },
}

/// Boot loader phases
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderPhase {
    /// Loader fully visible
    Holding,
    /// Loader fading out
    Fading,
    /// Loader gone, interactive UI initialized
    Hidden,
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

/// Conductor operational states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductorState {
    /// Constructed, host not yet initialized
    Initializing,
    /// Boot loader on screen
    Loading,
    /// Interactive
    Ready,
    /// Shutting down
    ShuttingDown,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Initializing => "Starting up...",
            Self::Loading => "Neural interface loading...",
            Self::Ready => "Ready",
            Self::ShuttingDown => "Shutting down...",
        }
    }

    /// Whether user input is accepted in this state
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Sending half of the surface channel
///
/// Sends never block and never fail loudly: a surface that went away just
/// stops receiving, which is logged once per message.
#[derive(Clone, Debug)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<ConductorMessage>,
}

impl Outbox {
    /// Wrap an existing sender
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<ConductorMessage>) -> Self {
        Self { tx }
    }

    /// Create an outbox together with its receiving end
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ConductorMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Send a message to the surface
    pub fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg) {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}
