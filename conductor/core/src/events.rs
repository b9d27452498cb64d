//! Surface Events
//!
//! Events sent from the rendering surface to the Conductor: clicks, voice
//! recognizer callbacks and contact form input.
//!
//! # Design Philosophy
//!
//! The surface reports what happened, not what it means. A nav click carries
//! the raw `data-section` value; the Conductor decides whether it names a
//! real section.

use serde::{Deserialize, Serialize};

use crate::transmission::ContactField;

/// Events from the surface to the Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceEvent {
    // ============================================
    // Navigation
    // ============================================
    /// A navigation control was clicked
    NavClicked {
        /// Raw section identifier
        section: String,
    },

    // ============================================
    // Voice
    // ============================================
    /// The voice orb was tapped
    VoiceOrbClicked,

    /// Recognizer `onstart`
    VoiceStarted,

    /// Recognizer `onresult`
    VoiceResult {
        /// Best transcript
        transcript: String,
    },

    /// Recognizer `onend`
    VoiceEnded,

    /// Recognizer `onerror`
    VoiceError {
        /// Recognizer-specific reason
        reason: String,
    },

    // ============================================
    // Contact
    // ============================================
    /// A contact input changed
    ContactFieldEdited {
        /// Which input
        field: ContactField,
        /// Its new value
        value: String,
    },

    /// The transmit control was clicked
    TransmitClicked {
        /// Name input
        name: String,
        /// Email input
        email: String,
        /// Message input
        message: String,
    },

    /// A contact orb was clicked
    ContactOrbClicked {
        /// Raw contact identifier
        method: String,
    },

    // ============================================
    // Skills
    // ============================================
    /// A skill node was clicked
    SkillClicked {
        /// Raw skill identifier
        skill: String,
    },

    // ============================================
    // Lifecycle
    // ============================================
    /// The surface is closing
    QuitRequested,
}

impl SurfaceEvent {
    /// Short name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NavClicked { .. } => "nav_clicked",
            Self::VoiceOrbClicked => "voice_orb_clicked",
            Self::VoiceStarted => "voice_started",
            Self::VoiceResult { .. } => "voice_result",
            Self::VoiceEnded => "voice_ended",
            Self::VoiceError { .. } => "voice_error",
            Self::ContactFieldEdited { .. } => "contact_field_edited",
            Self::TransmitClicked { .. } => "transmit_clicked",
            Self::ContactOrbClicked { .. } => "contact_orb_clicked",
            Self::SkillClicked { .. } => "skill_clicked",
            Self::QuitRequested => "quit_requested",
        }
    }
}
