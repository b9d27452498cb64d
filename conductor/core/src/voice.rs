//! Voice Command Routing
//!
//! Turns voice capture sessions into navigation or contact actions.
//!
//! # Sessions
//!
//! At most one capture session exists. Starting while one is listening does
//! nothing. The capture capability is probed once when the UI initializes; if
//! it is missing the router stays disabled for the rest of the run and the
//! voice orb is hidden.
//!
//! ```text
//! Idle ──start──▶ Listening ──end──▶ Completed ──▶ Idle
//!                     │
//!                     └──error──▶ Errored ──▶ Idle
//! ```
//!
//! Errors are terminal for the session. Nothing retries; the user taps the
//! orb again.
//!
//! # Commands
//!
//! Recognized utterances are lowercased and checked against an ordered
//! [`CommandTable`]. The first rule with a keyword contained in the utterance
//! wins. The router only returns the action; the Conductor executes it through
//! the same entry points clicks use.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contact::ContactMethod;
use crate::effects::Feedback;
use crate::messages::{ConductorMessage, NotifyLevel, Outbox};
use crate::navigation::SectionId;
use crate::scheduler::Deferred;

/// Shown while listening
pub const LISTENING_TEXT: &str = "Neural interface active...";

/// Shown when a session fails
pub const ERROR_TEXT: &str = "Neural interface error. Please try again.";

/// Errors from the capture capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The host has no speech recognition
    #[error("voice capture is not available on this host")]
    Unavailable,

    /// The capability refused to start
    #[error("voice capture refused to start: {0}")]
    Refused(String),
}

/// Speech recognition provided by the host
///
/// Results and lifecycle notifications come back later as surface events;
/// this trait only covers the probe and the start request.
pub trait VoiceCapture {
    /// Whether speech recognition exists on this host
    fn is_available(&self) -> bool;

    /// Begin listening
    ///
    /// # Errors
    ///
    /// Returns an error if the capability cannot start a session.
    fn start(&mut self) -> Result<(), CaptureError>;
}

/// Capture driven by the rendering surface
///
/// The surface owns the real recognizer and reports its events back, so
/// starting only checks availability.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceCapture {
    available: bool,
}

impl SurfaceCapture {
    /// Capture that is present or absent
    #[must_use]
    pub fn new(available: bool) -> Self {
        Self { available }
    }
}

impl VoiceCapture for SurfaceCapture {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.available {
            Ok(())
        } else {
            Err(CaptureError::Unavailable)
        }
    }
}

/// Session identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceSessionId(pub u64);

/// Capture session states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceSessionState {
    /// No capture in progress
    Idle,
    /// Capturing speech
    Listening,
    /// Ended normally
    Completed,
    /// Ended with an error
    Errored,
}

/// One capture episode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceSession {
    /// Identity
    pub id: VoiceSessionId,
    /// Current state
    pub state: VoiceSessionState,
    /// Last recognized transcript, lowercased
    pub transcript: Option<String>,
}

/// What a recognized command does
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandAction {
    /// Show a section
    Navigate(SectionId),
    /// Open a contact link
    Contact(ContactMethod),
}

/// Keywords that trigger an action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRule {
    keywords: Vec<String>,
    action: CommandAction,
}

impl CommandRule {
    /// Rule that fires when any keyword appears in the utterance
    pub fn new<I, S>(keywords: I, action: CommandAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            action,
        }
    }

    /// Whether a lowercased utterance triggers this rule
    #[must_use]
    pub fn matches(&self, utterance: &str) -> bool {
        self.keywords.iter().any(|k| utterance.contains(k.as_str()))
    }

    /// The rule's action
    #[must_use]
    pub fn action(&self) -> CommandAction {
        self.action
    }
}

/// Ordered rules, first match wins
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandTable {
    rules: Vec<CommandRule>,
}

impl Default for CommandTable {
    fn default() -> Self {
        use CommandAction::{Contact, Navigate};

        Self::new(vec![
            CommandRule::new(["home", "main"], Navigate(SectionId::Home)),
            CommandRule::new(["about", "profile"], Navigate(SectionId::About)),
            CommandRule::new(["skills", "abilities"], Navigate(SectionId::Skills)),
            CommandRule::new(["portfolio", "work"], Navigate(SectionId::Portfolio)),
            CommandRule::new(["services", "offer"], Navigate(SectionId::Services)),
            CommandRule::new(["contact", "connect"], Navigate(SectionId::Contact)),
            CommandRule::new(["telegram"], Contact(ContactMethod::Telegram)),
            CommandRule::new(["email"], Contact(ContactMethod::Email)),
        ])
    }
}

impl CommandTable {
    /// Table from explicit rules
    #[must_use]
    pub fn new(rules: Vec<CommandRule>) -> Self {
        Self { rules }
    }

    /// Append a rule with the lowest priority
    #[must_use]
    pub fn with_rule(mut self, rule: CommandRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// First action whose rule matches
    #[must_use]
    pub fn route(&self, utterance: &str) -> Option<CommandAction> {
        self.rules
            .iter()
            .find(|r| r.matches(utterance))
            .map(CommandRule::action)
    }

    /// Rules in priority order
    #[must_use]
    pub fn rules(&self) -> &[CommandRule] {
        &self.rules
    }
}

/// Owns the capture session and routes utterances
pub struct VoiceCommandRouter {
    capture: Box<dyn VoiceCapture>,
    table: CommandTable,
    probed: bool,
    enabled: bool,
    session: Option<VoiceSession>,
    last_session: Option<VoiceSession>,
    next_session: u64,
    end_clear_delay: Duration,
    error_clear_delay: Duration,
}

impl VoiceCommandRouter {
    /// Create a router; it stays disabled until [`probe`](Self::probe)
    #[must_use]
    pub fn new(
        capture: Box<dyn VoiceCapture>,
        table: CommandTable,
        end_clear_delay: Duration,
        error_clear_delay: Duration,
    ) -> Self {
        Self {
            capture,
            table,
            probed: false,
            enabled: false,
            session: None,
            last_session: None,
            next_session: 0,
            end_clear_delay,
            error_clear_delay,
        }
    }

    /// Check capture availability once
    ///
    /// A missing capability disables the router permanently. Later calls
    /// return the first answer without probing again.
    pub fn probe(&mut self, outbox: &Outbox) -> bool {
        if self.probed {
            return self.enabled;
        }
        self.probed = true;
        self.enabled = self.capture.is_available();
        outbox.send(ConductorMessage::VoiceControl {
            available: self.enabled,
        });
        if self.enabled {
            tracing::info!("Voice capture available");
        } else {
            tracing::info!("Voice capture unavailable, voice control disabled");
        }
        self.enabled
    }

    /// User tapped the voice orb
    ///
    /// Returns the new session id, or `None` if nothing started.
    pub fn start_capture(&mut self, fx: &mut Feedback<'_>) -> Option<VoiceSessionId> {
        if !self.enabled {
            tracing::debug!("Voice capture disabled, ignoring start");
            return None;
        }
        if self.is_listening() {
            tracing::debug!("Voice session already listening, ignoring start");
            return None;
        }

        if let Err(e) = self.capture.start() {
            tracing::warn!(error = %e, "Voice capture failed to start");
            self.fail(fx);
            return None;
        }

        let id = VoiceSessionId(self.next_session);
        self.next_session += 1;
        self.session = Some(VoiceSession {
            id,
            state: VoiceSessionState::Listening,
            transcript: None,
        });

        fx.send(ConductorMessage::VoiceOrb { active: true });
        fx.send(ConductorMessage::VoiceFeedback {
            text: LISTENING_TEXT.to_string(),
        });
        tracing::debug!(session = id.0, "Voice session listening");
        Some(id)
    }

    /// Recognizer confirmed it started
    pub fn on_start(&self) {
        match &self.session {
            Some(s) => tracing::trace!(session = s.id.0, "Recognizer started"),
            None => tracing::debug!("Recognizer start without a session"),
        }
    }

    /// Recognizer produced a transcript
    ///
    /// Returns the matched action, if any. The transcript is shown either way.
    pub fn on_result(&mut self, utterance: &str, fx: &mut Feedback<'_>) -> Option<CommandAction> {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.state == VoiceSessionState::Listening)
        else {
            tracing::debug!("Voice result without a listening session, ignoring");
            return None;
        };

        let transcript = utterance.to_lowercase();
        fx.send(ConductorMessage::VoiceFeedback {
            text: format!("Command: {transcript}"),
        });

        let action = self.table.route(&transcript);
        match action {
            Some(action) => tracing::info!(?action, transcript = %transcript, "Voice command"),
            None => tracing::debug!(transcript = %transcript, "No voice command matched"),
        }
        session.transcript = Some(transcript);
        action
    }

    /// Recognizer ended
    pub fn on_end(&mut self, fx: &mut Feedback<'_>) {
        let Some(mut session) = self.session.take() else {
            tracing::debug!("Voice end without a session, ignoring");
            return;
        };
        session.state = VoiceSessionState::Completed;
        self.last_session = Some(session);

        fx.send(ConductorMessage::VoiceOrb { active: false });
        fx.schedule(self.end_clear_delay, Deferred::ClearVoiceIndication);
    }

    /// Recognizer failed
    pub fn on_error(&mut self, reason: &str, fx: &mut Feedback<'_>) {
        tracing::warn!(reason = reason, "Voice capture error");
        if let Some(mut session) = self.session.take() {
            session.state = VoiceSessionState::Errored;
            self.last_session = Some(session);
        }
        self.fail(fx);
    }

    fn fail(&mut self, fx: &mut Feedback<'_>) {
        fx.send(ConductorMessage::VoiceOrb { active: false });
        fx.send(ConductorMessage::VoiceFeedback {
            text: ERROR_TEXT.to_string(),
        });
        fx.notify(NotifyLevel::Error, ERROR_TEXT);
        fx.schedule(self.error_clear_delay, Deferred::ClearVoiceIndication);
    }

    /// Indication display delay elapsed
    pub fn clear_indication(&self, outbox: &Outbox) {
        outbox.send(ConductorMessage::VoiceFeedbackCleared);
    }

    /// Current session, if any
    #[must_use]
    pub fn session(&self) -> Option<&VoiceSession> {
        self.session.as_ref()
    }

    /// Most recently finished session
    #[must_use]
    pub fn last_session(&self) -> Option<&VoiceSession> {
        self.last_session.as_ref()
    }

    /// Current session state (`Idle` without a session)
    #[must_use]
    pub fn state(&self) -> VoiceSessionState {
        self.session
            .as_ref()
            .map_or(VoiceSessionState::Idle, |s| s.state)
    }

    /// Whether a session is listening
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state() == VoiceSessionState::Listening
    }

    /// Whether the capability was found
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The command table
    #[must_use]
    pub fn table(&self) -> &CommandTable {
        &self.table
    }
}

impl std::fmt::Debug for VoiceCommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCommandRouter")
            .field("enabled", &self.enabled)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
