//! Contact Transmission
//!
//! Simulates sending the contact form. A valid submit disables the control,
//! shows a pulse, waits a fixed latency, then reports success, clears the
//! form and forwards a trimmed payload to the host bot.
//!
//! There is no failure branch: the simulated network always succeeds. The
//! `Failed` state exists in the model but nothing enters it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::HostBridge;
use crate::effects::{EffectKind, Feedback};
use crate::messages::{ConductorMessage, NotifyLevel};
use crate::scheduler::Deferred;

/// Shown when a field is empty
pub const MISSING_FIELDS_TEXT: &str = "Please complete all transmission fields";

/// Shown when the simulated send completes
pub const SUCCESS_TEXT: &str = "Transmission successful! Quantum message received.";

/// Submit label while a transmission is pending
pub const PENDING_LABEL: &str = "TRANSMITTING...";

/// Default submit label
pub const SUBMIT_LABEL: &str = "TRANSMIT";

/// Longest message forwarded to the host, in characters
pub const MAX_FORWARDED_MESSAGE_CHARS: usize = 100;

/// Transmission identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransmissionId(pub u64);

impl std::fmt::Display for TransmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx_{}", self.0)
    }
}

/// Request lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransmissionState {
    /// Form being edited
    Draft,
    /// Fields being checked
    Validating,
    /// Waiting on the simulated network
    Pending,
    /// Delivered
    Succeeded,
    /// Delivery failed (unused: the simulation always succeeds)
    Failed,
}

/// Why a submit was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransmissionError {
    /// A required field is empty
    #[error("{}", MISSING_FIELDS_TEXT)]
    MissingFields,

    /// A transmission is already in flight
    #[error("transmission {0} is still pending")]
    AlreadyPending(TransmissionId),
}

/// Contact form inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    /// Sender name
    Name,
    /// Sender email
    Email,
    /// Message body
    Message,
}

/// Contents of the contact form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Message body
    pub message: String,
}

impl ContactDraft {
    /// Build a draft
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Every field is non-empty
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.message.is_empty()
    }

    /// Replace one field
    pub fn set(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::Name => self.name = value,
            ContactField::Email => self.email = value,
            ContactField::Message => self.message = value,
        }
    }

    /// Empty every field
    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }
}

/// Payload forwarded to the host bot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionPayload {
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Message body, truncated
    pub message: String,
}

impl TransmissionPayload {
    /// Payload for a request, trimming the message
    #[must_use]
    pub fn from_draft(draft: &ContactDraft) -> Self {
        Self {
            name: draft.name.clone(),
            email: draft.email.clone(),
            message: draft
                .message
                .chars()
                .take(MAX_FORWARDED_MESSAGE_CHARS)
                .collect(),
        }
    }
}

struct InFlight {
    id: TransmissionId,
    request: ContactDraft,
}

/// Validates, "sends" and resets the contact form
pub struct TransmissionSimulator {
    state: TransmissionState,
    fields: ContactDraft,
    in_flight: Option<InFlight>,
    next_id: u64,
    latency: Duration,
    completed: u64,
}

impl TransmissionSimulator {
    /// Simulator with the given network latency
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            state: TransmissionState::Draft,
            fields: ContactDraft::default(),
            in_flight: None,
            next_id: 0,
            latency,
            completed: 0,
        }
    }

    /// Surface reported an edited input
    pub fn edit_field(&mut self, field: ContactField, value: String) {
        self.fields.set(field, value);
    }

    /// Submit the form
    ///
    /// # Errors
    ///
    /// Returns [`TransmissionError::MissingFields`] after surfacing the error
    /// notification, or [`TransmissionError::AlreadyPending`] while a previous
    /// submit is in flight. Neither changes any state.
    pub fn submit(
        &mut self,
        name: &str,
        email: &str,
        message: &str,
        fx: &mut Feedback<'_>,
    ) -> Result<TransmissionId, TransmissionError> {
        if let Some(pending) = &self.in_flight {
            return Err(TransmissionError::AlreadyPending(pending.id));
        }

        let request = ContactDraft::new(name, email, message);
        if !request.is_complete() {
            fx.notify(NotifyLevel::Error, MISSING_FIELDS_TEXT);
            return Err(TransmissionError::MissingFields);
        }
        self.state = TransmissionState::Validating;

        let id = TransmissionId(self.next_id);
        self.next_id += 1;
        self.fields = request.clone();
        self.in_flight = Some(InFlight { id, request });
        self.state = TransmissionState::Pending;

        fx.send(ConductorMessage::SubmitControl {
            enabled: false,
            label: PENDING_LABEL.to_string(),
        });
        fx.flash(EffectKind::TransmissionPulse);
        fx.schedule(self.latency, Deferred::CompleteTransmission(id));

        tracing::info!(transmission = %id, "Transmission pending");
        Ok(id)
    }

    /// Simulated latency elapsed
    ///
    /// Returns the forwarded payload, or `None` for an unknown id.
    pub fn complete(
        &mut self,
        id: TransmissionId,
        fx: &mut Feedback<'_>,
        bridge: &mut dyn HostBridge,
    ) -> Option<TransmissionPayload> {
        let InFlight { request, .. } = match self.in_flight.take() {
            Some(current) if current.id == id => current,
            other => {
                self.in_flight = other;
                tracing::debug!(transmission = %id, "Completion for unknown transmission");
                return None;
            }
        };
        self.state = TransmissionState::Succeeded;

        fx.notify(NotifyLevel::Success, SUCCESS_TEXT);
        self.fields.clear();
        fx.send(ConductorMessage::FormCleared);
        fx.send(ConductorMessage::SubmitControl {
            enabled: true,
            label: SUBMIT_LABEL.to_string(),
        });

        let payload = TransmissionPayload::from_draft(&request);
        if bridge.supports_send_data() {
            match serde_json::to_string(&payload) {
                Ok(json) => bridge.send_data(&json),
                Err(e) => tracing::warn!(error = %e, "Failed to encode transmission payload"),
            }
        }

        self.completed += 1;
        self.state = TransmissionState::Draft;
        tracing::info!(transmission = %id, "Transmission succeeded");
        Some(payload)
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> TransmissionState {
        self.state
    }

    /// Current form contents
    #[must_use]
    pub fn fields(&self) -> &ContactDraft {
        &self.fields
    }

    /// Whether the submit control accepts clicks
    #[must_use]
    pub fn is_submit_enabled(&self) -> bool {
        self.in_flight.is_none()
    }

    /// Successful transmissions so far
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

impl std::fmt::Debug for TransmissionSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransmissionSimulator")
            .field("state", &self.state)
            .field("pending", &self.in_flight.as_ref().map(|p| p.id))
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RecordingBridge;
    use crate::effects::EffectLifecycleManager;
    use crate::messages::Outbox;
    use crate::scheduler::TimerQueue;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Harness {
        sim: TransmissionSimulator,
        bridge: RecordingBridge,
        queue: TimerQueue,
        effects: EffectLifecycleManager,
        outbox: Outbox,
        _rx: UnboundedReceiver<ConductorMessage>,
    }

    impl Harness {
        fn new() -> Self {
            let (outbox, rx) = Outbox::channel();
            Self {
                sim: TransmissionSimulator::new(Duration::from_millis(2000)),
                bridge: RecordingBridge::new(),
                queue: TimerQueue::new(),
                effects: EffectLifecycleManager::default(),
                outbox,
                _rx: rx,
            }
        }

        fn submit(
            &mut self,
            name: &str,
            email: &str,
            message: &str,
        ) -> Result<TransmissionId, TransmissionError> {
            let mut fx = Feedback::new(&mut self.queue, &mut self.effects, &self.outbox);
            self.sim.submit(name, email, message, &mut fx)
        }

        fn complete(&mut self, id: TransmissionId) -> Option<TransmissionPayload> {
            let mut fx = Feedback::new(&mut self.queue, &mut self.effects, &self.outbox);
            self.sim.complete(id, &mut fx, &mut self.bridge)
        }
    }

    #[test]
    fn test_missing_field_is_rejected_without_state_change() {
        let mut h = Harness::new();
        h.sim.edit_field(ContactField::Email, "a@b.com".to_string());
        h.sim.edit_field(ContactField::Message, "hi".to_string());

        let err = h.submit("", "a@b.com", "hi").unwrap_err();
        assert_eq!(err, TransmissionError::MissingFields);
        assert_eq!(err.to_string(), MISSING_FIELDS_TEXT);
        assert_eq!(h.sim.state(), TransmissionState::Draft);
        assert_eq!(h.sim.fields(), &ContactDraft::new("", "a@b.com", "hi"));
        assert!(h.sim.is_submit_enabled());
        assert_eq!(h.effects.live_of_kind(EffectKind::Notification), 1);
        assert_eq!(h.effects.live_of_kind(EffectKind::TransmissionPulse), 0);
    }

    #[test]
    fn test_valid_submit_goes_pending() {
        let mut h = Harness::new();
        h.submit("Ada", "ada@example.com", "hello").unwrap();

        assert_eq!(h.sim.state(), TransmissionState::Pending);
        assert!(!h.sim.is_submit_enabled());
        assert_eq!(h.effects.live_of_kind(EffectKind::TransmissionPulse), 1);
    }

    #[test]
    fn test_submit_while_pending_is_rejected() {
        let mut h = Harness::new();
        let id = h.submit("Ada", "ada@example.com", "hello").unwrap();

        assert_eq!(
            h.submit("Bob", "bob@example.com", "again"),
            Err(TransmissionError::AlreadyPending(id))
        );
        assert_eq!(h.sim.state(), TransmissionState::Pending);
        assert_eq!(h.sim.fields().name, "Ada");
        assert_eq!(h.effects.live_of_kind(EffectKind::TransmissionPulse), 1);
    }

    #[test]
    fn test_complete_clears_and_forwards() {
        let mut h = Harness::new();
        let id = h.submit("Ada", "ada@example.com", "hello").unwrap();

        let payload = h.complete(id).unwrap();
        assert_eq!(
            payload,
            TransmissionPayload {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                message: "hello".to_string(),
            }
        );
        assert_eq!(h.sim.state(), TransmissionState::Draft);
        assert_eq!(h.sim.fields(), &ContactDraft::default());
        assert!(h.sim.is_submit_enabled());
        assert_eq!(h.sim.completed(), 1);
        assert_eq!(
            h.bridge.sent_data(),
            vec![r#"{"name":"Ada","email":"ada@example.com","message":"hello"}"#]
        );
    }

    #[test]
    fn test_forwarded_message_is_truncated() {
        let mut h = Harness::new();
        let long = "ü".repeat(150);
        let id = h.submit("Ada", "ada@example.com", &long).unwrap();

        let payload = h.complete(id).unwrap();
        assert_eq!(payload.message.chars().count(), MAX_FORWARDED_MESSAGE_CHARS);
    }

    #[test]
    fn test_host_without_send_data() {
        let mut h = Harness::new();
        h.bridge = RecordingBridge::without_send_data();
        let id = h.submit("Ada", "ada@example.com", "hello").unwrap();

        assert!(h.complete(id).is_some());
        assert!(h.bridge.calls().is_empty());
        assert_eq!(h.sim.completed(), 1);
    }

    #[test]
    fn test_unknown_completion_is_ignored() {
        let mut h = Harness::new();
        let id = h.submit("Ada", "ada@example.com", "hello").unwrap();

        assert!(h.complete(TransmissionId(id.0 + 10)).is_none());
        assert_eq!(h.sim.state(), TransmissionState::Pending);
        assert!(h.complete(id).is_some());
    }
}
