//! Effect Lifecycle
//!
//! Transient visual feedback: notifications, transition flashes, glitch
//! flashes and transmission pulses. Every instance is created with a
//! time-to-live and its removal is scheduled at spawn time. Removal cannot be
//! cancelled, so no instance outlives its ttl no matter what happens to the
//! component that asked for it.
//!
//! Spawning is purely additive: a new flash never replaces or merges with one
//! that is already on screen.
//!
//! # Notification phases
//!
//! ```text
//! spawn ──10ms──▶ Visible ──(ttl - exit)──▶ Exiting ──exit──▶ removed
//! (Entering)
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::messages::{ConductorMessage, NotifyLevel, Outbox};
use crate::scheduler::{Deferred, Scheduler, TimerHandle};

/// Effect instance handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub u64);

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fx_{}", self.0)
    }
}

/// Kinds of transient effect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Toast message with a severity
    Notification,
    /// Full-screen flash when the section changes
    TransitionFlash,
    /// Faint full-screen glitch
    GlitchFlash,
    /// Radial pulse while a transmission is in flight
    TransmissionPulse,
}

impl EffectKind {
    /// All kinds
    pub const ALL: [EffectKind; 4] = [
        Self::Notification,
        Self::TransitionFlash,
        Self::GlitchFlash,
        Self::TransmissionPulse,
    ];

    /// Short label for logs
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::TransitionFlash => "transition-flash",
            Self::GlitchFlash => "glitch-flash",
            Self::TransmissionPulse => "transmission-pulse",
        }
    }
}

/// Text and severity carried by a notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Text to show
    pub message: String,
    /// Severity (drives the border color)
    pub level: NotifyLevel,
}

impl NotificationPayload {
    /// Build a payload
    pub fn new(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// Animation phase of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPhase {
    /// Off-screen, about to slide in
    Entering,
    /// On screen
    Visible,
    /// Sliding out
    Exiting,
}

/// Default lifetimes per effect kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectTimings {
    /// Delay before a notification slides in
    pub notification_enter: Duration,
    /// How long a notification stays before sliding out
    pub notification_visible: Duration,
    /// Slide-out duration before removal
    pub notification_exit: Duration,
    /// Transition flash lifetime
    pub transition_flash: Duration,
    /// Glitch flash lifetime
    pub glitch_flash: Duration,
    /// Transmission pulse lifetime
    pub transmission_pulse: Duration,
}

impl Default for EffectTimings {
    fn default() -> Self {
        Self {
            notification_enter: Duration::from_millis(10),
            notification_visible: Duration::from_millis(4000),
            notification_exit: Duration::from_millis(300),
            transition_flash: Duration::from_millis(800),
            glitch_flash: Duration::from_millis(300),
            transmission_pulse: Duration::from_millis(2000),
        }
    }
}

impl EffectTimings {
    /// Total lifetime for a kind
    #[must_use]
    pub fn ttl_for(&self, kind: EffectKind) -> Duration {
        match kind {
            EffectKind::Notification => self.notification_visible + self.notification_exit,
            EffectKind::TransitionFlash => self.transition_flash,
            EffectKind::GlitchFlash => self.glitch_flash,
            EffectKind::TransmissionPulse => self.transmission_pulse,
        }
    }
}

/// A live effect
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectInstance {
    /// Handle
    pub id: EffectId,
    /// Kind
    pub kind: EffectKind,
    /// Notification payload, if any
    pub payload: Option<NotificationPayload>,
    /// Declared lifetime
    pub ttl: Duration,
    /// Scheduler time at spawn
    pub spawned_at: Duration,
    /// Notification phase (notifications only)
    pub phase: Option<NotificationPhase>,
    /// Timer that removes this instance
    pub expiry: TimerHandle,
}

impl EffectInstance {
    /// Scheduler time at which this instance is removed
    #[must_use]
    pub fn expires_at(&self) -> Duration {
        self.spawned_at + self.ttl
    }
}

/// Creates effect instances and removes them when their ttl elapses
#[derive(Debug, Default)]
pub struct EffectLifecycleManager {
    timings: EffectTimings,
    live: BTreeMap<EffectId, EffectInstance>,
    next_id: u64,
    spawned_total: u64,
}

impl EffectLifecycleManager {
    /// Create a manager with the given default lifetimes
    #[must_use]
    pub fn new(timings: EffectTimings) -> Self {
        Self {
            timings,
            ..Self::default()
        }
    }

    /// Default lifetimes
    #[must_use]
    pub fn timings(&self) -> &EffectTimings {
        &self.timings
    }

    /// Spawn an effect with an explicit ttl
    ///
    /// Removal is scheduled immediately and cannot be withdrawn.
    pub fn spawn(
        &mut self,
        kind: EffectKind,
        payload: Option<NotificationPayload>,
        ttl: Duration,
        scheduler: &mut dyn Scheduler,
        outbox: &Outbox,
    ) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.spawned_total += 1;

        let phase = if kind == EffectKind::Notification {
            let exit = self.timings.notification_exit.min(ttl);
            scheduler.schedule(
                self.timings.notification_enter.min(ttl),
                Deferred::NotificationEnter(id),
            );
            scheduler.schedule(ttl - exit, Deferred::NotificationExit(id));
            Some(NotificationPhase::Entering)
        } else {
            None
        };
        let expiry = scheduler.schedule(ttl, Deferred::ExpireEffect(id));

        outbox.send(ConductorMessage::EffectSpawned {
            effect_id: id,
            kind,
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            notification: payload.clone(),
        });
        tracing::debug!(
            effect = %id,
            kind = kind.label(),
            ttl_ms = ttl.as_millis() as u64,
            "Effect spawned"
        );

        self.live.insert(
            id,
            EffectInstance {
                id,
                kind,
                payload,
                ttl,
                spawned_at: scheduler.now(),
                phase,
                expiry,
            },
        );
        id
    }

    /// Spawn with the kind's default ttl
    pub fn spawn_default(
        &mut self,
        kind: EffectKind,
        payload: Option<NotificationPayload>,
        scheduler: &mut dyn Scheduler,
        outbox: &Outbox,
    ) -> EffectId {
        let ttl = self.timings.ttl_for(kind);
        self.spawn(kind, payload, ttl, scheduler, outbox)
    }

    /// Notification slid in
    pub fn on_notification_enter(&mut self, id: EffectId, outbox: &Outbox) {
        self.set_phase(id, NotificationPhase::Visible, outbox);
    }

    /// Notification started sliding out
    pub fn on_notification_exit(&mut self, id: EffectId, outbox: &Outbox) {
        self.set_phase(id, NotificationPhase::Exiting, outbox);
    }

    fn set_phase(&mut self, id: EffectId, phase: NotificationPhase, outbox: &Outbox) {
        let Some(instance) = self.live.get_mut(&id) else {
            tracing::trace!(effect = %id, "Phase change for removed effect");
            return;
        };
        if instance.phase.is_none() {
            return;
        }
        instance.phase = Some(phase);
        outbox.send(ConductorMessage::EffectPhase {
            effect_id: id,
            phase,
        });
    }

    /// Remove an instance whose ttl elapsed
    ///
    /// Returns false if it was already gone.
    pub fn expire(&mut self, id: EffectId, outbox: &Outbox) -> bool {
        match self.live.remove(&id) {
            Some(instance) => {
                outbox.send(ConductorMessage::EffectRemoved {
                    effect_id: id,
                    kind: instance.kind,
                });
                tracing::debug!(effect = %id, kind = instance.kind.label(), "Effect removed");
                true
            }
            None => false,
        }
    }

    /// Look up a live instance
    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&EffectInstance> {
        self.live.get(&id)
    }

    /// Whether an instance is still alive
    #[must_use]
    pub fn is_live(&self, id: EffectId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of live instances
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of live instances of one kind
    #[must_use]
    pub fn live_of_kind(&self, kind: EffectKind) -> usize {
        self.live.values().filter(|e| e.kind == kind).count()
    }

    /// Iterate live instances in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &EffectInstance> {
        self.live.values()
    }

    /// Instances spawned since creation
    #[must_use]
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }
}

/// Borrowed handles a component needs to give feedback
///
/// Bundles the scheduler, effect manager and surface outbox so components
/// can spawn effects and defer work without owning any of them.
pub struct Feedback<'a> {
    scheduler: &'a mut dyn Scheduler,
    effects: &'a mut EffectLifecycleManager,
    outbox: &'a Outbox,
}

impl<'a> Feedback<'a> {
    /// Bundle the handles
    pub fn new(
        scheduler: &'a mut dyn Scheduler,
        effects: &'a mut EffectLifecycleManager,
        outbox: &'a Outbox,
    ) -> Self {
        Self {
            scheduler,
            effects,
            outbox,
        }
    }

    /// Spawn a payload-less effect with its default ttl
    pub fn flash(&mut self, kind: EffectKind) -> EffectId {
        self.effects
            .spawn_default(kind, None, &mut *self.scheduler, self.outbox)
    }

    /// Spawn a notification with the default ttl
    pub fn notify(&mut self, level: NotifyLevel, message: impl Into<String>) -> EffectId {
        self.effects.spawn_default(
            EffectKind::Notification,
            Some(NotificationPayload::new(level, message)),
            &mut *self.scheduler,
            self.outbox,
        )
    }

    /// Defer work
    pub fn schedule(&mut self, delay: Duration, task: Deferred) -> TimerHandle {
        self.scheduler.schedule(delay, task)
    }

    /// Send a message to the surface
    pub fn send(&self, msg: ConductorMessage) {
        self.outbox.send(msg);
    }

    /// Current scheduler time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// The surface outbox
    #[must_use]
    pub fn outbox(&self) -> &Outbox {
        self.outbox
    }
}
