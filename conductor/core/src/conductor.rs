//! Conductor - The Orchestration Core
//!
//! The Conductor owns every interactive component of the portfolio surface
//! and is the only thing that touches them:
//! - Section navigation and its reveal transition
//! - Voice capture sessions and command routing
//! - The contact transmission simulation
//! - Transient effects (notifications, flashes, pulses)
//! - Ambient glitch/pulse emitters
//! - The host bridge boot sequence
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic and clock-agnostic. It communicates through:
//! - `ConductorMessage`: Commands sent TO the UI surface
//! - `SurfaceEvent`: Events received FROM the UI surface
//!
//! Every wait is a [`Deferred`] entry in a virtual-clock [`TimerQueue`]. The
//! driver decides how time passes: the daemon sleeps until
//! [`next_deadline`](Conductor::next_deadline), tests just call
//! [`advance`](Conductor::advance).

use std::time::Duration;

use tokio::sync::mpsc;

use crate::ambient::AmbientEmitter;
use crate::bridge::{self, HostBridge};
use crate::config::ConductorConfig;
use crate::contact::ContactMethod;
use crate::effects::{EffectLifecycleManager, Feedback};
use crate::events::SurfaceEvent;
use crate::messages::{ConductorMessage, ConductorState, LoaderPhase, Outbox};
use crate::navigation::{NavigationController, SectionId};
use crate::random::RandomSource;
use crate::scheduler::{Deferred, Scheduler, TimerQueue};
use crate::skills::{SkillDetailResolver, SkillId};
use crate::transmission::TransmissionSimulator;
use crate::voice::{CommandAction, CommandTable, VoiceCapture, VoiceCommandRouter};

/// The Conductor - headless orchestration core
pub struct Conductor<B: HostBridge> {
    /// Configuration
    config: ConductorConfig,
    /// Host application bridge
    bridge: B,
    /// Virtual clock and pending timers
    scheduler: TimerQueue,
    /// Live transient effects
    effects: EffectLifecycleManager,
    /// Section visibility
    navigation: NavigationController,
    /// Voice sessions
    voice: VoiceCommandRouter,
    /// Contact form
    transmission: TransmissionSimulator,
    /// Background emitters
    ambient: AmbientEmitter,
    /// Currently highlighted skill node
    selected_skill: Option<SkillId>,
    /// Current operational state
    state: ConductorState,
    /// Channel to the UI surface
    outbox: Outbox,
}

/// Build a [`Feedback`] from disjoint fields so other fields stay borrowable
macro_rules! feedback {
    ($self:ident) => {
        Feedback::new(&mut $self.scheduler, &mut $self.effects, &$self.outbox)
    };
}

impl<B: HostBridge> Conductor<B> {
    /// Create a new Conductor
    ///
    /// Nothing is sent until [`start`](Self::start).
    pub fn new(
        bridge: B,
        capture: Box<dyn VoiceCapture>,
        random: Box<dyn RandomSource>,
        config: ConductorConfig,
        tx: mpsc::UnboundedSender<ConductorMessage>,
    ) -> Self {
        let timing = &config.timing;
        Self {
            bridge,
            scheduler: TimerQueue::new(),
            effects: EffectLifecycleManager::new(config.effects.clone()),
            navigation: NavigationController::new(SectionId::Home, timing.section_reveal),
            voice: VoiceCommandRouter::new(
                capture,
                CommandTable::default(),
                timing.voice_end_clear,
                timing.voice_error_clear,
            ),
            transmission: TransmissionSimulator::new(timing.transmission_latency),
            ambient: AmbientEmitter::new(config.ambient.clone(), random),
            selected_skill: None,
            state: ConductorState::Initializing,
            outbox: Outbox::new(tx),
            config,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Boot the host and show the loader
    ///
    /// The interactive UI comes up once the loader has held and faded.
    pub fn start(&mut self) {
        if self.state != ConductorState::Initializing {
            tracing::debug!(state = ?self.state, "Conductor already started");
            return;
        }
        tracing::info!("Starting Conductor");

        bridge::boot(&mut self.bridge, &self.config.theme);
        self.set_state(ConductorState::Loading);
        self.outbox.send(ConductorMessage::Loader {
            phase: LoaderPhase::Holding,
        });
        let hold = self.config.timing.loader_hold;
        feedback!(self).schedule(hold, Deferred::LoaderFade);
    }

    /// Stop reacting to input
    pub fn shutdown(&mut self) {
        if self.state == ConductorState::ShuttingDown {
            return;
        }
        tracing::info!(
            pending_timers = self.scheduler.pending(),
            live_effects = self.effects.live_count(),
            "Conductor shutting down"
        );
        self.set_state(ConductorState::ShuttingDown);
    }

    fn set_state(&mut self, state: ConductorState) {
        self.state = state;
        self.outbox.send(ConductorMessage::State { state });
        tracing::debug!(state = state.description(), "Conductor state changed");
    }

    fn init_ui(&mut self) {
        self.navigation.announce(&self.outbox);
        self.voice.probe(&self.outbox);
        self.ambient.start(&mut feedback!(self));
        self.set_state(ConductorState::Ready);
    }

    // ========================================================================
    // Surface events
    // ========================================================================

    /// Handle an event from the surface
    ///
    /// Events other than a quit request are ignored until the UI is ready.
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        if event == SurfaceEvent::QuitRequested {
            self.shutdown();
            return;
        }
        if !self.state.accepts_input() {
            tracing::debug!(event = event.kind(), state = ?self.state, "Ignoring event");
            return;
        }
        tracing::trace!(event = event.kind(), "Surface event");

        match event {
            SurfaceEvent::NavClicked { section } => {
                self.navigation.activate(&section, &mut feedback!(self));
            }
            SurfaceEvent::VoiceOrbClicked => {
                self.voice.start_capture(&mut feedback!(self));
            }
            SurfaceEvent::VoiceStarted => self.voice.on_start(),
            SurfaceEvent::VoiceResult { transcript } => {
                if let Some(action) = self.voice.on_result(&transcript, &mut feedback!(self)) {
                    self.execute(action);
                }
            }
            SurfaceEvent::VoiceEnded => self.voice.on_end(&mut feedback!(self)),
            SurfaceEvent::VoiceError { reason } => {
                self.voice.on_error(&reason, &mut feedback!(self));
            }
            SurfaceEvent::ContactFieldEdited { field, value } => {
                self.transmission.edit_field(field, value);
            }
            SurfaceEvent::TransmitClicked {
                name,
                email,
                message,
            } => {
                if let Err(e) =
                    self.transmission
                        .submit(&name, &email, &message, &mut feedback!(self))
                {
                    tracing::debug!(error = %e, "Transmission rejected");
                }
            }
            SurfaceEvent::ContactOrbClicked { method } => match ContactMethod::parse(&method) {
                Some(method) => self.contact(method),
                None => tracing::debug!(method = %method, "Ignoring unknown contact method"),
            },
            SurfaceEvent::SkillClicked { skill } => self.select_skill(&skill),
            SurfaceEvent::QuitRequested => {}
        }
    }

    /// Run a voice command through the same paths clicks use
    fn execute(&mut self, action: CommandAction) {
        match action {
            CommandAction::Navigate(section) => {
                self.navigation.navigate(section, &mut feedback!(self));
            }
            // Same destinations as the contact orbs; telegram opens through
            // the host messenger rather than as a plain external link
            CommandAction::Contact(method) => self.contact(method),
        }
    }

    fn contact(&mut self, method: ContactMethod) {
        self.config.links.open(method, &mut self.bridge);
    }

    fn select_skill(&mut self, skill_id: &str) {
        let detail = SkillDetailResolver::resolve(skill_id);
        self.selected_skill = Some(detail.id);
        self.outbox.send(ConductorMessage::SkillSelected {
            skill: detail.id,
            title: detail.title.to_string(),
            description: detail.description.to_string(),
        });
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Current virtual time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Virtual time of the earliest pending timer
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Let `elapsed` pass, firing every timer that falls due
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self.now() + elapsed;
        self.advance_to(target);
    }

    /// Run the clock up to `target`, firing timers in due order
    ///
    /// Timers scheduled while firing are honored if they fall due by
    /// `target`. Returns how many fired.
    pub fn advance_to(&mut self, target: Duration) -> usize {
        let mut fired = 0;
        while let Some((handle, task)) = self.scheduler.pop_due(target) {
            tracing::trace!(%handle, ?task, "Timer fired");
            self.dispatch(task);
            fired += 1;
        }
        self.scheduler.advance_clock(target);
        fired
    }

    fn dispatch(&mut self, task: Deferred) {
        match task {
            Deferred::LoaderFade => {
                self.outbox.send(ConductorMessage::Loader {
                    phase: LoaderPhase::Fading,
                });
                let fade = self.config.timing.loader_fade;
                feedback!(self).schedule(fade, Deferred::LoaderHidden);
            }
            Deferred::LoaderHidden => {
                self.outbox.send(ConductorMessage::Loader {
                    phase: LoaderPhase::Hidden,
                });
                if self.state == ConductorState::Loading {
                    self.init_ui();
                }
            }
            Deferred::RevealSection(section) => self.navigation.reveal(section, &self.outbox),
            Deferred::NotificationEnter(id) => self.effects.on_notification_enter(id, &self.outbox),
            Deferred::NotificationExit(id) => self.effects.on_notification_exit(id, &self.outbox),
            Deferred::ExpireEffect(id) => {
                self.effects.expire(id, &self.outbox);
            }
            Deferred::ClearVoiceIndication => self.voice.clear_indication(&self.outbox),
            Deferred::CompleteTransmission(id) => {
                self.transmission
                    .complete(id, &mut feedback!(self), &mut self.bridge);
            }
            Deferred::AmbientGlitchTick => {
                if self.state != ConductorState::ShuttingDown {
                    self.ambient.on_glitch_tick(&mut feedback!(self));
                }
            }
            Deferred::AmbientPulseTick => {
                if self.state != ConductorState::ShuttingDown {
                    self.ambient.on_pulse_tick(&mut feedback!(self));
                }
            }
            Deferred::AmbientPulseRestore => self.ambient.on_pulse_restore(&self.outbox),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current operational state
    #[must_use]
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// Whether the UI accepts input
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.accepts_input()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    /// Host bridge
    #[must_use]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Host bridge, mutably (drivers drain recorded calls through this)
    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    /// Section navigation
    #[must_use]
    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    /// Voice router
    #[must_use]
    pub fn voice(&self) -> &VoiceCommandRouter {
        &self.voice
    }

    /// Contact transmission
    #[must_use]
    pub fn transmission(&self) -> &TransmissionSimulator {
        &self.transmission
    }

    /// Live effects
    #[must_use]
    pub fn effects(&self) -> &EffectLifecycleManager {
        &self.effects
    }

    /// Ambient emitters
    #[must_use]
    pub fn ambient(&self) -> &AmbientEmitter {
        &self.ambient
    }

    /// Highlighted skill node
    #[must_use]
    pub fn selected_skill(&self) -> Option<SkillId> {
        self.selected_skill
    }

    /// Pending timers
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }
}

impl<B: HostBridge> std::fmt::Debug for Conductor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conductor")
            .field("state", &self.state)
            .field("now", &self.now())
            .field("scheduler", &self.scheduler)
            .field("navigation", &self.navigation)
            .field("voice", &self.voice)
            .field("transmission", &self.transmission)
            .finish_non_exhaustive()
    }
}
