//! Holo Conductor Core - Headless Interaction Engine for the Holo Portfolio
//!
//! This crate owns the interactive behavior of the holographic portfolio
//! mini-app, independent of how it is rendered. A web view, a terminal, or a
//! test harness can drive it through the same two message types.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         UI Surface                               │
//! │        (web view inside the host messenger / headless)           │
//! │                             │                                    │
//! │                    SurfaceEvent (up)                             │
//! │                  ConductorMessage (down)                         │
//! └─────────────────────────────┼────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┼────────────────────────────────────┐
//! │                     CONDUCTOR CORE                               │
//! │  ┌──────────────────────────┴─────────────────────────────────┐  │
//! │  │                       Conductor                            │  │
//! │  │  ┌────────────┐ ┌───────────┐ ┌──────────────┐ ┌─────────┐ │  │
//! │  │  │ Navigation │ │   Voice   │ │ Transmission │ │ Ambient │ │  │
//! │  │  └─────┬──────┘ └─────┬─────┘ └──────┬───────┘ └────┬────┘ │  │
//! │  │        └──────────────┴──────┬───────┴──────────────┘      │  │
//! │  │                   Feedback (effects + timers)              │  │
//! │  └──────────────────────────────┬─────────────────────────────┘  │
//! │                                 │                                │
//! │                 HostBridge (expand, links, send_data)            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Owns every component and routes events and timers
//! - [`ConductorMessage`]: Messages sent from Conductor to the surface
//! - [`SurfaceEvent`]: Events sent from the surface to Conductor
//! - [`TimerQueue`]: Virtual clock behind every delay
//! - [`HostBridge`]: One-way calls into the host messenger
//!
//! # Quick Start
//!
//! ```ignore
//! use holo_conductor::{
//!     Conductor, RecordingBridge, SurfaceCapture, StdRandom, SurfaceEvent,
//!     config::load_config,
//! };
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let mut conductor = Conductor::new(
//!     RecordingBridge::new(),
//!     Box::new(SurfaceCapture::new(true)),
//!     Box::new(StdRandom::from_entropy()),
//!     load_config()?,
//!     tx,
//! );
//!
//! conductor.start();
//! conductor.advance(Duration::from_secs(4)); // loader done
//! conductor.handle_event(SurfaceEvent::NavClicked { section: "about".into() });
//! conductor.advance(Duration::from_millis(300));
//!
//! while let Ok(msg) = rx.try_recv() {
//!     // Render message
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`conductor`]: Main Conductor struct
//! - [`messages`]: Messages from Conductor to the surface
//! - [`events`]: Events from the surface to Conductor
//! - [`scheduler`]: Deferred work and the virtual clock
//! - [`effects`]: Transient effect lifecycles
//! - [`navigation`]: Section visibility
//! - [`voice`]: Voice sessions and command routing
//! - [`transmission`]: Contact form simulation
//! - [`ambient`]: Background glitch and pulse emitters
//! - [`skills`]: Skill detail lookup
//! - [`contact`]: Contact destinations
//! - [`bridge`]: Host application bridge
//! - [`random`]: Random sources
//! - [`config`]: Layered configuration loading

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ambient;
pub mod bridge;
pub mod conductor;
pub mod config;
pub mod contact;
pub mod effects;
pub mod events;
pub mod messages;
pub mod navigation;
pub mod random;
pub mod scheduler;
pub mod skills;
pub mod transmission;
pub mod voice;

pub use ambient::{AmbientConfig, AmbientEmitter};
pub use bridge::{BridgeCall, HostBridge, RecordingBridge, ThemeColors};
pub use conductor::Conductor;
pub use config::{ConductorConfig, ConfigError, ConfigOverrides, ConfigSource};
pub use contact::{ContactLinks, ContactMethod};
pub use effects::{EffectId, EffectKind, EffectLifecycleManager, EffectTimings, Feedback};
pub use events::SurfaceEvent;
pub use messages::{ConductorMessage, ConductorState, LoaderPhase, NotifyLevel, Outbox};
pub use navigation::{NavigationController, SectionId};
pub use random::{RandomSource, ScriptedRandom, StdRandom};
pub use scheduler::{Deferred, Scheduler, TimerHandle, TimerQueue};
pub use skills::{SkillDetail, SkillDetailResolver, SkillId};
pub use transmission::{
    ContactDraft, ContactField, TransmissionError, TransmissionId, TransmissionSimulator,
    TransmissionState,
};
pub use voice::{
    CaptureError, CommandAction, CommandTable, SurfaceCapture, VoiceCapture, VoiceCommandRouter,
};
