//! Integration tests for the interaction engine
//!
//! These tests drive a full Conductor through surface events and virtual
//! time, the way the rendering surface would. Tests cover:
//! - Host boot and loader sequencing
//! - Section navigation invariants
//! - Voice sessions and command routing
//! - Contact transmission lifecycle
//! - Effect lifetimes under ambient load
//! - TOML configuration affecting components

use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

use holo_conductor::config::load_config_with_env;
use holo_conductor::effects::NotificationPayload;
use holo_conductor::transmission::{TransmissionPayload, SUCCESS_TEXT};
use holo_conductor::voice::ERROR_TEXT;
use holo_conductor::{
    BridgeCall, Conductor, ConductorConfig, ConductorMessage, ConductorState, ContactField,
    EffectKind, LoaderPhase, NotifyLevel, RecordingBridge, ScriptedRandom, SectionId, SkillId,
    SurfaceCapture, SurfaceEvent, TransmissionState,
};

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    conductor: Conductor<RecordingBridge>,
    rx: mpsc::UnboundedReceiver<ConductorMessage>,
}

impl Harness {
    fn with(config: ConductorConfig, voice: bool, random: ScriptedRandom) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let conductor = Conductor::new(
            RecordingBridge::new(),
            Box::new(SurfaceCapture::new(voice)),
            Box::new(random),
            config,
            tx,
        );
        Self { conductor, rx }
    }

    /// Booted and past the loader, ambient off, messages drained
    fn ready() -> Self {
        let mut config = ConductorConfig::default();
        config.ambient.enabled = false;
        Self::ready_with(config, true)
    }

    fn ready_with(config: ConductorConfig, voice: bool) -> Self {
        let mut h = Self::with(config, voice, ScriptedRandom::default());
        h.conductor.start();
        h.conductor.advance(Duration::from_secs(4));
        assert!(h.conductor.is_ready());
        h.drain();
        h.conductor.bridge_mut().take_calls();
        h
    }

    fn send(&mut self, event: SurfaceEvent) {
        self.conductor.handle_event(event);
    }

    fn click_nav(&mut self, section: &str) {
        self.send(SurfaceEvent::NavClicked {
            section: section.to_string(),
        });
    }

    fn say(&mut self, transcript: &str) {
        self.send(SurfaceEvent::VoiceOrbClicked);
        self.send(SurfaceEvent::VoiceStarted);
        self.send(SurfaceEvent::VoiceResult {
            transcript: transcript.to_string(),
        });
        self.send(SurfaceEvent::VoiceEnded);
    }

    fn transmit(&mut self, name: &str, email: &str, message: &str) {
        self.send(SurfaceEvent::TransmitClicked {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        });
    }

    fn advance_ms(&mut self, ms: u64) {
        self.conductor.advance(Duration::from_millis(ms));
    }

    fn drain(&mut self) -> Vec<ConductorMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn active_sections(&self) -> Vec<SectionId> {
        self.conductor
            .navigation()
            .sections()
            .iter()
            .filter(|s| s.active)
            .map(|s| s.id)
            .collect()
    }
}

fn notifications(msgs: &[ConductorMessage]) -> Vec<NotificationPayload> {
    msgs.iter()
        .filter_map(|m| match m {
            ConductorMessage::EffectSpawned {
                notification: Some(n),
                ..
            } => Some(n.clone()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Boot
// =============================================================================

/// The host is initialized before the loader starts, and input is ignored
/// until the loader has held and faded.
#[test]
fn test_boot_sequence_and_loader() {
    let mut h = Harness::with(ConductorConfig::default(), true, ScriptedRandom::default());
    h.conductor.start();

    assert_eq!(
        h.conductor.bridge().calls(),
        &[
            BridgeCall::Expand,
            BridgeCall::EnableClosingConfirmation,
            BridgeCall::SetHeaderColor {
                color: "#0a0e17".to_string()
            },
            BridgeCall::SetBackgroundColor {
                color: "#0a0e17".to_string()
            },
            BridgeCall::Ready,
        ]
    );

    h.click_nav("about");
    assert_eq!(h.conductor.navigation().navigations(), 0);

    h.advance_ms(4000);
    let msgs = h.drain();
    let loader: Vec<LoaderPhase> = msgs
        .iter()
        .filter_map(|m| match m {
            ConductorMessage::Loader { phase } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        loader,
        vec![LoaderPhase::Holding, LoaderPhase::Fading, LoaderPhase::Hidden]
    );
    assert_eq!(
        msgs.last(),
        Some(&ConductorMessage::State {
            state: ConductorState::Ready
        })
    );
    assert!(h.conductor.ambient().is_running());
}

// =============================================================================
// Navigation
// =============================================================================

/// Exactly one section is active after every navigation settles.
#[test]
fn test_exactly_one_active_after_each_navigation() {
    let mut h = Harness::ready();

    for target in ["about", "skills", "skills", "portfolio", "home", "contact", "services"] {
        h.click_nav(target);
        assert!(h.active_sections().is_empty(), "transition window");
        h.advance_ms(300);
        assert_eq!(h.active_sections(), vec![SectionId::parse(target).unwrap()]);
        assert_eq!(h.conductor.navigation().selected().as_str(), target);
    }
}

/// Navigating again before a reveal fires still settles on the last target.
#[test]
fn test_rapid_navigation_settles_on_last_target() {
    let mut h = Harness::ready();

    h.click_nav("about");
    h.advance_ms(100);
    h.click_nav("skills");
    h.advance_ms(100);
    h.click_nav("contact");
    h.advance_ms(300);

    assert_eq!(h.active_sections(), vec![SectionId::Contact]);
}

/// Unknown identifiers leave the active section alone.
#[test]
fn test_invalid_section_is_a_no_op() {
    let mut h = Harness::ready();
    h.click_nav("about");
    h.advance_ms(1000);
    h.drain();

    h.click_nav("blog");
    h.click_nav("About");
    h.advance_ms(1000);

    assert_eq!(h.active_sections(), vec![SectionId::About]);
    assert!(h.drain().is_empty());
}

// =============================================================================
// Voice
// =============================================================================

/// A second start while listening keeps the same session.
#[test]
fn test_second_start_while_listening_is_a_no_op() {
    let mut h = Harness::ready();

    h.send(SurfaceEvent::VoiceOrbClicked);
    let first = h.conductor.voice().session().unwrap().id;
    h.drain();

    h.send(SurfaceEvent::VoiceOrbClicked);
    assert_eq!(h.conductor.voice().session().unwrap().id, first);
    assert!(h.drain().is_empty());
}

/// "home" matches before every later rule.
#[test]
fn test_voice_home_command() {
    let mut h = Harness::ready();
    h.click_nav("services");
    h.advance_ms(300);

    h.say("Let's go HOME please");
    h.advance_ms(300);

    assert_eq!(h.active_sections(), vec![SectionId::Home]);
    assert_eq!(
        h.conductor.voice().last_session().unwrap().transcript.as_deref(),
        Some("let's go home please")
    );
}

/// Telegram opens the messenger link and leaves navigation alone.
#[test]
fn test_voice_telegram_command_opens_link() {
    let mut h = Harness::ready();
    let navigations = h.conductor.navigation().navigations();

    h.say("show me the telegram channel");
    h.advance_ms(300);

    assert_eq!(h.conductor.navigation().navigations(), navigations);
    assert_eq!(h.active_sections(), vec![SectionId::Home]);
    assert_eq!(
        h.conductor.bridge().calls(),
        &[BridgeCall::OpenHostMessagingLink {
            url: "https://t.me/Real1editorBot".to_string()
        }]
    );
}

/// Spoken contact commands reach the host exactly as the contact orbs do.
#[test]
fn test_voice_contact_matches_contact_orbs() {
    let mut spoken = Harness::ready();
    spoken.say("send me a telegram");
    spoken.say("write an email");

    let mut clicked = Harness::ready();
    for method in ["telegram", "email"] {
        clicked.send(SurfaceEvent::ContactOrbClicked {
            method: method.to_string(),
        });
    }

    assert_eq!(spoken.conductor.bridge().calls().len(), 2);
    assert_eq!(spoken.conductor.bridge().calls(), clicked.conductor.bridge().calls());
}

/// Unmatched speech is still echoed and the indication clears after 2s.
#[test]
fn test_unmatched_utterance_is_echoed() {
    let mut h = Harness::ready();

    h.say("play some music");
    let msgs = h.drain();
    assert!(msgs.contains(&ConductorMessage::VoiceFeedback {
        text: "Command: play some music".to_string()
    }));
    assert_eq!(h.conductor.navigation().navigations(), 0);

    h.advance_ms(1999);
    assert!(!h.drain().contains(&ConductorMessage::VoiceFeedbackCleared));
    h.advance_ms(1);
    assert!(h.drain().contains(&ConductorMessage::VoiceFeedbackCleared));
}

/// Errors reset the session, notify, and clear after 3s; the user can retry.
#[test]
fn test_voice_error_recovers() {
    let mut h = Harness::ready();

    h.send(SurfaceEvent::VoiceOrbClicked);
    h.send(SurfaceEvent::VoiceError {
        reason: "network".to_string(),
    });
    let msgs = h.drain();
    assert_eq!(
        notifications(&msgs),
        vec![NotificationPayload::new(NotifyLevel::Error, ERROR_TEXT)]
    );
    assert!(!h.conductor.voice().is_listening());

    h.advance_ms(3000);
    assert!(h.drain().contains(&ConductorMessage::VoiceFeedbackCleared));

    h.send(SurfaceEvent::VoiceOrbClicked);
    assert!(h.conductor.voice().is_listening());
}

/// Without a capture capability the control is hidden for good.
#[test]
fn test_voice_unavailable_disables_control() {
    let mut config = ConductorConfig::default();
    config.ambient.enabled = false;
    let mut h = Harness::with(config, false, ScriptedRandom::default());
    h.conductor.start();
    h.advance_ms(4000);

    assert!(h
        .drain()
        .contains(&ConductorMessage::VoiceControl { available: false }));

    h.send(SurfaceEvent::VoiceOrbClicked);
    assert!(h.conductor.voice().session().is_none());
    assert!(h.drain().is_empty());
}

// =============================================================================
// Transmission
// =============================================================================

/// Two identical submits, the second after the first succeeded, are two
/// independent transmissions that each clear the form.
#[test]
fn test_two_sequential_transmissions() {
    let mut h = Harness::ready();

    for round in 1..=2 {
        h.transmit("Ada", "ada@example.com", "hello");
        assert_eq!(h.conductor.transmission().state(), TransmissionState::Pending);
        assert!(!h.conductor.transmission().is_submit_enabled());

        h.advance_ms(2000);
        let msgs = h.drain();
        assert!(msgs.contains(&ConductorMessage::FormCleared));
        assert_eq!(
            notifications(&msgs),
            vec![NotificationPayload::new(NotifyLevel::Success, SUCCESS_TEXT)]
        );
        assert_eq!(h.conductor.transmission().state(), TransmissionState::Draft);
        assert!(h.conductor.transmission().fields().name.is_empty());
        assert_eq!(h.conductor.transmission().completed(), round);
    }

    assert_eq!(h.conductor.bridge().sent_data().len(), 2);
}

/// An empty field is a validation error with no state change.
#[test]
fn test_empty_name_rejected() {
    let mut h = Harness::ready();
    h.send(SurfaceEvent::ContactFieldEdited {
        field: ContactField::Email,
        value: "a@b.com".to_string(),
    });
    h.send(SurfaceEvent::ContactFieldEdited {
        field: ContactField::Message,
        value: "hi".to_string(),
    });
    let before = h.conductor.transmission().fields().clone();

    h.transmit("", "a@b.com", "hi");

    assert_eq!(h.conductor.transmission().state(), TransmissionState::Draft);
    assert_eq!(h.conductor.transmission().fields(), &before);
    assert!(h.conductor.transmission().is_submit_enabled());
    let msgs = h.drain();
    assert_eq!(notifications(&msgs).len(), 1);
    assert_eq!(notifications(&msgs)[0].level, NotifyLevel::Error);
    assert!(!msgs.iter().any(|m| matches!(
        m,
        ConductorMessage::SubmitControl { enabled: false, .. }
    )));
}

/// A second submit while pending changes nothing.
#[test]
fn test_submit_while_pending_ignored() {
    let mut h = Harness::ready();
    h.transmit("Ada", "ada@example.com", "first");
    h.transmit("Bob", "bob@example.com", "second");
    h.advance_ms(5000);

    assert_eq!(h.conductor.transmission().completed(), 1);
    let sent: TransmissionPayload =
        serde_json::from_str(h.conductor.bridge().sent_data()[0]).unwrap();
    assert_eq!(sent.name, "Ada");
}

/// The forwarded message is cut to 100 characters.
#[test]
fn test_forwarded_message_truncated() {
    let mut h = Harness::ready();
    let long = "é".repeat(150);
    h.transmit("Ada", "ada@example.com", &long);
    h.advance_ms(2000);

    let sent: TransmissionPayload =
        serde_json::from_str(h.conductor.bridge().sent_data()[0]).unwrap();
    assert_eq!(sent.message.chars().count(), 100);
}

// =============================================================================
// Skills and contact orbs
// =============================================================================

#[test]
fn test_unknown_skill_resolves_to_default() {
    let mut h = Harness::ready();

    h.send(SurfaceEvent::SkillClicked {
        skill: "unknown-skill".to_string(),
    });

    assert_eq!(h.conductor.selected_skill(), Some(SkillId::Editing));
    assert!(matches!(
        h.drain().as_slice(),
        [ConductorMessage::SkillSelected {
            skill: SkillId::Editing,
            ..
        }]
    ));
}

#[test]
fn test_skill_selection_is_single() {
    let mut h = Harness::ready();
    h.send(SurfaceEvent::SkillClicked {
        skill: "sound".to_string(),
    });
    h.send(SurfaceEvent::SkillClicked {
        skill: "ai".to_string(),
    });
    assert_eq!(h.conductor.selected_skill(), Some(SkillId::Ai));
}

#[test]
fn test_contact_orbs_open_links() {
    let mut h = Harness::ready();
    for method in ["telegram", "email", "upwork", "carrier-pigeon"] {
        h.send(SurfaceEvent::ContactOrbClicked {
            method: method.to_string(),
        });
    }

    let links = &h.conductor.config().links;
    assert_eq!(
        h.conductor.bridge().calls(),
        &[
            BridgeCall::OpenHostMessagingLink {
                url: links.telegram.clone()
            },
            BridgeCall::OpenLink {
                url: links.email.clone()
            },
            BridgeCall::OpenLink {
                url: links.work_profile.clone()
            },
        ]
    );
}

// =============================================================================
// Effects
// =============================================================================

/// Under constant glitching, navigation and transmissions, no effect ever
/// outlives its ttl and nothing accumulates.
#[test]
fn test_no_effect_outlives_its_ttl() {
    // Every ambient roll glitches
    let mut h = Harness::with(
        ConductorConfig::default(),
        true,
        ScriptedRandom::default().with_fallback(0.99),
    );
    h.conductor.start();
    h.advance_ms(4000);

    let targets = ["about", "skills", "portfolio", "services", "contact", "home"];
    for step in 0..120u64 {
        if step % 7 == 0 {
            h.click_nav(targets[(step / 7) as usize % targets.len()]);
        }
        if step % 25 == 0 {
            h.transmit("Ada", "ada@example.com", "ping");
        }
        if step % 11 == 0 {
            h.transmit("", "", "");
        }

        h.advance_ms(250);
        let now = h.conductor.now();
        for effect in h.conductor.effects().iter() {
            assert!(
                effect.expires_at() > now,
                "{} outlived its ttl",
                effect.id
            );
        }
    }
    assert!(h.conductor.ambient().glitches() > 0);
    let spawned = h.conductor.effects().spawned_total();
    assert!(spawned > h.conductor.ambient().glitches());

    // Quiet period longer than every ttl: only ambient glitches may remain
    h.advance_ms(5000);
    assert!(h.conductor.effects().spawned_total() >= spawned);
    let lingering: Vec<EffectKind> = h.conductor.effects().iter().map(|e| e.kind).collect();
    assert!(lingering.iter().all(|k| *k == EffectKind::GlitchFlash));
    assert!(lingering.len() <= 1);
}

/// The orb pulse stops on every refresh interval and restarts 10ms later.
#[test]
fn test_orb_pulse_refresh_cycle() {
    let mut h = Harness::with(ConductorConfig::default(), true, ScriptedRandom::default());
    h.conductor.start();
    h.drain();

    let mut pulses = Vec::new();
    for _ in 0..12_000 {
        h.advance_ms(1);
        let now = h.conductor.now().as_millis();
        for msg in h.drain() {
            if let ConductorMessage::OrbPulse { running } = msg {
                pulses.push((now, running));
            }
        }
    }

    // Ambient starts with the UI at 4000ms
    assert_eq!(pulses, vec![(8000, false), (8010, true), (12_000, false)]);
}

// =============================================================================
// Configuration
// =============================================================================

/// Values from the TOML file reach the components.
#[test]
fn test_toml_config_drives_timings() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[timing]\nsection_reveal_ms = 50\ntransmission_latency_ms = 500\n").unwrap();
    file.write_all(b"[ambient]\nenabled = false\n").unwrap();
    let config = load_config_with_env(Some(file.path().to_path_buf()), |_| None).unwrap();

    let mut h = Harness::ready_with(config, true);
    h.click_nav("skills");
    h.advance_ms(50);
    assert_eq!(h.active_sections(), vec![SectionId::Skills]);

    h.transmit("Ada", "ada@example.com", "hi");
    h.advance_ms(500);
    assert_eq!(h.conductor.transmission().completed(), 1);
    assert!(!h.conductor.ambient().is_running());
}
