//! Section Navigation
//!
//! Owns which content section is visible. Clicks and voice commands both end
//! up in [`NavigationController::navigate`], so there is exactly one place
//! that changes the active section.
//!
//! A navigation hides every section at once, marks the target's control as
//! selected, then reveals the target after a short delay so the exit effect
//! can render first. Reveals are not cancelled when the user navigates again
//! before they fire. Every reveal uses the same delay and makes its target the
//! only active section, so once all reveals have fired the last navigation
//! wins.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::effects::{EffectKind, Feedback};
use crate::messages::{ConductorMessage, Outbox};
use crate::scheduler::Deferred;

/// Top-level content sections
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    /// Landing view
    Home,
    /// Profile
    About,
    /// Skill matrix
    Skills,
    /// Work samples
    Portfolio,
    /// Offered services
    Services,
    /// Contact form and orbs
    Contact,
}

impl SectionId {
    /// All sections, in navigation order
    pub const ALL: [SectionId; 6] = [
        Self::Home,
        Self::About,
        Self::Skills,
        Self::Portfolio,
        Self::Services,
        Self::Contact,
    ];

    /// Parse a section identifier as used by the surface
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "home" => Some(Self::Home),
            "about" => Some(Self::About),
            "skills" => Some(Self::Skills),
            "portfolio" => Some(Self::Portfolio),
            "services" => Some(Self::Services),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    /// Identifier string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Skills => "skills",
            Self::Portfolio => "portfolio",
            Self::Services => "services",
            Self::Contact => "contact",
        }
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section and its display flag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Section {
    /// Identifier
    pub id: SectionId,
    /// Whether it is the visible section
    pub active: bool,
}

/// Owns the active section and the navigation selection
#[derive(Debug)]
pub struct NavigationController {
    sections: Vec<Section>,
    selected: SectionId,
    reveal_delay: Duration,
    navigations: u64,
}

impl NavigationController {
    /// Start with `initial` visible and selected
    #[must_use]
    pub fn new(initial: SectionId, reveal_delay: Duration) -> Self {
        Self {
            sections: SectionId::ALL
                .iter()
                .map(|&id| Section {
                    id,
                    active: id == initial,
                })
                .collect(),
            selected: initial,
            reveal_delay,
            navigations: 0,
        }
    }

    /// Navigate by identifier
    ///
    /// Unknown identifiers are ignored. Returns whether navigation happened.
    pub fn activate(&mut self, section_id: &str, fx: &mut Feedback<'_>) -> bool {
        match SectionId::parse(section_id) {
            Some(target) => {
                self.navigate(target, fx);
                true
            }
            None => {
                tracing::debug!(section = section_id, "Ignoring unknown section");
                false
            }
        }
    }

    /// Navigate to a known section
    pub fn navigate(&mut self, target: SectionId, fx: &mut Feedback<'_>) {
        for section in &mut self.sections {
            section.active = false;
        }
        self.selected = target;
        self.navigations += 1;

        fx.send(ConductorMessage::NavSelected { section: target });
        fx.send(ConductorMessage::SectionsDeactivated);
        fx.schedule(self.reveal_delay, Deferred::RevealSection(target));
        fx.flash(EffectKind::TransitionFlash);

        tracing::debug!(section = %target, "Navigating");
    }

    /// Reveal delay elapsed for `target`
    pub fn reveal(&mut self, target: SectionId, outbox: &Outbox) {
        for section in &mut self.sections {
            section.active = section.id == target;
        }
        outbox.send(ConductorMessage::SectionActivated { section: target });
    }

    /// Announce the initial state to a freshly initialized surface
    pub fn announce(&self, outbox: &Outbox) {
        outbox.send(ConductorMessage::NavSelected {
            section: self.selected,
        });
        if let Some(active) = self.active_section() {
            outbox.send(ConductorMessage::SectionActivated { section: active });
        }
    }

    /// The visible section, if not mid-transition
    #[must_use]
    pub fn active_section(&self) -> Option<SectionId> {
        self.sections.iter().find(|s| s.active).map(|s| s.id)
    }

    /// Number of sections flagged active
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sections.iter().filter(|s| s.active).count()
    }

    /// Whether a navigation is waiting for its reveal
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.active_count() == 0
    }

    /// Section whose navigation control is selected
    #[must_use]
    pub fn selected(&self) -> SectionId {
        self.selected
    }

    /// All sections
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Navigations performed so far
    #[must_use]
    pub fn navigations(&self) -> u64 {
        self.navigations
    }
}
