//! Skill detail lookup
//!
//! Static content for the skill matrix. Unknown identifiers resolve to the
//! editing entry so the detail panel always has something to show.

use serde::{Deserialize, Serialize};

/// Skill nodes in the matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    /// Video editing
    Editing,
    /// Color grading
    Color,
    /// Motion effects
    Motion,
    /// Sound design
    Sound,
    /// AI-assisted workflows
    Ai,
}

impl SkillId {
    /// Parse a skill identifier as used by the surface
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        SKILLS.iter().find(|d| d.id.as_str() == s).map(|d| d.id)
    }

    /// Identifier string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Color => "color",
            Self::Motion => "motion",
            Self::Sound => "sound",
            Self::Ai => "ai",
        }
    }
}

/// Display content for a skill
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillDetail {
    /// Which skill
    pub id: SkillId,
    /// Panel heading
    pub title: &'static str,
    /// Panel body
    pub description: &'static str,
}

/// Fallback entry for unknown identifiers
pub const DEFAULT_SKILL: SkillId = SkillId::Editing;

static SKILLS: [SkillDetail; 5] = [
    SkillDetail {
        id: SkillId::Editing,
        title: "Quantum Editing Matrix",
        description: "Manipulate the fabric of time and space within visual media. My editing protocols can reshape reality itself, allowing for seamless transitions and temporal manipulations that defy conventional physics.",
    },
    SkillDetail {
        id: SkillId::Color,
        title: "Chroma Manipulation",
        description: "Control the very essence of light and color. My algorithms can extract, enhance, and transform color spectra beyond human visual perception, creating visuals that resonate with the subconscious.",
    },
    SkillDetail {
        id: SkillId::Motion,
        title: "Temporal FX",
        description: "Bend time within your visual content. Slow down moments to extract emotional depth or accelerate sequences to create dynamic energy flows that captivate audiences.",
    },
    SkillDetail {
        id: SkillId::Sound,
        title: "Acoustic Engineering",
        description: "Sculpt soundscapes that complement and enhance visual narratives. From subtle ambient textures to powerful auditory experiences that synchronize perfectly with visual elements.",
    },
    SkillDetail {
        id: SkillId::Ai,
        title: "AI Integration",
        description: "Leverage artificial consciousness to analyze, predict, and enhance creative decisions. My neural networks can process visual data and suggest optimizations that human perception might miss.",
    },
];

/// Pure lookup from skill identifier to display content
#[derive(Clone, Copy, Debug, Default)]
pub struct SkillDetailResolver;

impl SkillDetailResolver {
    /// Detail for `skill_id`, or the editing entry if unknown
    #[must_use]
    pub fn resolve(skill_id: &str) -> &'static SkillDetail {
        SkillId::parse(skill_id).map_or_else(|| Self::detail(DEFAULT_SKILL), Self::detail)
    }

    /// Detail for a known skill
    #[must_use]
    pub fn detail(id: SkillId) -> &'static SkillDetail {
        SKILLS
            .iter()
            .find(|d| d.id == id)
            .unwrap_or(&SKILLS[0])
    }

    /// Every entry
    #[must_use]
    pub fn all() -> &'static [SkillDetail] {
        &SKILLS
    }
}
