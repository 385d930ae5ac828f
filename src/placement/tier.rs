//! Proficiency tiers, ordered from A1 to C1.

use serde::{Deserialize, Serialize};

/// A CEFR proficiency tier.
///
/// The derive order is the promotion order: A1 < A2 < B1 < B2 < C1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    A1,
    A2,
    B1,
    B2,
    C1,
}

impl Tier {
    /// Every tier, lowest first.
    pub const ALL: [Tier; 5] = [Tier::A1, Tier::A2, Tier::B1, Tier::B2, Tier::C1];

    /// The tier a passed test moves up to. `None` at the ceiling.
    pub fn next(&self) -> Option<Tier> {
        use Tier::*;
        match self {
            A1 => Some(A2),
            A2 => Some(B1),
            B1 => Some(B2),
            B2 => Some(C1),
            C1 => None,
        }
    }

    /// The tier below this one. `None` at the floor.
    pub fn previous(&self) -> Option<Tier> {
        use Tier::*;
        match self {
            A1 => None,
            A2 => Some(A1),
            B1 => Some(A2),
            B2 => Some(B1),
            C1 => Some(B2),
        }
    }

    /// Short code, e.g. `"B2"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
        }
    }

    /// Button label shown when the user picks a level directly.
    pub fn label(&self) -> &'static str {
        match self {
            Self::A1 => "A1 - Beginner",
            Self::A2 => "A2 - Elementary",
            Self::B1 => "B1 - Intermediate",
            Self::B2 => "B2 - Upper-Intermediate",
            Self::C1 => "C1 - Advanced",
        }
    }

    /// Parse a tier from a button label or a bare code.
    ///
    /// Accepts the full label (`"B2 - Upper-Intermediate"`) or any text whose first
    /// whitespace-separated token is a tier code (`"b2"`, `"B2 please"`).
    pub fn parse_label(text: &str) -> Option<Tier> {
        let trimmed = text.trim();
        if let Some(tier) = Self::ALL.iter().find(|t| t.label() == trimmed) {
            return Some(*tier);
        }
        let token = trimmed.split_whitespace().next()?;
        Self::ALL
            .iter()
            .find(|t| t.code().eq_ignore_ascii_case(token))
            .copied()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
