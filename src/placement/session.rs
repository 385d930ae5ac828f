//! Per-user session state and the placement test bookkeeping.

use serde::{Deserialize, Serialize};

use super::bank::QUESTIONS_PER_TIER;
use super::tier::Tier;
use crate::store::UserRecord;

/// Correct answers out of five needed to pass a tier.
pub const PASS_THRESHOLD: usize = 4;

/// Where the user is in the onboarding conversation.
///
/// Progresses: AwaitingName → AwaitingLevelChoice → (TakingTest →) InMenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingName,
    /// `choosing_level` is set once the user said they already know their level.
    AwaitingLevelChoice { choosing_level: bool },
    TakingTest(TestState),
    InMenu,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingName => "awaiting_name",
            Self::AwaitingLevelChoice { .. } => "awaiting_level_choice",
            Self::TakingTest(_) => "taking_test",
            Self::InMenu => "in_menu",
        };
        write!(f, "{s}")
    }
}

/// What happens once all five questions of a tier are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    /// Passed below the ceiling: continue at this tier.
    Advance(Tier),
    /// Test over with this confirmed level.
    Finish(Tier),
}

/// Progress through the adaptive test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestState {
    pub current_tier: Tier,
    pub question_index: usize,
    pub correct_count: usize,
    /// Questions shown so far across all tiers. Never reset during a test.
    pub total_asked: u32,
}

impl TestState {
    /// A fresh test starting at A1.
    pub fn start() -> Self {
        Self {
            current_tier: Tier::A1,
            question_index: 0,
            correct_count: 0,
            total_asked: 0,
        }
    }

    /// Count an answer to the current question.
    pub fn record_answer(&mut self, correct: bool) {
        if correct {
            self.correct_count += 1;
        }
        self.question_index += 1;
    }

    /// All questions of the current tier have been answered.
    pub fn tier_exhausted(&self) -> bool {
        self.question_index >= QUESTIONS_PER_TIER
    }

    pub fn passed(&self) -> bool {
        self.correct_count >= PASS_THRESHOLD
    }

    /// Decide the result of a finished tier.
    ///
    /// A failed tier confirms the tier below it; failing A1 still confirms A1.
    pub fn outcome(&self) -> TierOutcome {
        if self.passed() {
            match self.current_tier.next() {
                Some(next) => TierOutcome::Advance(next),
                None => TierOutcome::Finish(self.current_tier),
            }
        } else {
            TierOutcome::Finish(self.current_tier.previous().unwrap_or(Tier::A1))
        }
    }

    /// Move on to `tier`, resetting the per-tier counters.
    pub fn advance_to(&mut self, tier: Tier) {
        self.current_tier = tier;
        self.question_index = 0;
        self.correct_count = 0;
    }

    /// Note that the current question is being shown.
    pub fn mark_asked(&mut self) {
        self.total_asked += 1;
    }
}

/// Ephemeral state of one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_level: Option<Tier>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A new onboarding session waiting for the user's name.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            phase: Phase::AwaitingName,
            confirmed_level: None,
        }
    }

    /// A session rebuilt from the durable record, parked at the menu.
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            name: record.name.clone(),
            phase: Phase::InMenu,
            confirmed_level: Some(record.level),
        }
    }

    /// The running test, if any.
    pub fn test(&self) -> Option<&TestState> {
        match &self.phase {
            Phase::TakingTest(test) => Some(test),
            _ => None,
        }
    }
}
