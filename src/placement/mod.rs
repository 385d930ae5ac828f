//! Placement — onboarding conversation and adaptive level test.
//!
//! A session moves from asking the user's name, through either a direct level pick or
//! a tiered multiple-choice test, to a confirmed level that is written to the level store.
//! Each tier asks five questions; four correct answers move the user up a tier, fewer
//! ends the test at the last tier passed.

pub mod bank;
pub mod engine;
pub mod prompts;
pub mod session;
pub mod tier;
pub mod types;

pub use bank::{Question, QuestionBank};
pub use engine::{PlacementEngine, Transition, current_prompt, transition};
pub use session::{Phase, Session, TestState, TierOutcome};
pub use tier::Tier;
pub use types::{Effect, Input, LevelMethod, MenuAction};
