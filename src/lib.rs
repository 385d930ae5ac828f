//! MoraTalk — language-learning onboarding bot.
//!
//! Greets a new user, learns their name, and places them on the A1–C1 scale either by
//! asking directly or through an adaptive multiple-choice test. The confirmed level is
//! kept in a JSON file so returning users go straight to the menu.

pub mod bot;
pub mod channels;
pub mod config;
pub mod error;
pub mod placement;
pub mod store;
