//! PlacementEngine — drives a session through onboarding and the adaptive test.
//!
//! The state machine itself is [`transition`], a pure function of the session and one input.
//! [`PlacementEngine`] wraps it with the session-level commands (`/start`, `/menu`,
//! `/cancel`) and writes confirmed levels through the [`LevelStore`] before the new session
//! state is committed.

use std::sync::Arc;

use tracing::{debug, info};

use super::bank::QuestionBank;
use super::prompts;
use super::session::{Phase, Session, TestState, TierOutcome};
use super::tier::Tier;
use super::types::{Effect, Input, LevelMethod, MenuAction};
use crate::error::{BankError, Result};
use crate::store::{LevelStore, UserRecord};

/// Result of feeding one input to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The session after the input. Equal to the old one when the input was rejected.
    pub session: Session,
    pub effect: Effect,
    /// Set when this step confirms a level. It must be persisted before `session` is kept.
    pub confirmed: Option<Tier>,
    /// The input failed validation and the current prompt was re-emitted.
    pub rejected: bool,
}

impl Transition {
    fn to(session: Session, effect: Effect) -> Self {
        Self {
            session,
            effect,
            confirmed: None,
            rejected: false,
        }
    }
}

/// Apply one in-session input.
///
/// Session-level commands (`Start`, `Menu`, `Cancel`) are handled by [`PlacementEngine`];
/// here they are treated like any other unexpected input.
pub fn transition(
    bank: &QuestionBank,
    session: &Session,
    input: &Input,
) -> std::result::Result<Transition, BankError> {
    let mut next = session.clone();

    match (&session.phase, input) {
        (Phase::AwaitingName, _) => {
            let name = input.raw_text().map(str::trim).unwrap_or_default();
            if name.is_empty() {
                return reprompt(bank, session, prompts::ask_name_again());
            }
            next.name = name.to_string();
            next.phase = Phase::AwaitingLevelChoice {
                choosing_level: false,
            };
            Ok(Transition::to(next, level_method_prompt(name)))
        }

        (
            Phase::AwaitingLevelChoice {
                choosing_level: false,
            },
            Input::LevelMethod(LevelMethod::KnowMyLevel),
        ) => {
            next.phase = Phase::AwaitingLevelChoice {
                choosing_level: true,
            };
            Ok(Transition::to(next, tier_prompt()))
        }

        (
            Phase::AwaitingLevelChoice {
                choosing_level: false,
            },
            Input::LevelMethod(LevelMethod::TakeTest),
        ) => {
            let mut test = TestState::start();
            let effect = ask(bank, &mut test)?.prefixed(prompts::test_intro());
            next.phase = Phase::TakingTest(test);
            Ok(Transition::to(next, effect))
        }

        (
            Phase::AwaitingLevelChoice {
                choosing_level: true,
            },
            _,
        ) => match input.raw_text().and_then(Tier::parse_label) {
            Some(level) => Ok(confirm(next, level, &prompts::level_set(level))),
            None => reprompt(bank, session, prompts::not_understood()),
        },

        (Phase::TakingTest(test), _) => match input.raw_text() {
            Some(answer) => answer_question(bank, next, test.clone(), answer.trim()),
            None => reprompt(bank, session, prompts::not_understood()),
        },

        (Phase::InMenu, Input::MenuAction(action)) => Ok(Transition::to(
            next,
            menu_prompt(session).prefixed(prompts::menu_action(*action)),
        )),

        _ => reprompt(bank, session, prompts::not_understood()),
    }
}

/// Score an answer and decide whether to ask again, move up a tier or finish.
fn answer_question(
    bank: &QuestionBank,
    mut next: Session,
    mut test: TestState,
    answer: &str,
) -> std::result::Result<Transition, BankError> {
    let question = bank.question(test.current_tier, test.question_index)?;
    if !question.has_option(answer) {
        return reprompt(bank, &next, prompts::not_understood());
    }

    let correct = question.is_correct(answer);
    test.record_answer(correct);
    debug!(
        tier = %test.current_tier,
        question_index = test.question_index,
        correct,
        "Test answer recorded"
    );

    if !test.tier_exhausted() {
        let effect = ask(bank, &mut test)?;
        next.phase = Phase::TakingTest(test);
        return Ok(Transition::to(next, effect));
    }

    match test.outcome() {
        TierOutcome::Advance(tier) => {
            let passed = test.current_tier;
            test.advance_to(tier);
            let effect = ask(bank, &mut test)?.prefixed(&prompts::tier_passed(passed, tier));
            next.phase = Phase::TakingTest(test);
            Ok(Transition::to(next, effect))
        }
        TierOutcome::Finish(level) => Ok(confirm(next, level, &prompts::test_completed(level))),
    }
}

/// Park the session in the menu with `level` confirmed.
fn confirm(mut next: Session, level: Tier, headline: &str) -> Transition {
    next.phase = Phase::InMenu;
    next.confirmed_level = Some(level);
    let effect = menu_prompt(&next).prefixed(headline);
    Transition {
        session: next,
        effect,
        confirmed: Some(level),
        rejected: false,
    }
}

fn reprompt(
    bank: &QuestionBank,
    session: &Session,
    hint: &str,
) -> std::result::Result<Transition, BankError> {
    let effect = match session.phase {
        Phase::AwaitingName => Effect::PromptNoChoices {
            text: hint.to_string(),
        },
        _ => current_prompt(bank, session)?.prefixed(hint),
    };
    Ok(Transition {
        session: session.clone(),
        effect,
        confirmed: None,
        rejected: true,
    })
}

/// The prompt the session is currently waiting on.
pub fn current_prompt(
    bank: &QuestionBank,
    session: &Session,
) -> std::result::Result<Effect, BankError> {
    Ok(match &session.phase {
        Phase::AwaitingName => Effect::PromptNoChoices {
            text: prompts::welcome(),
        },
        Phase::AwaitingLevelChoice {
            choosing_level: false,
        } => level_method_prompt(&session.name),
        Phase::AwaitingLevelChoice {
            choosing_level: true,
        } => tier_prompt(),
        Phase::TakingTest(test) => render_question(bank, test)?,
        Phase::InMenu => menu_prompt(session),
    })
}

/// Show the current question, counting it towards `total_asked`.
fn ask(bank: &QuestionBank, test: &mut TestState) -> std::result::Result<Effect, BankError> {
    test.mark_asked();
    render_question(bank, test)
}

fn render_question(bank: &QuestionBank, test: &TestState) -> std::result::Result<Effect, BankError> {
    let question = bank.question(test.current_tier, test.question_index)?;
    Ok(Effect::prompt(
        prompts::question(test.total_asked, test.current_tier, question),
        question.options.to_vec(),
    ))
}

fn level_method_prompt(name: &str) -> Effect {
    Effect::prompt(
        prompts::level_method(name),
        LevelMethod::ALL.iter().map(|m| m.label().to_string()).collect(),
    )
}

fn tier_prompt() -> Effect {
    Effect::prompt(
        prompts::choose_tier(),
        Tier::ALL.iter().map(|t| t.label().to_string()).collect(),
    )
}

fn menu_prompt(session: &Session) -> Effect {
    Effect::prompt(
        prompts::menu(&session.name, session.confirmed_level),
        MenuAction::ALL.iter().map(|a| a.label().to_string()).collect(),
    )
}

/// Coordinates sessions with the question bank and the level store.
pub struct PlacementEngine {
    bank: Arc<QuestionBank>,
    store: Arc<dyn LevelStore>,
}

impl PlacementEngine {
    pub fn new(bank: Arc<QuestionBank>, store: Arc<dyn LevelStore>) -> Self {
        Self { bank, store }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Process one input for `user_id`.
    ///
    /// `session` is only replaced once the input is fully handled. If persisting a confirmed
    /// level fails the error is returned and `session` is left as it was.
    pub async fn on_input(
        &self,
        user_id: &str,
        session: &mut Option<Session>,
        input: Input,
    ) -> Result<Effect> {
        match input {
            Input::Start => {
                let fresh = Session::new();
                let effect = current_prompt(&self.bank, &fresh)?;
                *session = Some(fresh);
                debug!(user_id, "Onboarding started");
                Ok(effect)
            }
            Input::Cancel => {
                *session = None;
                debug!(user_id, "Session cancelled");
                Ok(Effect::Terminate {
                    text: prompts::farewell(),
                })
            }
            Input::Menu => match self.store.get(user_id).await? {
                Some(record) => {
                    let restored = Session::from_record(&record);
                    let effect = menu_prompt(&restored);
                    *session = Some(restored);
                    Ok(effect)
                }
                None => {
                    *session = None;
                    debug!(user_id, "Menu requested without a stored record");
                    Ok(Effect::Terminate {
                        text: prompts::not_met(),
                    })
                }
            },
            other => {
                let Some(current) = session.as_ref() else {
                    return Ok(Effect::PromptNoChoices {
                        text: prompts::no_session(),
                    });
                };

                let step = transition(&self.bank, current, &other)?;
                if step.rejected {
                    debug!(user_id, phase = %current.phase, "Input rejected, re-prompting");
                }

                if let Some(level) = step.confirmed {
                    let record = UserRecord {
                        name: step.session.name.clone(),
                        level,
                    };
                    self.store.upsert(user_id, record).await?;
                    info!(user_id, level = %level, "Level confirmed");
                }

                *session = Some(step.session);
                Ok(step.effect)
            }
        }
    }

    /// Handle a menu button press.
    pub async fn on_menu_action(
        &self,
        user_id: &str,
        session: &mut Option<Session>,
        action: MenuAction,
    ) -> Result<Effect> {
        self.on_input(user_id, session, Input::MenuAction(action)).await
    }
}
