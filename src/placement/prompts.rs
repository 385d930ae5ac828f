//! User-facing conversation texts.

use super::bank::Question;
use super::tier::Tier;
use super::types::MenuAction;

pub fn welcome() -> String {
    "Hey there! 👋 Welcome to *MoraTalk*!\n\n\
     I'm your personal language buddy 🚀\n\
     Together we'll take your English to the max!\n\n\
     First things first, how should I call you? 😊"
        .to_string()
}

pub fn ask_name_again() -> &'static str {
    "I didn't catch a name there. Just type what I should call you 🙂"
}

pub fn level_method(name: &str) -> String {
    format!(
        "Nice to meet you, {name}! 🎉\n\n\
         So, what's your English level? 🤔\n\n\
         If you already know it (A1, A2, B1, B2, C1), pick the first button.\n\
         Not sure? No worries! Take a short test and I'll figure it out 😉"
    )
}

pub fn choose_tier() -> &'static str {
    "Perfect! 👌 Pick your level:"
}

pub fn test_intro() -> &'static str {
    "Great! Let's check your skills! 💪\n\n\
     The test has 25 questions at most.\n\
     We start at level A1. Here we go! 🚀"
}

pub fn question(number: u32, tier: Tier, question: &Question) -> String {
    format!(
        "*Question {number}* (Level {tier}):\n\n{}\n\nChoose the correct answer:",
        question.prompt
    )
}

pub fn tier_passed(passed: Tier, next: Tier) -> String {
    format!("Great job! 🎉 You passed level {passed}!\nLet's move to {next}! 💪")
}

pub fn test_completed(level: Tier) -> String {
    format!(
        "Test completed! 🎊\n\n\
         Your level: *{level}*\n\n\
         Amazing work! 💫 Your personal learning plan is ready."
    )
}

pub fn level_set(level: Tier) -> String {
    format!(
        "Awesome! ✨\n\n\
         Your personal learning plan for level *{level}* is ready!\n\
         Get ready to level up your English game! 🎯"
    )
}

pub fn menu(name: &str, level: Option<Tier>) -> String {
    let name = if name.is_empty() { "Friend" } else { name };
    let level = level.map_or_else(|| "Unknown".to_string(), |l| l.to_string());
    format!(
        "Hey {name}! 👋\n\n\
         Your current level: *{level}*\n\n\
         What do you want to do today? 🤔"
    )
}

pub fn menu_action(action: MenuAction) -> &'static str {
    match action {
        MenuAction::StartLesson => {
            "🎓 *Start a lesson*\n\n\
             Great choice! Lessons are still in the works... Stay tuned! 🚀"
        }
        MenuAction::Vocabulary => {
            "📖 *Vocabulary training*\n\n\
             Time to expand your word bank! 📚 This one is coming soon! ✨"
        }
        MenuAction::Premium => {
            "✨ *Premium functions*\n\n\
             Unlock exclusive features! 🌟\n\
             • Unlimited lessons\n\
             • Personal AI tutor\n\
             • Speaking practice sessions\n\
             • Certificates and more!\n\n\
             Contact us for details! 💎"
        }
    }
}

pub fn not_understood() -> &'static str {
    "Hmm, I didn't get that 🤔 Please use one of the buttons."
}

pub fn farewell() -> String {
    "See you later! 👋\nCome back soon! Use /start to begin again.".to_string()
}

pub fn not_met() -> String {
    "Oops! 😅 Looks like we haven't met yet.\nLet's start from the beginning! Use /start"
        .to_string()
}

pub fn no_session() -> String {
    "Use /start to begin, or /menu if we've already met 🙂".to_string()
}

pub fn save_failed() -> &'static str {
    "Sorry, something went wrong on my side while saving your level 😔 Please send that again in a moment."
}

pub fn load_failed() -> &'static str {
    "Sorry, I couldn't look up your saved profile right now 😔 Please try /menu again in a moment."
}

pub fn internal_error() -> &'static str {
    "Sorry, something went wrong on my side 😔 Use /start to try again."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_header_has_number_and_tier() {
        let q = Question::new("My name ___ Anna.", ["is", "are", "am", "be"], 0);
        let text = question(7, Tier::A2, &q);
        assert!(text.contains("Question 7"));
        assert!(text.contains("Level A2"));
        assert!(text.contains("My name ___ Anna."));
    }

    #[test]
    fn menu_falls_back_for_missing_fields() {
        let text = menu("", None);
        assert!(text.contains("Hey Friend!"));
        assert!(text.contains("Unknown"));

        let text = menu("Anna", Some(Tier::B2));
        assert!(text.contains("Hey Anna!"));
        assert!(text.contains("*B2*"));
    }

    #[test]
    fn level_method_greets_by_name() {
        assert!(level_method("Bob").contains("Nice to meet you, Bob!"));
    }
}
