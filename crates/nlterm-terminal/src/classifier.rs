//! Command-versus-sentence classification.
//!
//! A line whose first word names a builtin is always a command. Anything
//! else is treated as natural language when it contains one of the keyword
//! fragments below, or when it is longer than two words and uses a common
//! function word. The heuristic is approximate on purpose; it only decides
//! whether the resolver gets a look at the line.

use crate::interpreter::CommandRegistry;

/// Question words.
const INTERROGATIVES: &[&str] = &["how", "what", "where", "when", "why", "who", "which"];

/// Politeness and intent phrases.
const INTENT_PHRASES: &[&str] = &[
    "can you", "could you", "please", "i want", "i need", "show me", "tell me", "give me",
    "help me", "find me",
];

const ACTION_VERBS: &[&str] = &[
    "create", "make", "build", "generate", "add", "remove", "delete", "count", "list", "display",
    "print", "open", "close",
];

const DOMAIN_NOUNS: &[&str] = &["files", "folders", "directories", "project", "items"];

/// Words whose presence marks a longer line as prose.
const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "in", "on", "at", "to", "for", "of", "with",
];

/// How the dispatcher should treat a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Blank line.
    Empty,
    /// First word is a registered builtin.
    Builtin,
    /// Route through the natural-language resolver.
    NaturalLanguage,
    /// Neither: report "command not found" (or hand to the system shell).
    UnknownCommand,
}

/// Keyword-driven line classifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a raw input line.
    pub fn classify(&self, line: &str, registry: &CommandRegistry) -> Intent {
        let Some(first) = line.split_whitespace().next() else {
            return Intent::Empty;
        };
        if registry.contains(first) {
            log::debug!("'{first}' is a builtin");
            return Intent::Builtin;
        }
        if looks_like_prose(line) {
            log::debug!("classified as natural language: {line}");
            Intent::NaturalLanguage
        } else {
            Intent::UnknownCommand
        }
    }

    /// Whether the line goes to the natural-language resolver.
    pub fn is_natural_language(&self, line: &str, registry: &CommandRegistry) -> bool {
        self.classify(line, registry) == Intent::NaturalLanguage
    }
}

/// Keyword fragments match anywhere in the lower-cased line, so `counts`
/// and `listing` trigger on `count` and `list`.
fn looks_like_prose(line: &str) -> bool {
    let lower = line.to_lowercase();
    let keyword = INTERROGATIVES
        .iter()
        .chain(INTENT_PHRASES)
        .chain(ACTION_VERBS)
        .chain(DOMAIN_NOUNS)
        .any(|k| lower.contains(k));
    if keyword {
        return true;
    }
    let words: Vec<&str> = lower.split_whitespace().collect();
    words.len() > 2 && words.iter().any(|w| FUNCTION_WORDS.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::register_builtins;
    use proptest::prelude::*;

    fn registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        reg
    }

    #[test]
    fn builtin_first_word_is_never_prose() {
        let reg = registry();
        let c = IntentClassifier::new();
        assert_eq!(c.classify("ls please show me", &reg), Intent::Builtin);
        assert_eq!(c.classify("LS -l", &reg), Intent::Builtin);
        assert_eq!(c.classify("count how many files", &reg), Intent::Builtin);
        assert!(!c.is_natural_language("echo what is the time", &reg));
    }

    #[test]
    fn keywords_mark_prose() {
        let reg = registry();
        let c = IntentClassifier::new();
        for line in [
            "how many files are here",
            "delete old.txt",
            "create a file called test.py",
            "make a folder named project",
            "Please tidy up",
            "show me the files",
            "where am I",
        ] {
            assert_eq!(c.classify(line, &reg), Intent::NaturalLanguage, "{line}");
        }
    }

    #[test]
    fn function_word_heuristic_needs_three_words() {
        let reg = registry();
        let c = IntentClassifier::new();
        assert_eq!(c.classify("go to bed", &reg), Intent::NaturalLanguage);
        assert_eq!(c.classify("go to", &reg), Intent::UnknownCommand);
        assert_eq!(c.classify("git commit amend", &reg), Intent::UnknownCommand);
    }

    #[test]
    fn blank_line_is_empty() {
        let reg = registry();
        assert_eq!(IntentClassifier::new().classify("   ", &reg), Intent::Empty);
    }

    #[test]
    fn unknown_single_word() {
        let reg = registry();
        assert_eq!(
            IntentClassifier::new().classify("frobnicate", &reg),
            Intent::UnknownCommand
        );
    }

    proptest! {
        #[test]
        fn builtin_prefix_always_wins(
            name in prop::sample::select(vec!["pwd", "ls", "dir", "cd", "mkdir", "rmdir", "rm", "del",
                "touch", "cat", "echo", "cp", "mv", "count", "history", "help", "clear"]),
            tail in "[a-z ]{0,40}",
        ) {
            let reg = registry();
            let line = format!("{name} {tail}");
            prop_assert_eq!(IntentClassifier::new().classify(&line, &reg), Intent::Builtin);
        }
    }
}
