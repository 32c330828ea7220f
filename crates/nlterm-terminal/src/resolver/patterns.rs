//! Deterministic phrase-to-command rules.
//!
//! [`RULES`] is evaluated top to bottom and the first rule that fires wins.
//! A rule fires when its trigger matches and it can produce a target, either
//! from its extractor or from its default. Rules without a default simply
//! pass when extraction comes back empty.
//!
//! Trigger keywords match anywhere in the lower-cased line, so `listing`
//! fires the list rule and `folders` the folder rules. Target extraction
//! works on whole words.

const DELETE_VERBS: &[&str] = &["delete", "remove", "del"];
const CREATE_VERBS: &[&str] = &["create", "make"];
const DIR_NOUNS: &[&str] = &["folder", "directory"];
const NAMING: &[&str] = &["named", "called"];
const SPLIT_WORDS: &[&str] = &["to", "in"];

/// Words that never name a deletion target.
const DELETE_STOP: &[&str] = &["delete", "remove", "del", "file", "the"];
const ARTICLE_STOP: &[&str] = &["the", "a", "an", "file", "named", "called"];

/// A tokenized natural-language line.
#[derive(Debug)]
pub struct Utterance<'a> {
    original: Vec<&'a str>,
    lower: Vec<String>,
    /// The whole line, lower-cased.
    text: String,
}

impl<'a> Utterance<'a> {
    pub fn new(line: &'a str) -> Self {
        let original: Vec<&str> = line.split_whitespace().collect();
        let lower: Vec<String> = original
            .iter()
            .map(|w| {
                w.to_lowercase()
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_string()
            })
            .collect();
        Self {
            original,
            lower,
            text: line.to_lowercase(),
        }
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Whether any of `keys` occurs anywhere in the line.
    pub fn mentions(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.text.contains(k))
    }

    fn index_of(&self, keys: &[&str]) -> Option<usize> {
        self.lower.iter().position(|w| keys.contains(&w.as_str()))
    }

    /// The cleaned word after the first of `keys` whose successor is not in
    /// `skip`.
    pub fn word_after(&self, keys: &[&str], skip: &[&str]) -> Option<String> {
        self.lower.iter().enumerate().find_map(|(i, w)| {
            if !keys.contains(&w.as_str()) {
                return None;
            }
            let next = self.original.get(i + 1).map(|n| clean(n))?;
            if next.is_empty() || skip.contains(&next.to_lowercase().as_str()) {
                None
            } else {
                Some(next)
            }
        })
    }

    /// The first cleaned word that looks like a file name (`name.ext`).
    pub fn first_dotted(&self, exclude: &[&str]) -> Option<String> {
        self.original.iter().map(|w| clean(w)).find(|w| {
            w.contains('.') && !w.starts_with('.') && !exclude.contains(&w.to_lowercase().as_str())
        })
    }
}

/// Strip surrounding quotes and trailing sentence punctuation.
fn clean(word: &str) -> String {
    word.trim_matches(|c| c == '"' || c == '\'')
        .trim_end_matches(['?', '!', ',', ';', '.'])
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

/// Quote an argument so the tokenizer reads it back as one token.
fn quote_arg(arg: &str) -> String {
    let needs = arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>'));
    if !needs {
        arg.to_string()
    } else if !arg.contains('"') {
        format!("\"{arg}\"")
    } else if !arg.contains('\'') {
        format!("'{arg}'")
    } else {
        format!("\"{}\"", arg.replace('"', ""))
    }
}

/// One entry of the rule table.
pub struct PatternRule {
    pub name: &'static str,
    trigger: fn(&Utterance<'_>) -> bool,
    extract: Option<fn(&Utterance<'_>) -> Option<String>>,
    default: Option<&'static str>,
    /// Command text; `{}` is replaced by the target.
    template: &'static str,
}

impl PatternRule {
    /// The command this rule produces for `u`, if it fires.
    pub fn apply(&self, u: &Utterance<'_>) -> Option<String> {
        if !(self.trigger)(u) {
            return None;
        }
        let Some(extract) = self.extract else {
            return Some(self.template.to_string());
        };
        let target = extract(u)
            .filter(|t| !t.is_empty())
            .or_else(|| self.default.map(str::to_string))?;
        Some(self.template.replace("{}", &target))
    }
}

/// The rule table, highest priority first.
pub static RULES: &[PatternRule] = &[
    PatternRule {
        name: "direct-delete",
        trigger: |u| is_direct(u, DELETE_VERBS),
        extract: Some(second_word),
        default: None,
        template: "rm {}",
    },
    PatternRule {
        name: "direct-create",
        trigger: |u| is_direct(u, CREATE_VERBS),
        extract: Some(second_word),
        default: None,
        template: "touch {}",
    },
    PatternRule {
        name: "direct-mkdir",
        trigger: |u| is_direct(u, &["mkdir"]),
        extract: Some(second_word),
        default: None,
        template: "mkdir {}",
    },
    PatternRule {
        name: "direct-rmdir",
        trigger: |u| is_direct(u, &["rmdir"]),
        extract: Some(second_word),
        default: None,
        template: "rmdir {}",
    },
    PatternRule {
        name: "count",
        trigger: |u| u.mentions(&["count", "how many", "number of files", "files count"]),
        extract: None,
        default: None,
        template: "count",
    },
    PatternRule {
        name: "delete-folder",
        trigger: |u| u.mentions(DELETE_VERBS) && u.mentions(DIR_NOUNS),
        extract: Some(folder_name),
        default: Some("temp"),
        template: "rmdir {}",
    },
    PatternRule {
        name: "delete-file",
        trigger: |u| u.mentions(DELETE_VERBS),
        extract: Some(deletion_target),
        default: Some("temp.txt"),
        template: "rm {}",
    },
    PatternRule {
        name: "create-file",
        trigger: |u| u.mentions(CREATE_VERBS) && u.mentions(&["file"]),
        extract: Some(new_file_name),
        default: Some("newfile.txt"),
        template: "touch {}",
    },
    PatternRule {
        name: "create-folder",
        trigger: |u| u.mentions(CREATE_VERBS) && u.mentions(DIR_NOUNS),
        extract: Some(folder_name),
        default: Some("newfolder"),
        template: "mkdir {}",
    },
    PatternRule {
        name: "write-content",
        trigger: is_write,
        extract: Some(write_args),
        default: None,
        template: "echo {}",
    },
    PatternRule {
        name: "write-empty",
        trigger: is_write,
        extract: Some(write_target),
        default: None,
        template: "touch {}",
    },
    PatternRule {
        name: "list",
        trigger: |u| {
            u.mentions(&[
                "show",
                "list",
                "contents",
                "what files",
                "see files",
                "display files",
                "what's here",
                "what is here",
            ])
        },
        extract: None,
        default: None,
        template: "ls",
    },
];

/// Map a sentence to a command string, or `None` if no rule fires.
pub fn resolve(line: &str) -> Option<String> {
    let u = Utterance::new(line);
    if u.is_empty() {
        return None;
    }
    RULES.iter().find_map(|rule| {
        let command = rule.apply(&u)?;
        log::debug!("rule '{}' resolved '{line}' to '{command}'", rule.name);
        Some(command)
    })
}

// ----- triggers -----

fn is_direct(u: &Utterance<'_>, verbs: &[&str]) -> bool {
    u.len() == 2 && verbs.contains(&u.original[0].to_lowercase().as_str())
}

fn is_write(u: &Utterance<'_>) -> bool {
    u.mentions(&["write"]) && u.mentions(SPLIT_WORDS)
}

// ----- extractors -----

fn second_word(u: &Utterance<'_>) -> Option<String> {
    u.original
        .get(1)
        .map(|w| clean(w))
        .filter(|w| !w.is_empty())
        .map(|w| quote_arg(&w))
}

fn folder_name(u: &Utterance<'_>) -> Option<String> {
    u.word_after(NAMING, &[])
        .or_else(|| u.word_after(DIR_NOUNS, NAMING))
        .map(|n| quote_arg(&n))
}

fn deletion_target(u: &Utterance<'_>) -> Option<String> {
    u.first_dotted(DELETE_STOP)
        .or_else(|| u.word_after(NAMING, &[]))
        .or_else(|| u.word_after(&["file"], NAMING))
        .or_else(|| u.word_after(DELETE_VERBS, ARTICLE_STOP))
        .map(|n| quote_arg(&n))
}

fn new_file_name(u: &Utterance<'_>) -> Option<String> {
    let name = u
        .word_after(NAMING, &[])
        .or_else(|| u.word_after(&["file"], NAMING))
        .or_else(|| u.first_dotted(&[]))?;
    let name = if name.contains('.') {
        name
    } else {
        format!("{name}{}", extension_hint(u))
    };
    Some(quote_arg(&name))
}

fn extension_hint(u: &Utterance<'_>) -> &'static str {
    if u.mentions(&["python"]) {
        ".py"
    } else if u.mentions(&["txt", "text"]) {
        ".txt"
    } else if u.mentions(&["html"]) {
        ".html"
    } else if u.mentions(&["css"]) {
        ".css"
    } else if u.mentions(&["js", "javascript"]) {
        ".js"
    } else {
        ".txt"
    }
}

/// Index of the first `to`/`in`, which separates content from file name.
fn split_index(u: &Utterance<'_>) -> Option<usize> {
    u.index_of(SPLIT_WORDS)
}

fn write_target(u: &Utterance<'_>) -> Option<String> {
    split_index(u)
        .and_then(|i| u.original.get(i + 1))
        .map(|w| clean(w))
        .filter(|w| !w.is_empty())
        .or_else(|| u.first_dotted(&[]))
        .map(|n| quote_arg(&n))
}

fn write_content(u: &Utterance<'_>) -> String {
    let (Some(start), Some(end)) = (u.index_of(&["write"]), split_index(u)) else {
        return String::new();
    };
    if end <= start + 1 {
        return String::new();
    }
    u.original[start + 1..end]
        .join(" ")
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

/// `<content> > <file>`, only when there is content to write.
fn write_args(u: &Utterance<'_>) -> Option<String> {
    let content = write_content(u);
    if content.is_empty() {
        return None;
    }
    let file = write_target(u)?;
    let content = if content.contains(['"', '\'', '>']) {
        quote_arg(&content)
    } else {
        content
    };
    Some(format!("{content} > {file}"))
}
