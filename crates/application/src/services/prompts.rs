//! Prompt construction for remote inference
//!
//! Prompts are pure functions of their inputs: identical requests always
//! produce byte-identical prompts, which keeps the response cache honest.

use std::fmt::Write as _;
use std::sync::LazyLock;

use domain::{Category, Priority, SuggestionRequest};

/// What the model is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Category, priority and tips
    Suggest,
    /// Title, description and category
    Parse,
}

impl PromptMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Suggest => "suggest",
            Self::Parse => "parse",
        }
    }
}

fn category_list() -> String {
    Category::all()
        .iter()
        .map(|category| category.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn priority_list() -> String {
    Priority::all()
        .iter()
        .map(|priority| priority.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

static SUGGEST_SYSTEM_PROMPT: LazyLock<String> = LazyLock::new(|| {
    format!(
        "You are a task organization assistant. Classify the user's task and \
         suggest how to approach it.\n\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"category\": \"<category>\", \"priority\": \"<priority>\", \"tips\": [\"<tip>\", ...]}}\n\n\
         Allowed categories: {}.\n\
         Allowed priorities: {}.\n\
         Give between 1 and 3 short, actionable tips.",
        category_list(),
        priority_list()
    )
});

static PARSE_SYSTEM_PROMPT: LazyLock<String> = LazyLock::new(|| {
    format!(
        "You extract structured tasks from natural language.\n\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"title\": \"<short title>\", \"description\": \"<details or empty string>\", \
         \"category\": \"<category>\"}}\n\n\
         Allowed categories: {}.\n\
         Keep the title under ten words.",
        category_list()
    )
});

/// System prompt for `mode`
pub fn system_prompt(mode: PromptMode) -> &'static str {
    match mode {
        PromptMode::Suggest => SUGGEST_SYSTEM_PROMPT.as_str(),
        PromptMode::Parse => PARSE_SYSTEM_PROMPT.as_str(),
    }
}

/// User prompt carrying the task itself
pub fn user_prompt(mode: PromptMode, request: &SuggestionRequest) -> String {
    let mut prompt = match mode {
        PromptMode::Suggest => format!("Task: {}", request.text().trim()),
        PromptMode::Parse => format!("Input: {}", request.text().trim()),
    };
    if let Some(description) = request.description() {
        let _ = write!(prompt, "\nDetails: {}", description.trim());
    }
    if let Some(due) = request.due_date() {
        let _ = write!(prompt, "\nDue: {}", due.format("%Y-%m-%d"));
    }
    prompt
}
