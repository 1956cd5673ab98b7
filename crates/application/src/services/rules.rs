//! Rule-based fallback engine
//!
//! Classifies tasks without any network call. Category is chosen by counting
//! how many of each category's keywords occur in the text; ties go to the
//! category declared first in [`CATEGORY_KEYWORDS`]. Priority comes from
//! urgency markers, high before low. Everything here is a pure function of
//! the input text.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use domain::{Category, ParsedTask, Priority, Source, SuggestionResult};

/// Maximum number of tips the rule engine hands out
pub const MAX_FALLBACK_TIPS: usize = 3;

/// Keyword table in tie-break order
///
/// Reordering entries changes which category wins a tie.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Shopping,
        &[
            "buy", "shop", "groceries", "grocery", "purchase", "order", "pick up", "store",
            "market", "mall", "supermarket",
        ],
    ),
    (
        Category::Work,
        &[
            "work", "meeting", "report", "email", "project", "deadline", "presentation",
            "client", "office", "boss", "colleague", "proposal", "standup",
        ],
    ),
    (
        Category::Health,
        &[
            "doctor", "dentist", "appointment", "gym", "exercise", "workout", "medicine",
            "medication", "pharmacy", "checkup", "therapy", "yoga", "vitamin", "prescription",
            "hospital",
        ],
    ),
    (
        Category::Learning,
        &[
            "book", "read", "study", "course", "learn", "class", "homework", "lecture",
            "tutorial", "exam", "practice",
        ],
    ),
    (
        Category::Finance,
        &[
            "pay", "bill", "bank", "budget", "taxes", "tax return", "invoice", "landlord",
            "salary", "insurance", "loan", "mortgage", "savings", "invest", "withdraw", "cash",
        ],
    ),
    (
        Category::Home,
        &[
            "clean", "laundry", "repair", "dishes", "vacuum", "garden", "fix", "cook",
            "kitchen", "furniture", "plumber", "lawn",
        ],
    ),
    (
        Category::Social,
        &[
            "call", "friend", "party", "dinner", "family", "birthday", "visit", "wedding",
            "parents", "anniversary",
        ],
    ),
    (
        Category::Travel,
        &[
            "flight", "hotel", "trip", "travel", "vacation", "airport", "passport", "luggage",
            "train ticket", "visa", "itinerary",
        ],
    ),
    (
        Category::Creative,
        &[
            "draw", "paint", "write", "design", "music", "photo", "craft", "sketch", "guitar",
            "piano", "poem", "blog",
        ],
    ),
    (
        Category::Personal,
        &[
            "personal", "myself", "journal", "meditate", "haircut", "relax", "hobby",
            "self-care", "errand",
        ],
    ),
];

/// Markers that force `high` priority
pub const HIGH_PRIORITY_MARKERS: &[&str] = &[
    "urgent",
    "asap",
    "important",
    "deadline",
    "today",
    "now",
    "critical",
    "emergency",
    "immediately",
    "priority",
];

/// Markers that give `low` priority when no high marker is present
pub const LOW_PRIORITY_MARKERS: &[&str] = &[
    "later",
    "someday",
    "maybe",
    "eventually",
    "when possible",
    "no rush",
    "whenever",
];

/// Task-specific tips, checked in order; the first matching rule wins
const TASK_SPECIFIC_TIPS: &[(&[&str], &str)] = &[
    (
        &["tomorrow", "today"],
        "This is time-sensitive, so block out time for it on your calendar",
    ),
    (
        &["finish", "complete"],
        "Review what is already done before pushing to the finish",
    ),
    (
        &["start", "begin"],
        "Sketch a short plan before you start",
    ),
    (
        &["prepare", "plan"],
        "Write a checklist of everything you will need",
    ),
];

const GENERAL_TIPS: [&str; 3] = [
    "Break the task into smaller steps",
    "Pick a specific time to work on it",
    "Decide what done looks like before you begin",
];

/// Canned tips for a category
pub const fn category_tips(category: Category) -> &'static [&'static str] {
    match category {
        Category::Shopping => &[
            "Make a list before you go",
            "Check what you already have at home",
            "Group items by store to save a trip",
        ],
        Category::Work => &[
            "Block focused time on your calendar",
            "Share progress with the people involved",
            "Clarify the expected outcome early",
        ],
        Category::Health => &[
            "Bring any relevant records or prescriptions",
            "Set a reminder the day before",
        ],
        Category::Learning => &[
            "Work in short, focused sessions",
            "Take notes you can review later",
            "Set a small goal for each session",
        ],
        Category::Finance => &[
            "Double-check amounts and due dates",
            "Keep a receipt or confirmation",
        ],
        Category::Home => &[
            "Gather the supplies you need first",
            "Tackle one room or area at a time",
        ],
        Category::Social => &[
            "Confirm the time with everyone involved",
            "Note anything you want to bring up",
        ],
        Category::Travel => &[
            "Check documents and bookings in advance",
            "Pack the essentials the day before",
            "Leave buffer time for transit",
        ],
        Category::Creative => &[
            "Set aside uninterrupted time",
            "Start with a rough draft and refine it",
        ],
        Category::Personal => &[
            "Treat it as a real appointment with yourself",
            "Keep it simple so it actually happens",
        ],
        Category::General => &GENERAL_TIPS,
    }
}

/// One automaton over every category keyword, pattern id -> category index
static CATEGORY_MATCHER: LazyLock<(AhoCorasick, Vec<usize>)> = LazyLock::new(|| {
    let mut patterns = Vec::new();
    let mut owners = Vec::new();
    for (index, (_, keywords)) in CATEGORY_KEYWORDS.iter().enumerate() {
        for keyword in *keywords {
            patterns.push(*keyword);
            owners.push(index);
        }
    }
    #[allow(clippy::expect_used)] // Infallible with valid static patterns
    let matcher = AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(&patterns)
        .expect("Failed to build category matcher");
    (matcher, owners)
});

static HIGH_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| marker_matcher(HIGH_PRIORITY_MARKERS));
static LOW_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| marker_matcher(LOW_PRIORITY_MARKERS));

fn marker_matcher(markers: &[&str]) -> AhoCorasick {
    #[allow(clippy::expect_used)] // Infallible with valid static patterns
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(markers)
        .expect("Failed to build marker matcher")
}

/// Every tip trigger, pattern id -> index into [`TASK_SPECIFIC_TIPS`]
static TIP_MATCHER: LazyLock<(AhoCorasick, Vec<usize>)> = LazyLock::new(|| {
    let mut patterns = Vec::new();
    let mut owners = Vec::new();
    for (index, (triggers, _)) in TASK_SPECIFIC_TIPS.iter().enumerate() {
        for trigger in *triggers {
            patterns.push(*trigger);
            owners.push(index);
        }
    }
    (marker_matcher(&patterns), owners)
});

/// Deterministic, network-free classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Number of distinct keywords of each category found in `text`,
    /// in table order
    pub fn category_scores(&self, text: &str) -> Vec<(Category, usize)> {
        let (matcher, owners) = &*CATEGORY_MATCHER;
        let mut seen = vec![false; owners.len()];
        for m in matcher.find_overlapping_iter(text) {
            seen[m.pattern().as_usize()] = true;
        }

        let mut counts = vec![0usize; CATEGORY_KEYWORDS.len()];
        for (pattern, hit) in seen.into_iter().enumerate() {
            if hit {
                counts[owners[pattern]] += 1;
            }
        }

        CATEGORY_KEYWORDS
            .iter()
            .zip(counts)
            .map(|((category, _), count)| (*category, count))
            .collect()
    }

    /// Highest-scoring category; earliest declared wins ties, `General`
    /// when nothing matches
    pub fn classify_category(&self, text: &str) -> Category {
        let mut best = (Category::General, 0usize);
        for (category, count) in self.category_scores(text) {
            // Strictly greater keeps the earlier category on ties
            if count > best.1 {
                best = (category, count);
            }
        }
        best.0
    }

    /// High markers win over low markers; `medium` when neither appears
    pub fn classify_priority(&self, text: &str) -> Priority {
        if HIGH_MATCHER.is_match(text) {
            Priority::High
        } else if LOW_MATCHER.is_match(text) {
            Priority::Low
        } else {
            Priority::Medium
        }
    }

    /// Canned tips for `category`, with at most one task-specific tip in
    /// front, capped at [`MAX_FALLBACK_TIPS`]
    pub fn tips(&self, category: Category, text: &str) -> Vec<String> {
        let canned = category_tips(category);
        let mut tips = Vec::with_capacity(MAX_FALLBACK_TIPS);

        // Task-specific and canned tips never overlap, so no dedup is needed
        let (matcher, owners) = &*TIP_MATCHER;
        let specific = matcher
            .find_overlapping_iter(text)
            .map(|m| owners[m.pattern().as_usize()])
            .min();
        if let Some(index) = specific {
            tips.push(TASK_SPECIFIC_TIPS[index].1.to_string());
        }

        tips.extend(canned.iter().map(|tip| (*tip).to_string()));
        tips.truncate(MAX_FALLBACK_TIPS);
        tips
    }

    /// Full suggestion for `text`
    pub fn suggest(&self, text: &str) -> SuggestionResult {
        let category = self.classify_category(text);
        SuggestionResult::new(
            category,
            self.classify_priority(text),
            self.tips(category, text),
            Source::Fallback,
        )
    }

    /// Split `text` into title and description and classify it
    ///
    /// The title runs up to the first `.`, `!`, `?` or newline. Leading
    /// terminators are skipped first. Without a terminator the whole
    /// trimmed input is the title.
    pub fn parse(&self, text: &str) -> ParsedTask {
        let (title, description) = split_title(text);
        ParsedTask::new(
            title,
            description,
            self.classify_category(text),
            Source::Fallback,
        )
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

fn split_title(text: &str) -> (String, String) {
    let body = text.trim_start_matches(|c: char| c.is_whitespace() || is_terminator(c));
    if body.is_empty() {
        return (text.trim().to_string(), String::new());
    }

    match body.find(is_terminator) {
        Some(idx) => (
            body[..idx].trim().to_string(),
            body[idx + 1..].trim().to_string(),
        ),
        None => (body.trim().to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn engine() -> RuleEngine {
        RuleEngine::new()
    }

    #[test]
    fn shopping_example() {
        let result = engine().suggest("Buy groceries and pick up dry cleaning");
        assert_eq!(result.category, Category::Shopping);
        assert_eq!(result.priority, Priority::Medium);
        assert!(!result.tips.is_empty());
        assert!(result.tips.len() <= MAX_FALLBACK_TIPS);
        assert_eq!(result.source, Source::Fallback);
    }

    #[test]
    fn health_with_urgency_example() {
        let result = engine().suggest("URGENT: book a dentist appointment today");
        assert_eq!(result.category, Category::Health);
        assert_eq!(result.priority, Priority::High);
        // "today" adds the time-sensitivity tip in front
        assert_eq!(result.tips[0], TASK_SPECIFIC_TIPS[0].1);
        assert_eq!(result.tips.len(), 3);
    }

    #[test]
    fn parse_example_pins_work_over_social() {
        let text = "Call John about the project tomorrow. Bring the slides.";
        let scores = engine().category_scores(text);
        let score = |c: Category| scores.iter().find(|(cat, _)| *cat == c).map(|(_, n)| *n);
        assert_eq!(score(Category::Work), Some(1));
        assert_eq!(score(Category::Social), Some(1));

        let task = engine().parse(text);
        assert_eq!(task.title, "Call John about the project tomorrow");
        assert_eq!(task.description, "Bring the slides.");
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.source, Source::Fallback);
    }

    #[test]
    fn tie_goes_to_earlier_category() {
        // one Learning keyword, one Travel keyword
        assert_eq!(
            engine().classify_category("read about the flight"),
            Category::Learning
        );
        // one Shopping keyword, one Creative keyword
        assert_eq!(engine().classify_category("buy paint"), Category::Shopping);
    }

    #[test]
    fn higher_count_beats_declaration_order() {
        // Shopping: buy (1); Travel: flight, hotel (2)
        assert_eq!(
            engine().classify_category("buy flight and hotel"),
            Category::Travel
        );
    }

    #[test]
    fn no_keywords_is_general_with_three_tips() {
        let result = engine().suggest("Think about things");
        assert_eq!(result.category, Category::General);
        assert_eq!(result.priority, Priority::Medium);
        assert_eq!(result.tips, GENERAL_TIPS.map(String::from).to_vec());
    }

    #[test]
    fn keyword_matching_ignores_case() {
        assert_eq!(engine().classify_category("DENTIST"), Category::Health);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        // "buy" three times still scores 1 against Health's two keywords
        assert_eq!(
            engine().classify_category("buy buy buy, doctor appointment"),
            Category::Health
        );
    }

    #[test]
    fn high_priority_beats_low() {
        assert_eq!(
            engine().classify_priority("urgent task, no rush on the details"),
            Priority::High
        );
    }

    #[test]
    fn low_priority_markers() {
        assert_eq!(
            engine().classify_priority("Clean the garage someday"),
            Priority::Low
        );
        assert_eq!(
            engine().classify_priority("Fix the shelf when possible"),
            Priority::Low
        );
    }

    #[test]
    fn default_priority_is_medium() {
        assert_eq!(engine().classify_priority("Water the plants"), Priority::Medium);
    }

    #[test]
    fn task_specific_tip_order() {
        // "finish" beats "plan" because it is checked first
        let tips = engine().tips(Category::Work, "Finish the plan");
        assert_eq!(tips[0], TASK_SPECIFIC_TIPS[1].1);

        let tips = engine().tips(Category::Work, "Begin drafting");
        assert_eq!(tips[0], TASK_SPECIFIC_TIPS[2].1);

        let tips = engine().tips(Category::Work, "Prepare slides");
        assert_eq!(tips[0], TASK_SPECIFIC_TIPS[3].1);
    }

    #[test]
    fn task_specific_tips_are_not_canned_tips() {
        for (_, tip) in TASK_SPECIFIC_TIPS {
            for category in Category::all() {
                assert!(!category_tips(category).contains(tip), "{tip} in {category}");
            }
        }
    }

    #[test]
    fn tip_triggers_fold_case_like_keywords() {
        let tips = engine().tips(Category::Work, "FINISH the report TODAY");
        assert_eq!(tips[0], TASK_SPECIFIC_TIPS[0].1);

        // Only ASCII letters fold; the Kelvin sign is not a 'k'
        let kelvin = "\u{212A}itchen";
        assert_eq!(engine().classify_category(kelvin), Category::General);
    }

    #[test]
    fn no_task_specific_tip_keeps_canned() {
        let tips = engine().tips(Category::Health, "Dentist");
        assert_eq!(tips, vec![
            "Bring any relevant records or prescriptions".to_string(),
            "Set a reminder the day before".to_string(),
        ]);
    }

    #[test]
    fn tips_never_exceed_cap() {
        for category in Category::all() {
            let tips = engine().tips(category, "start tomorrow");
            assert!(tips.len() <= MAX_FALLBACK_TIPS);
            assert!(!tips.is_empty());
        }
    }

    #[test]
    fn every_category_except_general_has_keywords_and_tips() {
        let covered: HashSet<Category> = CATEGORY_KEYWORDS.iter().map(|(c, _)| *c).collect();
        for category in Category::all() {
            let tips = category_tips(category);
            assert!((2..=3).contains(&tips.len()), "{category} tips");
            assert_eq!(covered.contains(&category), !category.is_general());
        }
    }

    #[test]
    fn keywords_are_unique_and_lowercase() {
        let mut seen = HashSet::new();
        for (_, keywords) in CATEGORY_KEYWORDS {
            for keyword in *keywords {
                assert_eq!(*keyword, keyword.to_lowercase());
                assert!(seen.insert(*keyword), "duplicate keyword {keyword}");
            }
        }
    }

    #[test]
    fn split_without_terminator_uses_whole_input() {
        let task = engine().parse("  Water the plants  ");
        assert_eq!(task.title, "Water the plants");
        assert_eq!(task.description, "");
    }

    #[test]
    fn split_skips_leading_terminators() {
        let task = engine().parse("...\nRenew passport! Check the photo rules");
        assert_eq!(task.title, "Renew passport");
        assert_eq!(task.description, "Check the photo rules");
        assert_eq!(task.category, Category::Travel);
    }

    #[test]
    fn split_on_newline_and_question_mark() {
        let task = engine().parse("Dinner with Sam?\nPick a place");
        assert_eq!(task.title, "Dinner with Sam");
        assert_eq!(task.description, "Pick a place");

        let task = engine().parse("Email the client\n\nAttach the contract.");
        assert_eq!(task.title, "Email the client");
        assert_eq!(task.description, "Attach the contract.");
    }

    #[test]
    fn split_terminators_only() {
        let task = engine().parse(" ?! ");
        assert_eq!(task.title, "?!");
        assert_eq!(task.description, "");
    }

    #[test]
    fn fallback_is_deterministic() {
        let text = "Prepare the quarterly budget report before Friday";
        let first = engine().suggest(text);
        for _ in 0..10 {
            assert_eq!(engine().suggest(text), first);
        }
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn suggest_is_total(text in "\\PC{1,200}") {
                let result = RuleEngine::new().suggest(&text);
                prop_assert!(Category::all().contains(&result.category));
                prop_assert!(Priority::all().contains(&result.priority));
                prop_assert!(!result.tips.is_empty());
                prop_assert!(result.tips.len() <= MAX_FALLBACK_TIPS);
            }

            #[test]
            fn parse_title_is_non_empty(text in "[ .!?\n]{0,3}[a-zA-Z][a-zA-Z .!?\n]{0,80}") {
                let task = RuleEngine::new().parse(&text);
                prop_assert!(!task.title.is_empty());
                prop_assert!(!task.title.contains(['.', '!', '?', '\n']));
                prop_assert_eq!(task.description.trim(), task.description.as_str());
            }
        }
    }
}
