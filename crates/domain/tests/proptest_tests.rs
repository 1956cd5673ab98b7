//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{Category, DomainError, MAX_TIPS, Priority, Source, SuggestionRequest, SuggestionResult};
use proptest::prelude::*;

// ============================================================================
// SuggestionRequest Property Tests
// ============================================================================

mod suggestion_request_tests {
    use super::*;

    proptest! {
        #[test]
        fn whitespace_only_text_rejected(text in "[ \t\r\n]{0,20}") {
            prop_assert_eq!(SuggestionRequest::new(text), Err(DomainError::EmptyTaskText));
        }

        #[test]
        fn text_with_visible_char_accepted(
            prefix in "[ \t]{0,5}",
            body in "[a-zA-Z0-9!?.,]{1,40}",
        ) {
            let text = format!("{prefix}{body}");
            let request = SuggestionRequest::new(text.clone());
            prop_assert!(request.is_ok());
            let request = request.unwrap();
            prop_assert_eq!(request.text(), text.as_str());
        }
    }
}

// ============================================================================
// Category / Priority Property Tests
// ============================================================================

mod classification_tests {
    use super::*;

    proptest! {
        #[test]
        fn category_parse_ignores_case(index in 0usize..11, upper in any::<bool>()) {
            let category = Category::all()[index];
            let label = if upper {
                category.label().to_uppercase()
            } else {
                category.label().to_lowercase()
            };
            prop_assert_eq!(label.parse::<Category>().unwrap(), category);
        }

        #[test]
        fn arbitrary_strings_never_panic_category(s in "\\PC{0,30}") {
            if let Ok(category) = s.parse::<Category>() {
                prop_assert!(Category::all().contains(&category));
            }
        }

        #[test]
        fn arbitrary_strings_never_panic_priority(s in "\\PC{0,30}") {
            if let Ok(priority) = s.parse::<Priority>() {
                prop_assert!(Priority::all().contains(&priority));
            }
        }
    }
}

// ============================================================================
// SuggestionResult Property Tests
// ============================================================================

mod suggestion_result_tests {
    use super::*;

    proptest! {
        #[test]
        fn tips_never_exceed_cap(tips in prop::collection::vec("[a-z ]{1,20}", 0..12)) {
            let expected = tips.len().min(MAX_TIPS);
            let result = SuggestionResult::new(
                Category::General,
                Priority::Medium,
                tips.clone(),
                Source::Model,
            );
            prop_assert_eq!(result.tips.len(), expected);
            prop_assert_eq!(&result.tips[..], &tips[..expected]);
        }
    }
}
