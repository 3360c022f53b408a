//! Property-based tests for medication extraction

use super::*;
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,20}( [a-z]{2,10})?"
}

fn arb_description() -> impl Strategy<Value = String> {
    "[a-z ]{1,40}"
}

fn arb_bullet() -> impl Strategy<Value = (String, String)> {
    (arb_name(), arb_description())
}

fn render(bullets: &[(String, String)]) -> String {
    bullets
        .iter()
        .map(|(name, desc)| format!("- {name}: {desc}\n"))
        .collect()
}

proptest! {
    #[test]
    fn extracts_exactly_the_section_bullets(
        preamble in "[A-Za-z ,.]{0,60}",
        bullets in prop::collection::vec(arb_bullet(), 0..8),
        trailing in prop::collection::vec(arb_bullet(), 0..5),
    ) {
        let text = format!(
            "{preamble}\nRECOMMENDED MEDICATIONS:\n{}\nUSAGE GUIDELINES:\n{}",
            render(&bullets),
            render(&trailing),
        );

        let mentions = extract_medications(&text);
        let expected: Vec<_> = bullets.iter().map(|(name, _)| name.clone()).collect();
        let actual: Vec<_> = mentions.iter().map(|m| m.name.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn no_header_means_no_mentions(text in "[A-Za-z0-9 :\\-\n]{0,300}") {
        prop_assume!(!text.to_uppercase().contains("RECOMMENDED MEDICATIONS:"));
        prop_assert!(extract_medications(&text).is_empty());
    }

    #[test]
    fn arbitrary_input_never_panics(text in "\\PC{0,400}") {
        for mention in extract_medications(&text) {
            prop_assert!(!mention.name.is_empty());
            prop_assert!(mention.name.chars().count() < MAX_NAME_LENGTH);
        }
    }

    #[test]
    fn dedupe_leaves_unique_names(names in prop::collection::vec("[A-Za-z]{1,8}", 0..20)) {
        let mentions = names.iter().map(MedicationMention::new).collect();
        let deduped = dedupe(mentions, DEFAULT_PLACEHOLDERS);

        let mut seen = std::collections::HashSet::new();
        for mention in &deduped {
            prop_assert!(seen.insert(mention.name.to_lowercase()));
        }
        prop_assert_eq!(seen.len(), names.iter().map(|n| n.to_lowercase()).collect::<std::collections::HashSet<_>>().len());
    }
}
