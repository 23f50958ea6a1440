use crate::constants::{CONCEPT_PLACEHOLDER, COUNT_PLACEHOLDER};

/// Fill the `{count}` and `{concept}` placeholders of a prompt template
///
/// Every occurrence is replaced. Nothing else is interpreted, so a template
/// without placeholders comes back unchanged.
pub fn render(template: &str, count: u32, concept: &str) -> String {
    template
        .replace(COUNT_PLACEHOLDER, &count.to_string())
        .replace(CONCEPT_PLACEHOLDER, concept)
}
