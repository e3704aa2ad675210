//! Final (filename, category) assembly with fallback policy.

use rand::Rng;

use super::types::{FinalResult, ResolutionOutcome};

/// Designated fallback category. An ordinary member of the configured
/// label set, not a sentinel outside it.
pub const FALLBACK_CATEGORY: &str = "Unsicher";

/// Combine the two task outcomes and the detected name fragment.
///
/// An unresolved filename always implies an uncertain category: the random
/// fallback name forces "Unsicher" even when categorizing independently
/// resolved. A non-empty name fragment is prefixed with an underscore.
pub fn assemble(
    naming: &ResolutionOutcome,
    categorizing: &ResolutionOutcome,
    name_fragment: &str,
) -> FinalResult {
    let mut category = categorizing
        .resolved()
        .unwrap_or(FALLBACK_CATEGORY)
        .to_string();

    let mut filename = match naming.resolved() {
        Some(name) => name.to_string(),
        None => {
            category = FALLBACK_CATEGORY.to_string();
            let suffix: u32 = rand::thread_rng().gen_range(1..=10_000_000);
            format!("Unsicher_{suffix}.pdf")
        }
    };

    if !name_fragment.is_empty() {
        filename = format!("{name_fragment}_{filename}");
    }

    FinalResult { filename, category }
}
