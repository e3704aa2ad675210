//! Substring matching of configured category labels in LLM output.

use regex::{Regex, RegexBuilder};

use super::ResolveError;

/// Finds configured category labels inside free text.
///
/// Labels are matched as literal substrings, not whole tokens; a label is
/// allowed to hit inside a longer word. The alternation is compiled once
/// per process from the configured label set.
pub struct CategoryMatcher {
    labels: Vec<String>,
    pattern: Regex,
}

impl CategoryMatcher {
    pub fn new(labels: &[String]) -> Result<Self, ResolveError> {
        let alternation = labels
            .iter()
            .map(|label| regex::escape(label))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .map_err(|e| ResolveError::LabelPattern(e.to_string()))?;

        Ok(Self {
            labels: labels.to_vec(),
            pattern,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Return the canonical configured label iff exactly one distinct label
    /// occurs in the fragment. Two different labels in the same fragment
    /// yield no unique match, no matter their order or multiplicity.
    pub fn unique_match(&self, fragment: &str) -> Option<String> {
        let found = self.distinct_matches(fragment);
        if found.len() == 1 {
            return Some(found.into_iter().next().unwrap());
        }
        tracing::warn!(
            input = %fragment,
            found = ?found,
            "category: input not matched uniquely"
        );
        None
    }

    /// All distinct canonical labels occurring in the fragment, in
    /// configured label order.
    pub fn distinct_matches(&self, fragment: &str) -> Vec<String> {
        let mut hit = vec![false; self.labels.len()];
        for m in self.pattern.find_iter(fragment) {
            if let Some(idx) = self
                .labels
                .iter()
                .position(|label| equal_ci(label, m.as_str()))
            {
                hit[idx] = true;
            }
        }
        self.labels
            .iter()
            .zip(hit)
            .filter(|(_, h)| *h)
            .map(|(label, _)| label.clone())
            .collect()
    }
}

/// Case-insensitive comparison that also handles non-ASCII letters
/// (category labels are German and may carry umlauts).
fn equal_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> CategoryMatcher {
        let labels: Vec<String> = ["Rechnung", "Vertrag", "Kontoauszug", "Unsicher"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        CategoryMatcher::new(&labels).unwrap()
    }

    #[test]
    fn single_label_is_returned_canonically() {
        assert_eq!(
            matcher().unique_match("Die Kategorie lautet: rechnung"),
            Some("Rechnung".to_string())
        );
    }

    #[test]
    fn label_matches_inside_longer_word() {
        assert_eq!(
            matcher().unique_match("Das ist ein Arbeitsvertrag."),
            Some("Vertrag".to_string())
        );
    }

    #[test]
    fn two_distinct_labels_are_ambiguous() {
        assert_eq!(matcher().unique_match("Rechnung oder Vertrag"), None);
    }

    #[test]
    fn repeated_same_label_is_still_unique() {
        assert_eq!(
            matcher().unique_match("Rechnung, ganz klar eine Rechnung"),
            Some("Rechnung".to_string())
        );
    }

    #[test]
    fn no_label_yields_none() {
        assert_eq!(matcher().unique_match("Ich bin mir nicht sicher."), None);
    }

    #[test]
    fn unsicher_is_an_ordinary_member() {
        assert_eq!(
            matcher().unique_match("Unsicher"),
            Some("Unsicher".to_string())
        );
    }
}
