//! Plurality-with-margin voting over repeated category observations.

use std::collections::HashMap;

/// Per-task vote tally. Created fresh for each document's categorizing
/// scan and discarded once the task resolves.
#[derive(Debug, Default)]
pub struct VoteTally {
    counts: HashMap<String, u32>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, label: &str) -> u32 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Decide the tally, checked after every recorded vote.
    ///
    /// The only observed label wins immediately. With more than one label
    /// observed, the top label wins only if its count leads the runner-up
    /// by at least `margin`; a clear majority rather than a plurality, to
    /// suppress single-vote flips from a handful of noisy LLM samples.
    pub fn winner(&self, margin: u32) -> Option<&str> {
        let mut sorted: Vec<(&str, u32)> = self
            .counts
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));

        match sorted.as_slice() {
            [] => None,
            [(label, _)] => Some(label),
            [(top, top_count), (_, second_count), ..] => {
                if top_count - second_count >= margin {
                    Some(top)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(votes: &[(&str, u32)]) -> VoteTally {
        let mut t = VoteTally::new();
        for (label, n) in votes {
            for _ in 0..*n {
                t.record(label);
            }
        }
        t
    }

    #[test]
    fn empty_tally_has_no_winner() {
        assert_eq!(VoteTally::new().winner(2), None);
    }

    #[test]
    fn sole_label_wins_immediately() {
        assert_eq!(tally(&[("Rechnung", 1)]).winner(2), Some("Rechnung"));
        assert_eq!(tally(&[("Rechnung", 5)]).winner(2), Some("Rechnung"));
    }

    #[test]
    fn margin_of_two_wins() {
        let t = tally(&[("Rechnung", 3), ("Vertrag", 1)]);
        assert_eq!(t.winner(2), Some("Rechnung"));
    }

    #[test]
    fn margin_of_one_is_inconclusive() {
        let t = tally(&[("Rechnung", 2), ("Vertrag", 1)]);
        assert_eq!(t.winner(2), None);
    }

    #[test]
    fn tie_is_inconclusive() {
        let t = tally(&[("Rechnung", 2), ("Vertrag", 2)]);
        assert_eq!(t.winner(2), None);
    }

    #[test]
    fn third_place_does_not_disturb_margin() {
        let t = tally(&[("Rechnung", 4), ("Vertrag", 2), ("Brief", 1)]);
        assert_eq!(t.winner(2), Some("Rechnung"));
    }

    #[test]
    fn first_recorded_vote_already_decides() {
        let mut t = VoteTally::new();
        t.record("Rechnung");
        assert_eq!(t.winner(2), Some("Rechnung"));
    }
}
