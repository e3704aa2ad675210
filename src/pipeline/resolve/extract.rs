//! Lexical extraction of a filename-shaped candidate from LLM output.

use regex::Regex;

/// Pull the first filename-shaped substring out of free text.
///
/// The match is returned verbatim, including any captured quote characters
/// and surrounding whitespace; cleanup is the normalizer's job. Purely
/// lexical; no interpretation of meaning.
pub fn find_candidate(text: &str) -> Option<String> {
    // Optional quote, a run without spaces/quotes/brackets, literal ".pdf".
    let pattern = Regex::new(r#"["']?\s*([^"'>\s]*\.pdf)\s*["']?"#).unwrap();

    match pattern.find(text) {
        Some(m) => Some(m.as_str().to_string()),
        None => {
            tracing::warn!(input = %text, "filename: input not matched");
            None
        }
    }
}

/// Structural validation of a raw candidate, applied before normalization.
///
/// Rejects absent or degenerate matches (shorter than `min_len`) and
/// candidates with embedded dots; splitting on "." must yield exactly a
/// stem and an extension, which keeps dates and abbreviations out of the
/// final name.
pub fn is_valid(candidate: Option<&str>, min_len: usize) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    if candidate.chars().count() < min_len {
        return false;
    }
    candidate.split('.').count() == 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_plain_filename() {
        let text = "Der Dateiname lautet Rechnung_Telekom_2024.pdf danke";
        assert_eq!(
            find_candidate(text).as_deref(),
            Some(" Rechnung_Telekom_2024.pdf ")
        );
    }

    #[test]
    fn finds_quoted_filename_with_quotes_kept() {
        let candidate = find_candidate(r#"Hier: "Vertrag_MusterGmbH.pdf""#).unwrap();
        assert!(candidate.contains("Vertrag_MusterGmbH.pdf"));
        assert!(candidate.starts_with('"'));
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(find_candidate("Ich kann das Dokument nicht benennen."), None);
    }

    #[test]
    fn extension_is_case_sensitive() {
        assert_eq!(find_candidate("Rechnung_Telekom_2024.PDF"), None);
    }

    #[test]
    fn returns_first_of_several_matches() {
        let text = "erst_eine_Datei.pdf dann_noch_eine.pdf";
        assert_eq!(find_candidate(text).as_deref(), Some("erst_eine_Datei.pdf "));
    }

    #[test]
    fn valid_at_exact_minimum_length() {
        // 15 chars, one dot
        assert!(is_valid(Some("abcdefghijk.pdf"), 15));
    }

    #[test]
    fn invalid_below_minimum_length() {
        assert!(!is_valid(Some("abcdefghij.pdf"), 15));
    }

    #[test]
    fn invalid_with_embedded_dot() {
        assert!(!is_valid(Some("Rechnung_2024.03.pdf"), 15));
    }

    #[test]
    fn invalid_when_absent() {
        assert!(!is_valid(None, 15));
    }
}
