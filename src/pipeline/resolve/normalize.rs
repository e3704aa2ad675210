//! Filename cleanup: quoting artifacts, personal names, date suffix.

use chrono::Local;
use regex::RegexBuilder;

use super::types::NameRegistry;

/// Build the ordered replacement set removed from filename candidates.
///
/// Order and shape follow the production behavior exactly: the underscore
/// prefix applies to the last name, every first name, and both the
/// `first_last` and `firstlast` combinations; the bare last name comes
/// again at the end to catch leading occurrences.
fn replacement_set(names: &NameRegistry) -> Vec<String> {
    let mut replacements = vec![names.last_name.clone()];
    replacements.extend(names.first_names.iter().cloned());
    replacements.extend(
        names
            .first_names
            .iter()
            .map(|f| format!("{f}_{}", names.last_name)),
    );
    replacements.extend(
        names
            .first_names
            .iter()
            .map(|f| format!("{f}{}", names.last_name)),
    );
    let mut replacements: Vec<String> = replacements.into_iter().map(|r| format!("_{r}")).collect();
    replacements.push(names.last_name.clone());
    replacements
}

/// Clean a validated raw candidate into a final name component.
///
/// Collapses doubled underscores, strips quote characters, trims, then
/// removes every replacement-set entry case-insensitively by plain
/// substring. Substring removal can clip unrelated words that happen to
/// contain a configured name; that imprecision is long-standing observed
/// behavior and changing it would change produced filenames.
pub fn tidy_candidate(candidate: &str, names: &NameRegistry) -> String {
    let mut tidied = candidate.replace("__", "_");
    tidied = tidied.replace('"', "");
    tidied = tidied.replace('\'', "");
    let mut tidied = tidied.trim().to_string();

    for replacement in replacement_set(names) {
        let pattern = RegexBuilder::new(&regex::escape(&replacement))
            .case_insensitive(true)
            .build()
            .unwrap();
        tidied = pattern.replace_all(&tidied, "").into_owned();
    }

    tidied
}

/// Insert `-{Mon}_{YY}` of the processing date before the final extension.
pub fn append_date_suffix(file_name: &str) -> String {
    append_date_tag(file_name, &Local::now().format("%b_%y").to_string())
}

fn append_date_tag(file_name: &str, tag: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, extension)) => format!("{stem}-{tag}.{extension}"),
        None => format!("{file_name}-{tag}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> NameRegistry {
        NameRegistry::new(vec!["Anna".into(), "Jonas".into()], "Berger")
    }

    #[test]
    fn collapses_doubled_underscores_and_quotes() {
        let out = tidy_candidate(r#" "Rechnung__Telekom.pdf" "#, &registry());
        assert_eq!(out, "Rechnung_Telekom.pdf");
    }

    #[test]
    fn removes_underscored_last_name() {
        let out = tidy_candidate("Rechnung_Berger_Telekom.pdf", &registry());
        assert_eq!(out, "Rechnung_Telekom.pdf");
    }

    #[test]
    fn removes_first_last_combination_case_insensitively() {
        let out = tidy_candidate("Vertrag_anna_berger_Strom.pdf", &registry());
        assert_eq!(out, "Vertrag_Strom.pdf");
    }

    #[test]
    fn removes_concatenated_name() {
        let out = tidy_candidate("Brief_JonasBerger_Schule.pdf", &registry());
        assert_eq!(out, "Brief_Schule.pdf");
    }

    #[test]
    fn leading_bare_last_name_is_removed() {
        let out = tidy_candidate("Berger_Rechnung_Strom.pdf", &registry());
        assert_eq!(out, "_Rechnung_Strom.pdf");
    }

    #[test]
    fn idempotent_on_already_clean_name() {
        let clean = "Rechnung_Telekom_Mobilfunk.pdf";
        assert_eq!(tidy_candidate(clean, &registry()), clean);
    }

    #[test]
    fn substring_removal_clips_containing_words() {
        // "Bergerhof" contains the configured last name; the clip is the
        // documented production behavior, not an accident.
        let out = tidy_candidate("Angebot_Bergerhof_Hotel.pdf", &registry());
        assert_eq!(out, "Angebothof_Hotel.pdf");
    }

    #[test]
    fn date_tag_goes_before_extension() {
        assert_eq!(
            append_date_tag("Rechnung_Telekom.pdf", "Jul_24"),
            "Rechnung_Telekom-Jul_24.pdf"
        );
    }

    #[test]
    fn date_suffix_uses_current_month() {
        let tagged = append_date_suffix("Rechnung_Telekom.pdf");
        let expected_tag = Local::now().format("%b_%y").to_string();
        assert_eq!(tagged, format!("Rechnung_Telekom-{expected_tag}.pdf"));
    }
}
