//! Short tag naming which configured person(s) a document mentions.

use super::category::CategoryMatcher;
use super::ResolveError;

/// Scan the document text for configured first names and derive the name
/// fragment prefixed onto the final filename.
///
/// Exactly one distinct first name returns that name as configured. Several
/// names collapse to a multi-person abbreviation: the sorted distinct hits,
/// each clipped to its first two characters and capitalized ("Anna" +
/// "Jonas" → "AnJo"). Sorting makes the tag independent of occurrence
/// order in the text. No hits yield an empty fragment.
pub fn name_fragment(text: &str, first_names: &[String]) -> Result<String, ResolveError> {
    let matcher = CategoryMatcher::new(first_names)?;
    let mut found = matcher.distinct_matches(text);
    if found.len() == 1 {
        return Ok(found.remove(0));
    }

    found.sort();
    Ok(found
        .iter()
        .map(|name| capitalize_prefix(name))
        .collect::<String>())
}

fn capitalize_prefix(name: &str) -> String {
    let prefix: String = name.chars().take(2).collect::<String>().to_lowercase();
    let mut chars = prefix.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
