use super::rules::{BandCriteria, Rule, TokenIndex};

// ---------------------------------------------------------------------------
// Band filter: which lines belong to the selected vibrational band
// ---------------------------------------------------------------------------

/// Space-joined band tokens of a line.
///
/// The span is clamped to the line, so short or empty lines produce a
/// truncated (usually empty) key rather than an error.
pub fn band_key(tokens: &[&str], rule: &Rule) -> String {
    rule.band_span.slice_clamped(tokens).join(" ")
}

/// Return the band key when the line passes the rule's band criteria.
///
/// A line passes when:
/// * criteria is `Single` → the key equals it exactly
/// * criteria is `AnyOf` → the key equals one of the accepted values
pub fn matching_band(tokens: &[&str], rule: &Rule) -> Option<String> {
    let key = band_key(tokens, rule);
    rule.band_criteria.matches(&key).then_some(key)
}

/// Accepted values that no line can ever produce.
///
/// A key is always exactly `span width` tokens joined by single spaces, so
/// values with a different token count or stray whitespace never match.
pub fn unreachable_criteria(rule: &Rule) -> Vec<&str> {
    let width = match (rule.band_span.start, rule.band_span.end) {
        (TokenIndex::FromStart(s), TokenIndex::FromStart(e)) if e > s => e - s,
        _ => return Vec::new(),
    };
    let values: Vec<&str> = match &rule.band_criteria {
        BandCriteria::Single(s) => vec![s.as_str()],
        BandCriteria::AnyOf(v) => v.iter().map(String::as_str).collect(),
    };
    values
        .into_iter()
        .filter(|v| v.split(' ').count() != width || v.split(' ').any(|t| t.trim().len() != t.len() || t.is_empty()))
        .collect()
}
