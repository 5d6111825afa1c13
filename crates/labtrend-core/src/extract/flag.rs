//! Flag derivation and qualitative vocabulary.

use labtrend_model::{Flag, ObservationValue, ReferenceRange};

/// First words that identify a qualitative result.
const QUALITATIVE_WORDS: &[&str] = &[
    "negatif",
    "pozitif",
    "negative",
    "positive",
    "normal",
    "anormal",
    "abnormal",
    "reaktif",
    "nonreaktif",
    "non-reaktif",
    "reactive",
    "nonreactive",
    "non-reactive",
    "eser",
    "trace",
    "yok",
    "var",
    "absent",
    "present",
    "berrak",
    "bulanık",
    "clear",
    "cloudy",
    "sarı",
    "açık",
    "koyu",
    "yellow",
    "+",
    "++",
    "+++",
    "++++",
];

/// Lowercases with Turkish dotted capital I folded to a plain `i`.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase().replace('\u{307}', "")
}

/// True when the first word of `text` is a known qualitative result word.
pub fn is_qualitative(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .map(fold_case)
        .is_some_and(|word| QUALITATIVE_WORDS.contains(&word.as_str()))
}

/// Derives the flag of a result.
///
/// An explicit marker wins. Otherwise numeric values are compared against a
/// numeric range, and a qualitative value against a textual range is normal
/// when it matches and abnormal when it does not.
pub fn derive_flag(
    value: &ObservationValue,
    marker: Option<Flag>,
    range: Option<&ReferenceRange>,
) -> Option<Flag> {
    if marker.is_some() {
        return marker;
    }
    match (value, range?) {
        (ObservationValue::Numeric { value, .. }, range) => range.classify(*value),
        (ObservationValue::Text(text), ReferenceRange::Text { text: expected }) => {
            if fold_case(text.trim()) == fold_case(expected.trim()) {
                Some(Flag::Normal)
            } else {
                Some(Flag::Abnormal)
            }
        }
        (ObservationValue::Text(_), _) => None,
    }
}
