//! Value cells: locale-aware numbers, censored values and flag markers.

use std::sync::LazyLock;

use labtrend_model::{Flag, ObservationValue};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Decimal separator convention of the source reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalConvention {
    /// `7,2` is seven point two; `.` groups thousands.
    #[default]
    Comma,
    /// `7.2` is seven point two; `,` groups thousands.
    Dot,
}

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+(?:[.,]\d+)*|[.,]\d+)$").expect("valid regex")
});

static VALUE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<pre>[*!↑↓]+)?\s*(?P<num>[-+]?(?:\d+(?:[.,]\d+)*|[.,]\d+))\s*(?P<post>\(\s*[hlyedka]\s*\)|[hlyedka]|[*!↑↓]+|yüksek|düşük|high|low)?$",
    )
    .expect("valid regex")
});

static CENSORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:<=|>=|<|>|≤|≥)\s*(?:\d+(?:[.,]\d+)*|[.,]\d+)$").expect("valid regex")
});

static MARKER_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\(\s*[hlyedka]\s*\)|[*!↑↓]+|yüksek|düşük|high|low)$").expect("valid regex")
});

/// Parses a number written with `convention`, returning the dot-decimal value.
///
/// When both separators appear the last one is the decimal point, whatever
/// the convention. A single `.` is always a decimal point.
pub fn parse_number(text: &str, convention: DecimalConvention) -> Option<f64> {
    let text = text.trim();
    if !NUMBER.is_match(text) {
        return None;
    }

    let commas = text.matches(',').count();
    let dots = text.matches('.').count();
    let canonical = match (commas, dots) {
        (0, 0) => text.to_string(),
        (_, 0) => match convention {
            DecimalConvention::Comma if commas == 1 => text.replace(',', "."),
            _ => text.replace(',', ""),
        },
        (0, 1) => text.to_string(),
        (0, _) => match convention {
            DecimalConvention::Comma => text.replace('.', ""),
            DecimalConvention::Dot => return None,
        },
        _ => {
            let last = text.rfind([',', '.'])?;
            let (int_part, frac_part) = text.split_at(last);
            let int_part = int_part.replace([',', '.'], "");
            format!("{int_part}.{}", &frac_part[1..])
        }
    };
    canonical.parse().ok()
}

/// Maps a result marker to its flag.
pub fn marker_flag(marker: &str) -> Option<Flag> {
    let inner = marker
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_lowercase();
    match inner.as_str() {
        "" => None,
        "h" | "y" | "e" | "yüksek" | "high" => Some(Flag::High),
        "l" | "d" | "k" | "düşük" | "low" => Some(Flag::Low),
        "a" => Some(Flag::Abnormal),
        arrows if arrows.chars().all(|ch| ch == '↑') => Some(Flag::High),
        arrows if arrows.chars().all(|ch| ch == '↓') => Some(Flag::Low),
        stars if stars.chars().all(|ch| matches!(ch, '*' | '!')) => Some(Flag::Abnormal),
        _ => None,
    }
}

/// True when the whole cell is a standalone flag marker such as `(H)` or `*`.
pub fn is_marker_cell(cell: &str) -> bool {
    MARKER_CELL.is_match(cell.trim())
}

/// A parsed value cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCell {
    pub value: ObservationValue,
    /// Explicit marker printed next to the value.
    pub marker: Option<Flag>,
}

/// Parses a cell holding a numeric result, optionally with a marker, or a
/// censored result such as `<0.5`.
///
/// `raw` keeps the number as printed, without the marker.
pub fn parse_value_cell(cell: &str, convention: DecimalConvention) -> Option<ValueCell> {
    let cell = cell.trim();
    if CENSORED.is_match(cell) {
        return Some(ValueCell {
            value: ObservationValue::Text(cell.to_string()),
            marker: None,
        });
    }

    let caps = VALUE_CELL.captures(cell)?;
    let raw = &caps["num"];
    let value = parse_number(raw, convention)?;
    let marker = caps
        .name("pre")
        .or_else(|| caps.name("post"))
        .and_then(|m| marker_flag(m.as_str()));

    Some(ValueCell {
        value: ObservationValue::Numeric {
            value,
            raw: raw.to_string(),
        },
        marker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_convention() {
        let c = DecimalConvention::Comma;
        assert_eq!(parse_number("7,2", c), Some(7.2));
        assert_eq!(parse_number("1.234,5", c), Some(1234.5));
        assert_eq!(parse_number("1.234.567", c), Some(1_234_567.0));
        assert_eq!(parse_number("0.5", c), Some(0.5));
        assert_eq!(parse_number("-2", c), Some(-2.0));
        assert_eq!(parse_number(",5", c), Some(0.5));
    }

    #[test]
    fn test_dot_convention() {
        let d = DecimalConvention::Dot;
        assert_eq!(parse_number("1,234.5", d), Some(1234.5));
        assert_eq!(parse_number("1,234", d), Some(1234.0));
        assert_eq!(parse_number("7.2", d), Some(7.2));
        assert_eq!(parse_number("1.2.3", d), None);
    }

    #[test]
    fn test_not_numbers() {
        let c = DecimalConvention::Comma;
        assert_eq!(parse_number("70-100", c), None);
        assert_eq!(parse_number("mg/dL", c), None);
        assert_eq!(parse_number("", c), None);
        assert_eq!(parse_number("1,,2", c), None);
    }

    #[test]
    fn test_value_cell_markers() {
        let c = DecimalConvention::Comma;
        let cell = parse_value_cell("110 (E)", c).unwrap();
        assert_eq!(cell.marker, Some(Flag::High));
        assert_eq!(cell.value.as_f64(), Some(110.0));
        assert_eq!(cell.value.raw_text(), "110");

        assert_eq!(parse_value_cell("11,2 (Y)", c).unwrap().marker, Some(Flag::High));
        assert_eq!(parse_value_cell("3,1 D", c).unwrap().marker, Some(Flag::Low));
        assert_eq!(parse_value_cell("*45", c).unwrap().marker, Some(Flag::Abnormal));
        assert_eq!(parse_value_cell("12 ↓", c).unwrap().marker, Some(Flag::Low));
        assert_eq!(parse_value_cell("8,9 Düşük", c).unwrap().marker, Some(Flag::Low));
        assert_eq!(parse_value_cell("95", c).unwrap().marker, None);
    }

    #[test]
    fn test_censored_value_is_text() {
        let cell = parse_value_cell("<0,5", DecimalConvention::Comma).unwrap();
        assert_eq!(cell.value, ObservationValue::Text("<0,5".to_string()));
        assert_eq!(cell.marker, None);
    }

    #[test]
    fn test_value_cell_rejects_other_shapes() {
        let c = DecimalConvention::Comma;
        assert!(parse_value_cell("70-100", c).is_none());
        assert!(parse_value_cell("110 / 95", c).is_none());
        assert!(parse_value_cell("Negatif", c).is_none());
        assert!(parse_value_cell("10^3/µL", c).is_none());
    }

    #[test]
    fn test_marker_cells() {
        assert!(is_marker_cell("(H)"));
        assert!(is_marker_cell("**"));
        assert!(is_marker_cell("Yüksek"));
        assert!(!is_marker_cell("L"));
        assert!(!is_marker_cell("mg/dL"));
    }
}
