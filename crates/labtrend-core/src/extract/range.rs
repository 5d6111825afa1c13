//! Reference range parsing.

use std::sync::LazyLock;

use labtrend_model::{InvalidReason, ReferenceRange};
use regex::Regex;

use super::value::{DecimalConvention, parse_number};

static BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<low>-?(?:\d+(?:[.,]\d+)*|[.,]\d+))\s*[-–—]\s*(?P<high>-?(?:\d+(?:[.,]\d+)*|[.,]\d+))$",
    )
    .expect("valid regex")
});

static BOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<op><=|>=|=<|=>|≤|≥|<|>)\s*(?P<num>-?(?:\d+(?:[.,]\d+)*|[.,]\d+))$")
        .expect("valid regex")
});

/// Parses a numeric reference range: `low-high`, `< high`, `>= low` and variants.
///
/// Returns `None` when the text is not numeric range syntax, and an error
/// when it is but the bounds are inverted.
pub fn parse_numeric_range(
    text: &str,
    convention: DecimalConvention,
) -> Option<Result<ReferenceRange, InvalidReason>> {
    let text = text.trim();

    if let Some(caps) = BETWEEN.captures(text) {
        let low = parse_number(&caps["low"], convention)?;
        let high = parse_number(&caps["high"], convention)?;
        if low > high {
            return Some(Err(InvalidReason::InvertedRange { low, high }));
        }
        return Some(Ok(ReferenceRange::Between { low, high }));
    }

    let caps = BOUND.captures(text)?;
    let bound = parse_number(&caps["num"], convention)?;
    let range = match &caps["op"] {
        "<" => ReferenceRange::Below {
            high: bound,
            inclusive: false,
        },
        "<=" | "=<" | "≤" => ReferenceRange::Below {
            high: bound,
            inclusive: true,
        },
        ">" => ReferenceRange::Above {
            low: bound,
            inclusive: false,
        },
        _ => ReferenceRange::Above {
            low: bound,
            inclusive: true,
        },
    };
    Some(Ok(range))
}

/// Parses any non-empty range cell; non-numeric text becomes a textual range.
pub fn parse_range(
    text: &str,
    convention: DecimalConvention,
) -> Result<Option<ReferenceRange>, InvalidReason> {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return Ok(None);
    }
    match parse_numeric_range(text, convention) {
        Some(parsed) => parsed.map(Some),
        None => Ok(Some(ReferenceRange::Text {
            text: text.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: DecimalConvention = DecimalConvention::Comma;

    #[test]
    fn test_between_forms() {
        for text in ["70-100", "70 - 100", "70–100"] {
            assert_eq!(
                parse_range(text, C).unwrap(),
                Some(ReferenceRange::Between {
                    low: 70.0,
                    high: 100.0
                }),
                "{text}"
            );
        }
        assert_eq!(
            parse_range("3,5-5,1", C).unwrap(),
            Some(ReferenceRange::Between { low: 3.5, high: 5.1 })
        );
        assert_eq!(
            parse_range("-2 - 2", C).unwrap(),
            Some(ReferenceRange::Between {
                low: -2.0,
                high: 2.0
            })
        );
    }

    #[test]
    fn test_single_sided_bounds() {
        assert_eq!(
            parse_range("< 200", C).unwrap(),
            Some(ReferenceRange::Below {
                high: 200.0,
                inclusive: false
            })
        );
        assert_eq!(
            parse_range("≥40", C).unwrap(),
            Some(ReferenceRange::Above {
                low: 40.0,
                inclusive: true
            })
        );
        assert_eq!(
            parse_range("<= 5", C).unwrap(),
            Some(ReferenceRange::Below {
                high: 5.0,
                inclusive: true
            })
        );
    }

    #[test]
    fn test_inverted_range_is_invalid() {
        assert_eq!(
            parse_range("100-70", C),
            Err(InvalidReason::InvertedRange {
                low: 100.0,
                high: 70.0
            })
        );
    }

    #[test]
    fn test_text_and_empty() {
        assert_eq!(
            parse_range("Negatif", C).unwrap(),
            Some(ReferenceRange::Text {
                text: "Negatif".to_string()
            })
        );
        assert_eq!(parse_range("  ", C).unwrap(), None);
        assert!(parse_numeric_range("mg/dL", C).is_none());
    }
}
