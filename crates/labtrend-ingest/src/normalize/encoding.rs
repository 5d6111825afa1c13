//! Source encoding detection.
//!
//! Rendered reports arrive as UTF-8, with or without a BOM, or in a legacy
//! single-byte code page (usually windows-1254 for Turkish hospitals). The
//! detector scores each candidate by how plausible its decoding of the
//! non-ASCII bytes is and reports that score as a confidence in `[0, 1]`.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1250, WINDOWS_1252, WINDOWS_1254};
use labtrend_model::DecodingError;

/// Single-byte code pages tried when the input is not valid UTF-8.
///
/// The WHATWG labels `iso-8859-9` and `iso-8859-1` resolve to windows-1254 and
/// windows-1252, so those two cover the ISO variants as well. Order breaks ties.
const SINGLE_BYTE_CANDIDATES: [&Encoding; 3] = [WINDOWS_1254, WINDOWS_1252, WINDOWS_1250];

/// Share of control bytes above which input is treated as binary.
const MAX_CONTROL_SHARE: f32 = 0.10;

/// Letters that exist in these code pages but almost never occur in reports.
/// They are what Turkish `ğ ı ş` bytes turn into under the wrong code page.
const RARE_LETTERS: &[char] = &['ð', 'Ð', 'ý', 'Ý', 'þ', 'Þ', 'đ', 'Đ', 'ţ', 'Ţ'];

/// Non-letter characters common in laboratory reports.
const REPORT_SYMBOLS: &[char] = &[
    '°', 'µ', 'μ', '±', '≤', '≥', '²', '³', '½', '×', '‰', '·', '•', '–', '—', '‘', '’', '“', '”',
    '«', '»', '€', '§', '¹', '\u{a0}',
];

/// Result of encoding detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub encoding: &'static Encoding,
    pub confidence: f32,
}

/// Decoded text plus how it was decoded.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    /// Encoding actually used to decode.
    pub encoding: &'static Encoding,
    /// Best guess of the detector, which differs from `encoding` on fallback.
    pub detection: Detection,
    pub fell_back: bool,
}

/// Detects the encoding of `bytes`.
///
/// Returns an error only for input no guess can be made for.
pub fn detect(bytes: &[u8]) -> Result<Detection, DecodingError> {
    if bytes.is_empty() {
        return Err(DecodingError::Empty);
    }

    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Ok(Detection {
            encoding,
            confidence: 1.0,
        });
    }

    let control_bytes = bytes.iter().filter(|&&b| is_control_byte(b)).count();
    if control_bytes as f32 > bytes.len() as f32 * MAX_CONTROL_SHARE {
        return Err(DecodingError::Binary {
            control_bytes,
            total_bytes: bytes.len(),
        });
    }

    if std::str::from_utf8(bytes).is_ok() {
        let confidence = if bytes.is_ascii() { 1.0 } else { 0.99 };
        return Ok(Detection {
            encoding: UTF_8,
            confidence,
        });
    }

    let mut best = Detection {
        encoding: SINGLE_BYTE_CANDIDATES[0],
        confidence: score_single_byte(bytes, SINGLE_BYTE_CANDIDATES[0]),
    };
    for encoding in SINGLE_BYTE_CANDIDATES.iter().skip(1).copied() {
        let confidence = score_single_byte(bytes, encoding);
        if confidence > best.confidence {
            best = Detection {
                encoding,
                confidence,
            };
        }
    }

    let utf8 = score_lossy_utf8(bytes);
    if utf8 > best.confidence {
        best = Detection {
            encoding: UTF_8,
            confidence: utf8,
        };
    }

    Ok(best)
}

/// Detects and decodes `bytes`, falling back to `fallback` below `threshold`.
pub fn decode(
    bytes: &[u8],
    threshold: f32,
    fallback: &'static Encoding,
) -> Result<Decoded, DecodingError> {
    let detection = detect(bytes)?;
    let fell_back = detection.confidence < threshold;
    let encoding = if fell_back {
        fallback
    } else {
        detection.encoding
    };

    // `decode` sniffs and strips a BOM, overriding `encoding` when one is present.
    let (text, used, _had_errors) = encoding.decode(bytes);
    if text.trim().is_empty() {
        return Err(DecodingError::Empty);
    }

    Ok(Decoded {
        text: text.into_owned(),
        encoding: used,
        detection,
        fell_back,
    })
}

/// Resolves a WHATWG encoding label such as `iso-8859-9` or `windows-1254`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, DecodingError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| DecodingError::UnknownEncoding {
        label: label.to_string(),
    })
}

fn is_control_byte(b: u8) -> bool {
    b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c)
}

fn char_weight(ch: char) -> f32 {
    if ch == '\u{fffd}' || ('\u{80}'..='\u{9f}').contains(&ch) {
        0.0
    } else if RARE_LETTERS.contains(&ch) {
        0.5
    } else if ch.is_alphabetic() {
        1.0
    } else if REPORT_SYMBOLS.contains(&ch) {
        0.8
    } else {
        0.3
    }
}

/// Length of a well-formed UTF-8 multi-byte sequence starting at `bytes[0]`.
fn utf8_sequence_len(bytes: &[u8]) -> Option<usize> {
    let len = match bytes.first()? {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };
    let continuation = bytes.get(1..len)?;
    continuation
        .iter()
        .all(|b| (0x80..=0xBF).contains(b))
        .then_some(len)
}

/// Plausibility of the non-ASCII bytes decoded with a single-byte encoding.
///
/// Byte runs that form valid UTF-8 sequences score zero: they are the
/// mojibake a single-byte reading of UTF-8 produces.
fn score_single_byte(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let high: Vec<u8> = (0x80..=0xFF).collect();
    let (decoded, _had_errors) = encoding.decode_without_bom_handling(&high);
    let table: Vec<char> = decoded.chars().collect();

    let mut total = 0usize;
    let mut score = 0.0f32;
    let mut idx = 0;
    while idx < bytes.len() {
        let b = bytes[idx];
        if b.is_ascii() {
            idx += 1;
            continue;
        }
        if let Some(len) = utf8_sequence_len(&bytes[idx..]) {
            total += len;
            idx += len;
            continue;
        }
        total += 1;
        score += table
            .get(usize::from(b - 0x80))
            .copied()
            .map(char_weight)
            .unwrap_or(0.0);
        idx += 1;
    }

    if total == 0 { 1.0 } else { score / total as f32 }
}

/// Share of non-ASCII characters that survive a lossy UTF-8 decode.
fn score_lossy_utf8(bytes: &[u8]) -> f32 {
    let text = String::from_utf8_lossy(bytes);
    let (total, replaced) = text
        .chars()
        .filter(|ch| !ch.is_ascii())
        .fold((0usize, 0usize), |(total, replaced), ch| {
            (total + 1, replaced + usize::from(ch == '\u{fffd}'))
        });
    if total == 0 {
        1.0
    } else {
        (total - replaced) as f32 / total as f32
    }
}
