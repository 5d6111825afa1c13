//! Text normalizer: raw rendered bytes to canonical line-oriented text.
//!
//! The output uses `\n` line endings and a single `\t` as the column gap, so
//! the tokenizer never needs to care how the renderer laid out the page.

pub mod encoding;
pub mod markup;
pub mod whitespace;

use encoding_rs::{Encoding, WINDOWS_1254};
use labtrend_model::DecodingError;
use tracing::{debug, warn};

pub use encoding::{Detection, detect, encoding_for_label};
pub use markup::{COLUMN_GAP, flatten_markup, looks_like_markup};
pub use whitespace::normalize_whitespace;

/// Default minimum detector confidence before falling back.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.80;

/// Options for text normalization.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Detector confidence below which `fallback_encoding` is used.
    pub confidence_threshold: f32,
    /// Encoding used when detection is not confident enough.
    pub fallback_encoding: &'static Encoding,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            fallback_encoding: WINDOWS_1254,
        }
    }
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_fallback_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.fallback_encoding = encoding;
        self
    }

    /// Sets the fallback from a label such as `iso-8859-9`.
    pub fn with_fallback_label(self, label: &str) -> Result<Self, DecodingError> {
        Ok(self.with_fallback_encoding(encoding_for_label(label)?))
    }
}

/// Non-fatal findings of the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeWarning {
    /// Detection was below threshold and the fallback encoding was used.
    EncodingFallback {
        detected: &'static str,
        confidence: f32,
        fallback: &'static str,
    },
}

/// Canonical text of one document.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub text: String,
    /// Name of the encoding the bytes were decoded with.
    pub encoding: &'static str,
    /// Detector confidence for its best guess.
    pub confidence: f32,
    /// Whether the input was flattened from markup.
    pub from_markup: bool,
    pub warnings: Vec<NormalizeWarning>,
}

/// Decodes and canonicalizes a rendered document.
pub fn normalize(bytes: &[u8], options: &NormalizeOptions) -> Result<NormalizedText, DecodingError> {
    let decoded = encoding::decode(
        bytes,
        options.confidence_threshold,
        options.fallback_encoding,
    )?;

    let mut warnings = Vec::new();
    if decoded.fell_back {
        warn!(
            detected = decoded.detection.encoding.name(),
            confidence = decoded.detection.confidence,
            fallback = decoded.encoding.name(),
            "encoding confidence below threshold, using fallback"
        );
        warnings.push(NormalizeWarning::EncodingFallback {
            detected: decoded.detection.encoding.name(),
            confidence: decoded.detection.confidence,
            fallback: decoded.encoding.name(),
        });
    }

    let from_markup = looks_like_markup(&decoded.text);
    let flat = if from_markup {
        flatten_markup(&decoded.text)
    } else {
        decoded.text
    };
    let text = normalize_whitespace(&flat);
    if text.trim().is_empty() {
        return Err(DecodingError::Empty);
    }

    debug!(
        encoding = decoded.encoding.name(),
        confidence = decoded.detection.confidence,
        from_markup,
        lines = text.lines().count(),
        "normalized document"
    );

    Ok(NormalizedText {
        text,
        encoding: decoded.encoding.name(),
        confidence: decoded.detection.confidence,
        from_markup,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_report() {
        let normalized = normalize(
            "Rapor Tarihi: 10.05.2023\r\nGlukoz   95   mg/dL   70-100\r\n".as_bytes(),
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(
            normalized.text,
            "Rapor Tarihi: 10.05.2023\nGlukoz\t95\tmg/dL\t70-100\n"
        );
        assert_eq!(normalized.encoding, "UTF-8");
        assert!(!normalized.from_markup);
        assert!(normalized.warnings.is_empty());
    }

    #[test]
    fn test_markup_only_document_is_empty() {
        let err = normalize(b"<html><body><div></div></body></html>", &NormalizeOptions::default())
            .unwrap_err();
        assert_eq!(err, DecodingError::Empty);
    }

    #[test]
    fn test_fallback_recorded_as_warning() {
        // 0x81 decodes to a C1 control in every candidate code page.
        let bytes = b"Glukoz  95  D\xfc\xfe\xfck \x81";
        let options = NormalizeOptions::new().with_confidence_threshold(0.9);
        let normalized = normalize(bytes, &options).unwrap();
        assert_eq!(normalized.encoding, "windows-1254");
        assert_eq!(normalized.text, "Glukoz\t95\tDüşük\n");
        assert!(matches!(
            normalized.warnings.as_slice(),
            [NormalizeWarning::EncodingFallback { fallback: "windows-1254", .. }]
        ));
    }

    #[test]
    fn test_fallback_label() {
        let options = NormalizeOptions::new().with_fallback_label("latin1").unwrap();
        assert_eq!(options.fallback_encoding.name(), "windows-1252");
        assert!(NormalizeOptions::new().with_fallback_label("nope").is_err());
    }
}
