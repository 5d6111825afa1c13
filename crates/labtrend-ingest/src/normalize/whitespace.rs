//! Whitespace and control-character cleanup.

use super::markup::COLUMN_GAP;

/// Rewrites text into canonical lines.
///
/// - `\r\n` and `\r` become `\n`
/// - Unicode spaces become ASCII spaces; invisible and control characters are dropped
/// - a run of two or more spaces, or any run containing a tab, becomes one column gap
/// - a line that was indented by such a run keeps a single leading gap
/// - trailing whitespace is removed and runs of blank lines collapse to one
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = true;

    for line in text.split('\n') {
        let canonical = canonical_line(line);
        let is_blank = canonical.is_empty();
        if is_blank && previous_blank {
            continue;
        }
        out.push_str(&canonical);
        out.push('\n');
        previous_blank = is_blank;
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn canonical_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_spaces = 0usize;
    let mut pending_tab = false;

    for ch in line.chars() {
        match classify(ch) {
            CharClass::Drop => {}
            CharClass::Space => pending_spaces += 1,
            CharClass::Tab => pending_tab = true,
            CharClass::Keep => {
                if pending_tab || pending_spaces >= 2 {
                    out.push(COLUMN_GAP);
                } else if pending_spaces == 1 && !out.is_empty() {
                    out.push(' ');
                }
                pending_spaces = 0;
                pending_tab = false;
                out.push(ch);
            }
        }
    }
    out
}

enum CharClass {
    Keep,
    Space,
    Tab,
    Drop,
}

fn classify(ch: char) -> CharClass {
    match ch {
        '\t' => CharClass::Tab,
        ' ' => CharClass::Space,
        // soft hyphen, zero-width characters and BOM
        '\u{ad}' | '\u{200b}'..='\u{200d}' | '\u{2060}' | '\u{feff}' => CharClass::Drop,
        c if c.is_whitespace() => CharClass::Space,
        c if c.is_control() => CharClass::Drop,
        _ => CharClass::Keep,
    }
}
