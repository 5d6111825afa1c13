//! Cell splitting for one normalized line.

use crate::normalize::COLUMN_GAP;

/// Minimum semicolons for a line to be read as a delimited export row.
const MIN_SEMICOLONS: usize = 2;

/// Splits a normalized line into trimmed cells.
///
/// Lines with at least two semicolons are parsed as `;`-delimited records so
/// quoted fields keep embedded delimiters. Other lines split on the column gap
/// and on `|`. Empty cells between explicit delimiters are kept; cells created
/// by a leading or trailing delimiter are not.
pub fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let mut cells = if line.matches(';').count() >= MIN_SEMICOLONS {
        split_delimited(line)
    } else {
        line.split(COLUMN_GAP)
            .flat_map(|piece| piece.split('|'))
            .map(|cell| cell.trim().to_string())
            .collect()
    };

    if cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }
    if cells.first().is_some_and(String::is_empty) {
        cells.remove(0);
    }
    cells
}

/// Number of cells with content.
pub fn filled_count(cells: &[String]) -> usize {
    cells.iter().filter(|cell| !cell.is_empty()).count()
}

fn split_delimited(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record
            .iter()
            .map(|field| field.replace(COLUMN_GAP, " ").trim().to_string())
            .collect(),
        // Unbalanced quotes: fall back to a plain split.
        _ => line
            .split(';')
            .map(|field| field.replace(COLUMN_GAP, " ").trim().to_string())
            .collect(),
    }
}
