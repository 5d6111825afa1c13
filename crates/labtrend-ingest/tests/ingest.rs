//! Discovery, normalization and tokenization over files on disk.

use std::fs;

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1254;
use labtrend_ingest::{
    NormalizeOptions, TokenizeOptions, list_report_files, normalize, read_report, source_name,
    tokenize_document,
};

const PDF2HTML_REPORT: &str = concat!(
    "<!DOCTYPE html><html><head><meta charset=\"windows-1254\"/>",
    "<style type=\"text/css\">.ff1{font-family:ff1;}</style></head><body>",
    "<div id=\"page-container\"><div class=\"pf w0 h0\" data-page-no=\"1\">",
    "<div class=\"t m0 x0 h1 y0\">Hasta Adı: Ayşe Yılmaz</div>",
    "<div><div>10/05/2023 09:12</div></div><div><div>92</div></div><div><div>70-100</div></div>",
    "<div><div>mg/dL</div></div><div><div>95</div></div><div><div>Glukoz</div></div>",
    "<div><div>12/05/2023 08:40</div></div><div><div>4,1</div></div><div><div>3,5-5,1</div></div>",
    "<div><div>mmol/L</div></div><div><div>4,3</div></div><div><div>Potasyum</div></div>",
    "</div></div></body></html>"
);

#[test]
fn legacy_code_page_markup_report_tokenizes() {
    let dir = tempfile::tempdir().unwrap();
    let (bytes, _, _) = WINDOWS_1254.encode(PDF2HTML_REPORT);
    fs::write(dir.path().join("2023-05.html"), &bytes).unwrap();
    fs::write(dir.path().join("notes.md"), "ignored").unwrap();

    let files = list_report_files(dir.path()).unwrap();
    assert_eq!(files.len(), 1);

    let raw = read_report(&files[0]).unwrap();
    let normalized = normalize(&raw, &NormalizeOptions::default()).unwrap();
    assert_eq!(normalized.encoding, "windows-1254");
    assert!(normalized.from_markup);
    assert!(normalized.text.contains("Hasta Adı: Ayşe Yılmaz"));

    let document = tokenize_document(
        &normalized.text,
        &source_name(&files[0]),
        &TokenizeOptions::default(),
    )
    .unwrap();
    assert_eq!(document.source, "2023-05.html");
    assert_eq!(
        document.report_date,
        NaiveDate::from_ymd_opt(2023, 5, 10).unwrap()
    );
    assert_eq!(document.groups.len(), 2);
    assert_eq!(
        document.groups[1].cells,
        vec!["12/05/2023 08:40", "4,1", "3,5-5,1", "mmol/L", "4,3", "Potasyum"]
    );
}

#[test]
fn utf8_plain_text_report_tokenizes() {
    let text = "LABORATUVAR SONUÇ RAPORU\n\
                Numune Tarihi: 03.02.2024\n\
                Tetkik    Sonuç    Birim    Referans\n\
                Hemoglobin    13,5    g/dL    12-16\n\
                Lökosit   11,2 (Y)   10^3/µL   4-10\n";
    let normalized = normalize(text.as_bytes(), &NormalizeOptions::default()).unwrap();
    assert_eq!(normalized.encoding, "UTF-8");

    let document =
        tokenize_document(&normalized.text, "feb.txt", &TokenizeOptions::default()).unwrap();
    assert_eq!(
        document.report_date,
        NaiveDate::from_ymd_opt(2024, 2, 3).unwrap()
    );
    let names: Vec<&str> = document
        .groups
        .iter()
        .map(|group| group.cells[0].as_str())
        .collect();
    assert_eq!(names, vec!["Tetkik", "Hemoglobin", "Lökosit"]);
    assert_eq!(document.groups[2].cells[1], "11,2 (Y)");
}
