use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use labtrend_cli::{BatchConfig, RunResult, run_batch};
use labtrend_core::{ExtractOptions, PipelineOptions, default_extractor};
use labtrend_ingest::{NormalizeOptions, TokenizeOptions};
use labtrend_model::{EntryValue, Flag, StoreScope, TestName};
use labtrend_store::load_store;

use crate::cli::{RunArgs, ShowArgs};
use crate::summary::apply_table_style;

pub fn run_reports(args: &RunArgs) -> Result<RunResult> {
    let normalize = NormalizeOptions::new()
        .with_confidence_threshold(args.min_confidence)
        .with_fallback_label(&args.fallback_encoding)
        .context("--fallback-encoding")?;
    let options = PipelineOptions::new()
        .with_normalize(normalize)
        .with_tokenize(TokenizeOptions::new().with_header_lines(args.header_lines))
        .with_extract(ExtractOptions::new().with_decimal(args.decimal.into()));

    let mut config = BatchConfig::new(&args.input_dir)
        .with_patient(args.patient.clone())
        .with_options(options)
        .with_dry_run(args.dry_run);
    if let Some(store) = &args.store {
        config = config.with_store_path(store);
    }
    run_batch(&config)
}

pub fn run_shapes() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["#", "Shape", "Anchors", "Min cells", "Layout"]);
    apply_table_style(&mut table);
    for (idx, shape) in default_extractor().shapes().enumerate() {
        let specificity = shape.specificity();
        table.add_row(vec![
            (idx + 1).to_string(),
            shape.name().to_string(),
            specificity.anchors.to_string(),
            specificity.min_cells.to_string(),
            shape.description().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_show(args: &ShowArgs) -> Result<()> {
    let scope = if args.patient.is_some() {
        StoreScope::PerPatient
    } else {
        StoreScope::Single
    };
    if !args.store.exists() {
        return Err(anyhow!("store {} does not exist", args.store.display()));
    }
    let store = load_store(&args.store, scope)
        .with_context(|| format!("load store {}", args.store.display()))?;
    let Some(history) = store.history(args.patient.as_deref()) else {
        println!("No results stored.");
        return Ok(());
    };
    let only = match &args.test {
        Some(name) => Some(
            TestName::canonical(name).ok_or_else(|| anyhow!("--test must not be empty"))?,
        ),
        None => None,
    };

    let mut table = Table::new();
    table.set_header(vec!["Test", "Date", "Value", "Unit", "Reference", "Flag"]);
    apply_table_style(&mut table);
    let mut rows = 0usize;
    for (name, entries) in history.iter() {
        if only.as_ref().is_some_and(|only| only != name) {
            continue;
        }
        for entry in entries {
            let value = match &entry.value {
                EntryValue::Number(_) => entry.raw_text.clone(),
                EntryValue::Text(text) => text.clone(),
            };
            table.add_row(vec![
                name.to_string(),
                entry.date.to_string(),
                value,
                entry.unit.clone().unwrap_or_else(|| "-".to_string()),
                entry
                    .reference_range
                    .as_ref()
                    .map_or_else(|| "-".to_string(), ToString::to_string),
                entry.flag.map_or("-", Flag::as_str).to_string(),
            ]);
            rows += 1;
        }
    }
    if rows == 0 {
        println!("No results stored.");
    } else {
        println!("{table}");
    }
    Ok(())
}
