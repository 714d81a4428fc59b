use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;

use crate::config::Settings;
use crate::model::sales::{DailySalesRecord, HistoricalDataset};
use crate::repository::traits::DatasetLoader;
use crate::time::parse_sales_date;

/// Header row plus data rows, cells already rendered to trimmed strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    fn cell<'a>(&self, row: &'a [String], col: usize) -> &'a str {
        row.get(col).map(String::as_str).unwrap_or("")
    }
}

/// Loads `.csv`, `.xlsx` and `.xls` sales sheets into a [`HistoricalDataset`].
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetLoader {
    settings: Settings,
}

impl SpreadsheetLoader {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn read_raw(&self, path: &Path) -> Result<RawSheet> {
        if !path.exists() {
            bail!("File not found: {}", path.display());
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => read_csv(path),
            "xlsx" | "xls" | "xlsm" => read_workbook(path),
            other => Err(anyhow!(
                "Unsupported file format '{}' (expected .csv, .xlsx or .xls)",
                other
            )),
        }
    }
}

impl DatasetLoader for SpreadsheetLoader {
    fn load(&self, path: &Path) -> Result<HistoricalDataset> {
        let sheet = self.read_raw(path)?;
        let label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
        let dataset = normalize(&label, &sheet, &self.settings)
            .with_context(|| format!("Could not load {}", path.display()))?;
        tracing::info!(
            file = %path.display(),
            records = dataset.len(),
            "loaded sales dataset"
        );
        Ok(dataset)
    }
}

fn read_csv(path: &Path) -> Result<RawSheet> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawSheet { headers, rows })
}

fn read_workbook(path: &Path) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| anyhow!("Excel parse failed: {}", e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("Workbook has no worksheets"))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| anyhow!("Excel parse failed: {}", e))?;

    let mut rows_iter = range.rows();
    let headers = rows_iter
        .next()
        .ok_or_else(|| anyhow!("Worksheet '{}' is empty", sheet_name))?
        .iter()
        .map(cell_to_string)
        .collect();

    let mut rows = Vec::new();
    for data_row in rows_iter {
        let row: Vec<String> = data_row.iter().map(cell_to_string).collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawSheet { headers, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        // Excel stores dates as day serials; the date parser understands those.
        Data::DateTime(dt) => dt.as_f64().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Maps sheet columns onto daily records.
///
/// With a total column, each row's total is read directly. Without one, every
/// remaining numeric column is a branch and the total is their sum.
pub fn normalize(label: &str, sheet: &RawSheet, settings: &Settings) -> Result<HistoricalDataset> {
    let date_col = settings
        .date_column(&sheet.headers)
        .ok_or_else(|| {
            anyhow!(
                "No date column found (looked for {:?} in {:?})",
                settings.date_columns,
                sheet.headers
            )
        })?;
    let total_col = settings.total_column(&sheet.headers, date_col);

    // Rows whose date cell is not a date (headers repeated, "TOTAL" lines) never contribute.
    let mut dated_rows = Vec::new();
    for (idx, row) in sheet.rows.iter().enumerate() {
        let line = idx + 2;
        let date_cell = sheet.cell(row, date_col);
        match parse_sales_date(date_cell) {
            Ok(date) => dated_rows.push((line, date, row)),
            Err(_) if date_cell.is_empty() => {
                tracing::debug!(line, "skipping row without a date");
            }
            Err(_) => {
                tracing::warn!(line, value = date_cell, "skipping row with a non-date value");
            }
        }
    }

    let records = match total_col {
        Some(col) => totals_from_column(sheet, &dated_rows, col)?,
        None => totals_from_branches(sheet, &dated_rows, date_col, settings)?,
    };

    Ok(HistoricalDataset::new(label, records)?)
}

type DatedRow<'a> = (usize, chrono::NaiveDate, &'a Vec<String>);

fn totals_from_column(sheet: &RawSheet, rows: &[DatedRow], col: usize) -> Result<Vec<DailySalesRecord>> {
    let header = &sheet.headers[col];
    let mut records = Vec::with_capacity(rows.len());
    for &(line, date, row) in rows {
        let cell = sheet.cell(row, col);
        if cell.is_empty() {
            tracing::debug!(line, %date, "skipping day without a recorded total");
            continue;
        }
        let total = parse_amount(cell).with_context(|| format!("Row {}: column '{}'", line, header))?;
        records.push(DailySalesRecord::new(date, total));
    }
    Ok(records)
}

fn totals_from_branches(
    sheet: &RawSheet,
    rows: &[DatedRow],
    date_col: usize,
    settings: &Settings,
) -> Result<Vec<DailySalesRecord>> {
    let branch_cols: Vec<usize> = sheet
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, h)| {
            *idx != date_col
                && !h.is_empty()
                && !settings.is_date_column(h)
                && !settings.is_ignored_column(h)
        })
        .filter(|(idx, h)| {
            let numeric = rows.iter().all(|(_, _, row)| {
                let cell = sheet.cell(row, *idx);
                cell.is_empty() || parse_amount(cell).is_ok()
            });
            if !numeric {
                tracing::debug!(column = h.as_str(), "ignoring non-numeric column");
            }
            numeric
        })
        .map(|(idx, _)| idx)
        .collect();

    if branch_cols.is_empty() {
        bail!(
            "No sales amount column found (looked for {:?} or numeric branch columns in {:?})",
            settings.total_columns,
            sheet.headers
        );
    }

    let mut records = Vec::with_capacity(rows.len());
    for &(line, date, row) in rows {
        if branch_cols.iter().all(|&c| sheet.cell(row, c).is_empty()) {
            tracing::debug!(line, %date, "skipping day without branch figures");
            continue;
        }
        let mut breakdown = BTreeMap::new();
        for &col in &branch_cols {
            let cell = sheet.cell(row, col);
            let amount = if cell.is_empty() {
                0.0
            } else {
                parse_amount(cell)
                    .with_context(|| format!("Row {}: column '{}'", line, sheet.headers[col]))?
            };
            breakdown.insert(sheet.headers[col].clone(), amount);
        }
        records.push(DailySalesRecord::from_branches(date, breakdown));
    }
    Ok(records)
}

/// Parses a sales figure, tolerating thousands separators.
pub fn parse_amount(input: &str) -> Result<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| anyhow!("Invalid sales amount: '{}'", input))?;
    if !value.is_finite() {
        bail!("Invalid sales amount: '{}'", input);
    }
    if value < 0.0 {
        bail!("Negative sales amount: {}", value);
    }
    Ok(value)
}
