//! Tabular export of enriched stargazers (CSV and XLSX).

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::enrich::EnrichedStargazer;
use crate::error::Result;

/// Number of exported columns.
pub const COLUMN_COUNT: usize = 9;

/// Header row, in export column order.
pub const HEADERS: [&str; COLUMN_COUNT] = [
    "Username",
    "GitHub URL",
    "Email",
    "Company",
    "Location",
    "Website",
    "LinkedIn",
    "Twitter",
    "Bio",
];

/// Worksheet name used in XLSX exports.
pub const SHEET_NAME: &str = "Stargazers";

/// How CSV cells are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvMode {
    /// Cells are joined verbatim. A comma or newline inside a value shifts
    /// the row; this matches the format existing consumers expect.
    #[default]
    Plain,
    /// RFC 4180 quoting for cells containing `,`, `"`, CR or LF.
    Quoted,
}

/// Enriched stargazers projected into fixed-order rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    rows: Vec<[String; COLUMN_COUNT]>,
}

impl ExportTable {
    pub fn from_stargazers(records: &[EnrichedStargazer]) -> Self {
        let rows = records
            .iter()
            .map(|s| {
                [
                    s.username.clone(),
                    s.profile_url.clone(),
                    s.email.clone(),
                    s.company.clone(),
                    s.location.clone(),
                    s.website.clone(),
                    s.linkedin.clone(),
                    s.twitter.clone(),
                    s.bio.clone(),
                ]
            })
            .collect();

        Self { rows }
    }

    pub fn header(&self) -> &[&'static str; COLUMN_COUNT] {
        &HEADERS
    }

    pub fn rows(&self) -> &[[String; COLUMN_COUNT]] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize as CSV: header row, then one row per record, `\n`-separated.
    pub fn to_csv(&self, mode: CsvMode) -> String {
        let header = join_row(HEADERS.iter().copied(), mode);
        let rows = self
            .rows
            .iter()
            .map(|row| join_row(row.iter().map(String::as_str), mode));

        std::iter::once(header)
            .chain(rows)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_csv(&self, path: &Path, mode: CsvMode) -> Result<()> {
        std::fs::write(path, self.to_csv(mode))?;
        Ok(())
    }

    fn to_workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, name) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
        }
        for (r, row) in self.rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                worksheet.write_string(r as u32 + 1, col as u16, cell)?;
            }
        }

        Ok(workbook)
    }

    /// Serialize as an XLSX workbook with a single `Stargazers` sheet.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_workbook()?.save_to_buffer()?)
    }

    pub fn write_xlsx(&self, path: &Path) -> Result<()> {
        self.to_workbook()?.save(path)?;
        Ok(())
    }
}

/// CSV text for `records` without quoting.
pub fn to_csv(records: &[EnrichedStargazer]) -> String {
    ExportTable::from_stargazers(records).to_csv(CsvMode::Plain)
}

fn join_row<'a>(cells: impl Iterator<Item = &'a str>, mode: CsvMode) -> String {
    cells
        .map(|cell| match mode {
            CsvMode::Plain => cell.to_string(),
            CsvMode::Quoted => quote_cell(cell),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
