//! Row-per-post outputs: CSV and XLSX share the `PostRecord` column order.

use researcher_core::{PostRecord, ReportError};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::warn;

/// Longest string a spreadsheet cell accepts.
pub const MAX_CELL_CHARS: usize = 32_767;

const SHEET_NAME: &str = "posts";

pub fn write_csv(records: &[PostRecord], path: &Path) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_spreadsheet(records: &[PostRecord], path: &Path) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, name) in PostRecord::COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (index, record) in records.iter().enumerate() {
        write_row(sheet, index as u32 + 1, record)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_row(sheet: &mut Worksheet, row: u32, record: &PostRecord) -> Result<(), XlsxError> {
    sheet.write_string(row, 0, &record.post_id)?;
    sheet.write_string(row, 1, cell_text(&record.title, &record.post_id))?;
    sheet.write_number(row, 2, record.score as f64)?;
    sheet.write_number(row, 3, record.upvote_ratio)?;
    sheet.write_string(row, 4, cell_text(&record.url, &record.post_id))?;
    sheet.write_number(row, 5, record.num_comments as f64)?;
    sheet.write_number(row, 6, record.created_utc)?;
    sheet.write_string(row, 7, cell_text(&record.all_comments, &record.post_id))?;
    if let Some(summary) = &record.summary {
        sheet.write_string(row, 8, cell_text(summary, &record.post_id))?;
    }
    if let Some(label) = record.sentiment {
        sheet.write_string(row, 9, label.as_str())?;
    }
    if let Some(score) = record.sentiment_score {
        sheet.write_number(row, 10, score)?;
    }
    Ok(())
}

/// Cuts text to the cell limit.
fn cell_text<'a>(text: &'a str, post_id: &str) -> &'a str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(
                "Cell text for post {} exceeds {} characters, truncating",
                post_id, MAX_CELL_CHARS
            );
            &text[..end]
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_limit() {
        assert_eq!(cell_text("short", "p"), "short");

        let exact = "a".repeat(MAX_CELL_CHARS);
        assert_eq!(cell_text(&exact, "p").len(), MAX_CELL_CHARS);

        let long = "é".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(cell_text(&long, "p").chars().count(), MAX_CELL_CHARS);
    }
}
