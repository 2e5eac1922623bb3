//! Consultation log exports: CSV attachment, a JSON table for
//! client-side PDF rendering, and a server-rendered PDF.

use std::io::BufWriter;

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use serde::Serialize;

use crate::models::ConsultationLog;
use crate::store::StoreError;

use super::stats::{statistics, ConsultationStatistics};

pub const EXPORT_TITLE: &str = "ER Consultation Log";

pub const COLUMNS: &[&str] = &[
    "ID",
    "Date",
    "Shift",
    "ER Doctor",
    "Time Called",
    "Specialist",
    "Specialty",
    "Arrival Time",
    "Response Time",
    "Patient ID",
    "Outcome",
    "Urgent",
];

/// Resolves ids to display names for the export rows.
pub struct NameResolver<'a> {
    pub doctor: &'a dyn Fn(u32) -> String,
    pub specialist: &'a dyn Fn(u32) -> String,
}

/// One row per log, in `COLUMNS` order.
pub fn export_rows(logs: &[ConsultationLog], names: &NameResolver<'_>) -> Vec<Vec<String>> {
    logs.iter()
        .map(|log| {
            vec![
                log.id.to_string(),
                log.date.to_string(),
                log.shift.as_str().to_string(),
                (names.doctor)(log.er_doctor_id),
                log.time_called.clone(),
                (names.specialist)(log.specialist_id),
                log.specialty.clone(),
                log.arrival_time.clone().unwrap_or_default(),
                log.response_time.to_string(),
                log.patient_id.clone(),
                log.outcome.as_str().to_string(),
                if log.urgent { "Yes" } else { "No" }.to_string(),
            ]
        })
        .collect()
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(fields: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    fields
        .into_iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn to_csv(logs: &[ConsultationLog], names: &NameResolver<'_>) -> String {
    let mut out = csv_line(COLUMNS.iter());
    out.push_str("\r\n");
    for row in export_rows(logs, names) {
        out.push_str(&csv_line(row));
        out.push_str("\r\n");
    }
    out
}

pub fn csv_filename(generated_at: DateTime<Utc>) -> String {
    format!("consultation-logs-{}.csv", generated_at.format("%Y-%m-%d"))
}

/// Table payload the browser renders into a PDF.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub summary: ConsultationStatistics,
}

pub fn pdf_payload(
    logs: &[ConsultationLog],
    names: &NameResolver<'_>,
    generated_at: DateTime<Utc>,
) -> PdfExport {
    PdfExport {
        title: EXPORT_TITLE.to_string(),
        generated_at,
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: export_rows(logs, names),
        summary: statistics(logs, names.doctor),
    }
}

// ─── PDF rendering ────────────────────────────────────────────────────────────

const PAGE_WIDTH: Mm = Mm(297.0);
const PAGE_HEIGHT: Mm = Mm(210.0);
const TOP: f32 = 195.0;
const BOTTOM: f32 = 15.0;
const LINE: f32 = 4.5;
/// Character widths of each column in the Courier table.
const COLUMN_WIDTHS: [usize; 12] = [4, 10, 7, 16, 6, 16, 12, 6, 8, 10, 16, 3];

fn fit(value: &str, width: usize) -> String {
    let mut cell: String = value.chars().take(width).collect();
    while cell.chars().count() < width {
        cell.push(' ');
    }
    cell
}

fn table_line(cells: &[String]) -> String {
    cells
        .iter()
        .zip(COLUMN_WIDTHS.iter())
        .map(|(cell, width)| fit(cell, *width))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the export payload as a landscape A4 PDF. Returns PDF bytes.
pub fn render_pdf(export: &PdfExport) -> Result<Vec<u8>, StoreError> {
    let (doc, page1, layer1) = PdfDocument::new(&export.title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| StoreError::Export(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| StoreError::Export(format!("PDF font error: {e}")))?;
    let courier = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| StoreError::Export(format!("PDF font error: {e}")))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = TOP;

    layer.use_text(&export.title, 14.0, Mm(15.0), Mm(y), &bold);
    y -= 6.0;
    layer.use_text(
        format!("Generated {}", export.generated_at.format("%Y-%m-%d %H:%M UTC")),
        8.0,
        Mm(15.0),
        Mm(y),
        &font,
    );
    y -= 5.0;

    let s = &export.summary;
    layer.use_text(
        format!(
            "Total {} | Admitted {} ({}%) | Urgent {} ({}%) | DAMA {} | Avg response {} min",
            s.total, s.admitted, s.admission_rate, s.urgent, s.urgent_rate, s.dama,
            s.average_response_time
        ),
        9.0,
        Mm(15.0),
        Mm(y),
        &font,
    );
    y -= 8.0;

    let header: Vec<String> = export.columns.clone();
    layer.use_text(table_line(&header), 7.0, Mm(15.0), Mm(y), &courier);
    y -= LINE;

    for row in &export.rows {
        if y < BOTTOM {
            let (page, page_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = TOP;
            layer.use_text(table_line(&header), 7.0, Mm(15.0), Mm(y), &courier);
            y -= LINE;
        }
        layer.use_text(table_line(row), 7.0, Mm(15.0), Mm(y), &courier);
        y -= LINE;
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| StoreError::Export(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| StoreError::Export(format!("PDF buffer error: {e}")))
}

pub fn pdf_filename(generated_at: DateTime<Utc>) -> String {
    format!("consultation-logs-{}.pdf", generated_at.format("%Y-%m-%d"))
}
