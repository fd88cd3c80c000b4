use rust_xlsxwriter::Workbook;

use crate::{
    app_error::{AppError, AppResult},
    use_cases::registration::AttendanceRecord,
};

/// Fixed column set of the attendance table, in serialization order.
pub const COLUMNS: [&str; 6] = ["timestamp", "name", "email", "phone", "masterclass", "session"];

/// Timestamp wire format for tabular files. `%.f` keeps sub-second precision
/// when present so an export/load round trip is lossless.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn record_row(record: &AttendanceRecord) -> [String; 6] {
    [
        record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        record.name.clone(),
        record.email.clone(),
        record.phone.clone(),
        record
            .masterclass
            .map(|m| m.label().to_string())
            .unwrap_or_default(),
        record
            .session
            .map(|s| s.label().to_string())
            .unwrap_or_default(),
    ]
}

/// Serializes the full table to delimited text, header row first.
pub fn to_csv(records: &[AttendanceRecord]) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    out.push('\n');

    for record in records {
        for (i, field) in record_row(record).iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            // Escape commas, quotes and newlines as needed
            if field.contains(',') || field.contains('"') || field.contains('\n') {
                out.push('"');
                out.push_str(&field.replace('"', "\"\""));
                out.push('"');
            } else {
                out.push_str(field);
            }
        }
        out.push('\n');
    }

    out
}

/// Serializes the full table to an XLSX workbook in memory, one sheet named
/// for the dataset.
pub fn to_xlsx(records: &[AttendanceRecord]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Attendance")
        .map_err(|e| AppError::Internal(e.to_string()))?;

    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }
    for (row, record) in records.iter().enumerate() {
        for (col, value) in record_row(record).iter().enumerate() {
            worksheet
                .write_string((row + 1) as u32, col as u16, value.as_str())
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::Internal(e.to_string()))
}
