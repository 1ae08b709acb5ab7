// 📥 Exporter - Datos + Pendientes → xlsx (in memory) or CSV
//
// Column order is fixed. The derived timestamp is never exported.
// Empty inputs still produce header-only sheets.

use crate::error::Result;
use crate::pending::PendingSummary;
use crate::table::OffsetRow;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::io::Write;

pub const EXPORT_FILE_NAME: &str = "offsets_pendientes.xlsx";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const DATOS_SHEET: &str = "Datos";
pub const PENDIENTES_SHEET: &str = "Pendientes";

pub const DATOS_HEADERS: [&str; 7] = [
    "Fecha",
    "Hora",
    "Entity",
    "Characteristic",
    "Old",
    "New",
    "User",
];

pub const PENDIENTES_HEADERS: [&str; 7] = [
    "Entity",
    "Characteristic",
    "Fecha_final",
    "Hora_final",
    "Old_inicial",
    "New_final",
    "Diferencia_pendiente",
];

// ============================================================================
// XLSX
// ============================================================================

/// Two-sheet workbook written straight to a byte buffer
pub fn to_xlsx_buffer(rows: &[OffsetRow], pending: &[PendingSummary]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let datos = workbook.add_worksheet();
    datos.set_name(DATOS_SHEET)?;
    write_datos(datos, rows, &header_format)?;

    let pendientes = workbook.add_worksheet();
    pendientes.set_name(PENDIENTES_SHEET)?;
    write_pendientes(pendientes, pending, &header_format)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_headers(
    sheet: &mut Worksheet,
    headers: &[&str],
    format: &Format,
) -> std::result::Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, format)?;
        sheet.set_column_width(col, 16.0)?;
    }
    Ok(())
}

/// Excel has no inf/NaN cells: those go in as text.
fn write_value(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: f64,
) -> std::result::Result<(), XlsxError> {
    match non_finite_label(value) {
        Some(label) => sheet.write_string(row, col, label)?,
        None => sheet.write_number(row, col, value)?,
    };
    Ok(())
}

fn non_finite_label(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("nan")
    } else if value == f64::INFINITY {
        Some("inf")
    } else if value == f64::NEG_INFINITY {
        Some("-inf")
    } else {
        None
    }
}

fn format_value(value: f64) -> String {
    match non_finite_label(value) {
        Some(label) => label.to_string(),
        None => value.to_string(),
    }
}

fn write_datos(
    sheet: &mut Worksheet,
    rows: &[OffsetRow],
    header_format: &Format,
) -> std::result::Result<(), XlsxError> {
    write_headers(sheet, &DATOS_HEADERS, header_format)?;

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let rec = &row.record;
        sheet.write_string(r, 0, &rec.date)?;
        sheet.write_string(r, 1, &rec.time)?;
        sheet.write_string(r, 2, &rec.entity)?;
        sheet.write_string(r, 3, &rec.characteristic)?;
        write_value(sheet, r, 4, rec.old_value)?;
        write_value(sheet, r, 5, rec.new_value)?;
        sheet.write_string(r, 6, &rec.user)?;
    }
    Ok(())
}

fn write_pendientes(
    sheet: &mut Worksheet,
    pending: &[PendingSummary],
    header_format: &Format,
) -> std::result::Result<(), XlsxError> {
    write_headers(sheet, &PENDIENTES_HEADERS, header_format)?;

    for (i, p) in pending.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &p.entity)?;
        sheet.write_string(r, 1, &p.characteristic_final)?;
        sheet.write_string(r, 2, &p.date_final)?;
        sheet.write_string(r, 3, &p.time_final)?;
        write_value(sheet, r, 4, p.old_initial)?;
        write_value(sheet, r, 5, p.new_final)?;
        write_value(sheet, r, 6, p.difference_pending)?;
    }
    Ok(())
}

// ============================================================================
// CSV
// ============================================================================

pub fn write_datos_csv<W: Write>(writer: W, rows: &[OffsetRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(DATOS_HEADERS)?;

    for row in rows {
        let rec = &row.record;
        let old = format_value(rec.old_value);
        let new = format_value(rec.new_value);
        wtr.write_record([
            rec.date.as_str(),
            rec.time.as_str(),
            rec.entity.as_str(),
            rec.characteristic.as_str(),
            old.as_str(),
            new.as_str(),
            rec.user.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_pendientes_csv<W: Write>(writer: W, pending: &[PendingSummary]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(PENDIENTES_HEADERS)?;

    for p in pending {
        let numbers = [p.old_initial, p.new_final, p.difference_pending].map(format_value);
        wtr.write_record([
            p.entity.as_str(),
            p.characteristic_final.as_str(),
            p.date_final.as_str(),
            p.time_final.as_str(),
            numbers[0].as_str(),
            numbers[1].as_str(),
            numbers[2].as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
