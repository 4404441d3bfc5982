//! Spreadsheet export of the visible dashboard rows
//!
//! The workbook is a minimal OOXML package: content types, relationships,
//! one workbook part and a single worksheet using inline strings, so no
//! shared-string table or styles part is needed.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::Patient;

/// Worksheet name inside the workbook
pub const SHEET_NAME: &str = "Patients";

/// Header row, in column order
pub const EXPORT_HEADERS: [&str; 5] = [
    "Name",
    "Date of Birth",
    "Gender",
    "Payment Type",
    "Payment Amount",
];

const WORKSHEET_PATH: &str = "xl/worksheets/sheet1.xml";
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write workbook archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One spreadsheet row
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub payment_type: String,
    pub payment_amount: f64,
}

impl ExportRow {
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            name: patient.full_name(),
            date_of_birth: patient.date_of_birth.clone(),
            gender: patient.gender.as_str().to_string(),
            payment_type: patient.payment_type.as_str().to_string(),
            payment_amount: patient.payment_amount,
        }
    }

    fn text_cells(&self) -> [&str; 4] {
        [&self.name, &self.date_of_birth, &self.gender, &self.payment_type]
    }
}

/// Rows for the given (already filtered and sorted) patients, in order
pub fn export_rows(patients: &[&Patient]) -> Vec<ExportRow> {
    patients.iter().map(|p| ExportRow::from_patient(p)).collect()
}

/// Write `rows` as a single-sheet `.xlsx` workbook
pub fn write_xlsx(rows: &[ExportRow], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, Vec<u8>); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes().to_vec()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes().to_vec()),
        ("xl/workbook.xml", workbook_xml()?),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes().to_vec()),
        (WORKSHEET_PATH, worksheet_xml(rows)?),
    ];

    for (name, content) in parts.iter() {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;

    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write `rows` as CSV with the same header row
pub fn write_csv(rows: &[ExportRow], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        let amount = row.payment_amount.to_string();
        writer.write_record([
            row.name.as_str(),
            row.date_of_birth.as_str(),
            row.gender.as_str(),
            row.payment_type.as_str(),
            amount.as_str(),
        ])?;
    }
    writer.flush()?;

    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn xml_writer() -> Result<Writer<Cursor<Vec<u8>>>, ExportError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn workbook_xml() -> Result<Vec<u8>, ExportError> {
    let mut writer = xml_writer()?;

    writer.write_event(Event::Start(
        BytesStart::new("workbook").with_attributes([("xmlns", NS_MAIN), ("xmlns:r", NS_REL)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;
    writer.write_event(Event::Empty(BytesStart::new("sheet").with_attributes([
        ("name", SHEET_NAME),
        ("sheetId", "1"),
        ("r:id", "rId1"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;

    Ok(writer.into_inner().into_inner())
}

fn worksheet_xml(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = xml_writer()?;

    writer.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", NS_MAIN)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    write_row(&mut writer, 1, &EXPORT_HEADERS, None)?;
    for (index, row) in rows.iter().enumerate() {
        write_row(&mut writer, index + 2, &row.text_cells(), Some(row.payment_amount))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;

    Ok(writer.into_inner().into_inner())
}

/// Text cells in columns A.., then an optional trailing numeric cell
fn write_row(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    row_number: usize,
    texts: &[&str],
    number: Option<f64>,
) -> Result<(), ExportError> {
    let row_ref = row_number.to_string();
    writer.write_event(Event::Start(
        BytesStart::new("row").with_attributes([("r", row_ref.as_str())]),
    ))?;

    for (column, text) in texts.iter().enumerate() {
        let cell_ref = cell_reference(column, row_number);
        writer.write_event(Event::Start(
            BytesStart::new("c").with_attributes([("r", cell_ref.as_str()), ("t", "inlineStr")]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("is")))?;
        writer.write_event(Event::Start(BytesStart::new("t")))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new("t")))?;
        writer.write_event(Event::End(BytesEnd::new("is")))?;
        writer.write_event(Event::End(BytesEnd::new("c")))?;
    }

    if let Some(value) = number {
        let cell_ref = cell_reference(texts.len(), row_number);
        let value = value.to_string();
        writer.write_event(Event::Start(
            BytesStart::new("c").with_attributes([("r", cell_ref.as_str())]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("v")))?;
        writer.write_event(Event::Text(BytesText::new(&value)))?;
        writer.write_event(Event::End(BytesEnd::new("v")))?;
        writer.write_event(Event::End(BytesEnd::new("c")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

/// A1-style reference for a zero-based column
fn cell_reference(column: usize, row_number: usize) -> String {
    let mut letters = Vec::new();
    let mut n = column + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect::<String>() + &row_number.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::patient;
    use crate::models::{Gender, PaymentType};
    use crate::registry::view::{visible_patients, SortColumn, ViewState};
    use std::io::Read;
    use tempfile::TempDir;

    fn read_part(path: &Path, name: &str) -> String {
        let file = File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_cell_reference() {
        assert_eq!(cell_reference(0, 1), "A1");
        assert_eq!(cell_reference(4, 12), "E12");
        assert_eq!(cell_reference(26, 3), "AA3");
    }

    #[test]
    fn test_rows_follow_visible_order() {
        let patients = vec![
            patient("1", "Ann", "Lee", Gender::Female, PaymentType::Cash),
            patient("2", "Bob", "Lee", Gender::Male, PaymentType::Online),
            patient("3", "Cid", "Moe", Gender::Male, PaymentType::Cash),
        ];
        let mut view = ViewState {
            search_term: "lee".to_string(),
            ..Default::default()
        };
        view.toggle_sort(SortColumn::FirstName);
        view.toggle_sort(SortColumn::FirstName);

        let rows = export_rows(&visible_patients(&patients, &view));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Bob Lee");
        assert_eq!(rows[1].name, "Ann Lee");
        assert_eq!(rows[1].gender, "Female");
        assert_eq!(rows[1].payment_type, "Cash");
    }

    #[test]
    fn test_write_xlsx_package() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("patient_data.xlsx");

        let mut first = patient("1", "Ann", "Lee & Co", Gender::Female, PaymentType::Cash);
        first.payment_amount = 99.5;
        let second = patient("2", "Bob", "Lee", Gender::Male, PaymentType::Online);
        let rows = export_rows(&[&first, &second]);

        write_xlsx(&rows, &path).unwrap();
        assert!(path.exists());

        let workbook = read_part(&path, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Patients""#));

        let sheet = read_part(&path, WORKSHEET_PATH);
        assert_eq!(sheet.matches("<row ").count(), 3);
        assert!(sheet.contains("<t>Payment Amount</t>"));
        assert!(sheet.contains("<t>Ann Lee &amp; Co</t>"));
        assert!(sheet.contains(r#"<c r="E2"><v>99.5</v></c>"#));
        assert!(sheet.contains(r#"<c r="E3"><v>100</v></c>"#));

        read_part(&path, "[Content_Types].xml");
        read_part(&path, "_rels/.rels");
        read_part(&path, "xl/_rels/workbook.xml.rels");
    }

    #[test]
    fn test_write_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("patient_data.csv");
        let row = ExportRow::from_patient(&patient("1", "Ann", "Lee", Gender::Female, PaymentType::Cash));

        write_csv(&[row], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Name,Date of Birth,Gender,Payment Type,Payment Amount");
        assert_eq!(lines[1], "Ann Lee,1990-01-01T00:00:00.000Z,Female,Cash,100");
    }
}
