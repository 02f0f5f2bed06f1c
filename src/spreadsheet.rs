//! Minimal single-sheet `.xlsx` writer.
//!
//! An OOXML workbook is a ZIP of XML parts. This writes the five parts a
//! spreadsheet application needs to open one worksheet: content types,
//! package relationships, the workbook, its relationships, and the sheet.
//! Strings are stored inline (`t="inlineStr"`), so no shared-string table
//! or styles part is required.

use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::write::SimpleFileOptions;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Excel's limit on worksheet names.
const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(i64),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(n.into())
    }
}

/// One worksheet: a header row followed by data rows.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    /// Column widths in characters; missing entries use the default width.
    pub widths: Vec<f64>,
    pub rows: Vec<Vec<Cell>>,
}

/// Write `sheet` as a workbook at `path`, creating parent directories.
pub fn write_workbook(path: &Path, sheet: &Sheet) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create workbook: {}", path.display()))?;
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", content_types_xml()?),
        ("_rels/.rels", package_rels_xml()?),
        ("xl/workbook.xml", workbook_xml(&sheet.name)?),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()?),
        ("xl/worksheets/sheet1.xml", worksheet_xml(sheet)?),
    ];
    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
    }
    zip.finish()
        .with_context(|| format!("Failed to finish workbook: {}", path.display()))?;

    tracing::debug!(path = %path.display(), rows = sheet.rows.len(), "workbook written");
    Ok(())
}

type XmlWriter = quick_xml::Writer<Cursor<Vec<u8>>>;

fn new_writer() -> Result<XmlWriter> {
    let mut w = quick_xml::Writer::new(Cursor::new(Vec::new()));
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(w)
}

fn start(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut el = BytesStart::new(name);
    for attr in attrs {
        el.push_attribute(*attr);
    }
    w.write_event(Event::Start(el))?;
    Ok(())
}

fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut el = BytesStart::new(name);
    for attr in attrs {
        el.push_attribute(*attr);
    }
    w.write_event(Event::Empty(el))?;
    Ok(())
}

fn end(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text(w: &mut XmlWriter, s: &str) -> Result<()> {
    w.write_event(Event::Text(BytesText::new(s)))?;
    Ok(())
}

fn content_types_xml() -> Result<Vec<u8>> {
    let mut w = new_writer()?;
    start(&mut w, "Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    empty(&mut w, "Default", &[("Extension", "rels"), ("ContentType", CT_RELS)])?;
    empty(&mut w, "Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    empty(&mut w, "Override", &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)])?;
    empty(
        &mut w,
        "Override",
        &[("PartName", "/xl/worksheets/sheet1.xml"), ("ContentType", CT_WORKSHEET)],
    )?;
    end(&mut w, "Types")?;
    Ok(w.into_inner().into_inner())
}

fn package_rels_xml() -> Result<Vec<u8>> {
    let mut w = new_writer()?;
    start(&mut w, "Relationships", &[("xmlns", NS_PKG_REL)])?;
    empty(
        &mut w,
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_OFFICE_DOCUMENT), ("Target", "xl/workbook.xml")],
    )?;
    end(&mut w, "Relationships")?;
    Ok(w.into_inner().into_inner())
}

fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>> {
    let name = sheet_title(sheet_name);
    let mut w = new_writer()?;
    start(&mut w, "workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;
    start(&mut w, "sheets", &[])?;
    empty(&mut w, "sheet", &[("name", name.as_str()), ("sheetId", "1"), ("r:id", "rId1")])?;
    end(&mut w, "sheets")?;
    end(&mut w, "workbook")?;
    Ok(w.into_inner().into_inner())
}

fn workbook_rels_xml() -> Result<Vec<u8>> {
    let mut w = new_writer()?;
    start(&mut w, "Relationships", &[("xmlns", NS_PKG_REL)])?;
    empty(
        &mut w,
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_WORKSHEET), ("Target", "worksheets/sheet1.xml")],
    )?;
    end(&mut w, "Relationships")?;
    Ok(w.into_inner().into_inner())
}

fn worksheet_xml(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut w = new_writer()?;
    start(&mut w, "worksheet", &[("xmlns", NS_MAIN)])?;

    if !sheet.widths.is_empty() {
        start(&mut w, "cols", &[])?;
        for (i, width) in sheet.widths.iter().enumerate() {
            let col = (i + 1).to_string();
            let width = width.to_string();
            empty(
                &mut w,
                "col",
                &[
                    ("min", col.as_str()),
                    ("max", col.as_str()),
                    ("width", width.as_str()),
                    ("customWidth", "1"),
                ],
            )?;
        }
        end(&mut w, "cols")?;
    }

    start(&mut w, "sheetData", &[])?;
    let header: Vec<Cell> = sheet.headers.iter().map(|h| Cell::Text(h.clone())).collect();
    let rows = std::iter::once(&header).chain(sheet.rows.iter());
    for (r, row) in rows.enumerate() {
        let row_num = (r + 1).to_string();
        start(&mut w, "row", &[("r", row_num.as_str())])?;
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), row_num);
            write_cell(&mut w, &reference, cell)?;
        }
        end(&mut w, "row")?;
    }
    end(&mut w, "sheetData")?;

    end(&mut w, "worksheet")?;
    Ok(w.into_inner().into_inner())
}

fn write_cell(w: &mut XmlWriter, reference: &str, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Text(s) => {
            start(w, "c", &[("r", reference), ("t", "inlineStr")])?;
            start(w, "is", &[])?;
            start(w, "t", &[("xml:space", "preserve")])?;
            text(w, s)?;
            end(w, "t")?;
            end(w, "is")?;
        }
        Cell::Number(n) => {
            start(w, "c", &[("r", reference)])?;
            start(w, "v", &[])?;
            text(w, &n.to_string())?;
            end(w, "v")?;
        }
    }
    end(w, "c")
}

/// Zero-based column index to its letter name: 0 → A, 25 → Z, 26 → AA.
fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Worksheet names may not contain `[]:*?/\` and are capped in length.
fn sheet_title(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}
