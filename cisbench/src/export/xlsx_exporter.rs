//! Excel (.xlsx) export
//!
//! An .xlsx file is a ZIP archive of SpreadsheetML parts. This exporter
//! writes those parts directly:
//! 1. Title and version in A1/A2, headers on row 4, one recommendation per row from row 5
//! 2. A dropdown on the compliance status column
//! 3. Conditional fills keyed on the status value
//! 4. An Excel table over the header and data rows
//!
//! Strings are stored once in `xl/sharedStrings.xml` and referenced by index.

use super::{headers, record_row, ComplianceStatus, ExportError};
use crate::segmentation::Benchmark;
use std::collections::HashMap;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Worksheet name
pub const SHEET_NAME: &str = "Recommendations";

/// Excel table name
pub const TABLE_NAME: &str = "CISRecommendations";

/// Excel table style
const TABLE_STYLE: &str = "TableStyleMedium9";

/// Row holding the column headers (1-based)
const HEADER_ROW: usize = 4;

/// First data row (1-based)
const FIRST_DATA_ROW: usize = 5;

/// Excel refuses cells longer than this
const MAX_CELL_CHARS: usize = 32_767;

/// Column widths, by column index; later columns use the last value
const COLUMN_WIDTHS: [f64; 5] = [10.0, 8.0, 8.0, 50.0, 10.0];

/// Cell style indexes into `cellXfs` of the generated styles.xml
const STYLE_TITLE: usize = 1;
const STYLE_VERSION: usize = 2;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Fill colour per compliance status, in the order of the generated `dxfs`
const STATUS_FILLS: [(ComplianceStatus, &str); 3] = [
    (ComplianceStatus::Compliant, "FFC6EFCE"),
    (ComplianceStatus::NonCompliant, "FFFFC7CE"),
    (ComplianceStatus::ToReview, "FFD9D9D9"),
];

/// Shared string table, in insertion order
#[derive(Debug, Default)]
struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, usize>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, text: &str) -> usize {
        self.references += 1;
        if let Some(idx) = self.index.get(text) {
            return *idx;
        }
        let idx = self.strings.len();
        self.strings.push(text.to_string());
        self.index.insert(text.to_string(), idx);
        idx
    }
}

/// Export a benchmark to an .xlsx workbook
///
/// # Parameters
/// * `benchmark` - Segmentation result to export
/// * `output_path` - Path where the workbook will be written
pub fn to_xlsx(benchmark: &Benchmark, output_path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(output_path)?;
    write_xlsx(benchmark, file)?;
    log::info!(
        "Wrote {} recommendations to {}",
        benchmark.len(),
        output_path.display()
    );
    Ok(())
}

/// Write the workbook to any seekable writer
pub fn write_xlsx<W: Write + Seek>(benchmark: &Benchmark, writer: W) -> Result<(), ExportError> {
    let mut strings = SharedStrings::default();
    let sheet_xml = generate_sheet_xml(benchmark, &mut strings);
    let table_xml = generate_table_xml(benchmark.len());

    let parts: [(&str, String); 11] = [
        ("[Content_Types].xml", generate_content_types_xml()),
        ("_rels/.rels", generate_root_rels_xml()),
        ("docProps/core.xml", generate_core_properties_xml(benchmark)),
        ("docProps/app.xml", generate_app_properties_xml()),
        ("xl/workbook.xml", generate_workbook_xml()),
        ("xl/_rels/workbook.xml.rels", generate_workbook_rels_xml()),
        ("xl/styles.xml", generate_styles_xml()),
        ("xl/sharedStrings.xml", generate_shared_strings_xml(&strings)),
        ("xl/worksheets/sheet1.xml", sheet_xml),
        ("xl/worksheets/_rels/sheet1.xml.rels", generate_sheet_rels_xml()),
        ("xl/tables/table1.xml", table_xml),
    ];

    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, contents) in &parts {
        zip.start_file(*name, options)?;
        zip.write_all(contents.as_bytes())?;
    }
    zip.finish()?;

    Ok(())
}

/// Last row covered by the table and the status rules
///
/// An Excel table needs at least one data row, so an empty benchmark
/// still reserves one.
fn last_data_row(count: usize) -> usize {
    HEADER_ROW + count.max(1)
}

/// Column letter for a 0-based column index (0 -> A, 25 -> Z, 26 -> AA)
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn generate_sheet_xml(benchmark: &Benchmark, strings: &mut SharedStrings) -> String {
    let headers = headers();
    let last_column = column_letter(headers.len() - 1);
    let last_row = last_data_row(benchmark.len());

    let mut xml = String::with_capacity(4096 + benchmark.len() * 2048);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<worksheet xmlns="{}" xmlns:r="{}">"#,
        NS_MAIN, NS_REL
    ));
    xml.push_str(&format!(
        r#"<dimension ref="A1:{}{}"/>"#,
        last_column, last_row
    ));

    xml.push_str("<cols>");
    for col in 0..headers.len() {
        let width = COLUMN_WIDTHS[col.min(COLUMN_WIDTHS.len() - 1)];
        xml.push_str(&format!(
            r#"<col min="{n}" max="{n}" width="{w}" customWidth="1"/>"#,
            n = col + 1,
            w = width
        ));
    }
    xml.push_str("</cols>");

    xml.push_str("<sheetData>");
    xml.push_str(&generate_row_xml(
        1,
        &[benchmark.metadata.display_title()],
        STYLE_TITLE,
        strings,
    ));
    let version = benchmark.metadata.display_version();
    if !version.is_empty() {
        xml.push_str(&generate_row_xml(2, &[version], STYLE_VERSION, strings));
    }
    xml.push_str(&generate_row_xml(HEADER_ROW, &headers, 0, strings));
    for (offset, recommendation) in benchmark.recommendations.iter().enumerate() {
        let row = record_row(recommendation, ComplianceStatus::ToReview);
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        xml.push_str(&generate_row_xml(FIRST_DATA_ROW + offset, &cells, 0, strings));
    }
    xml.push_str("</sheetData>");

    let status_range = format!("A{}:A{}", FIRST_DATA_ROW, last_row);
    xml.push_str(&generate_conditional_formatting_xml(&status_range));
    xml.push_str(&generate_data_validation_xml(&status_range));

    xml.push_str(r#"<tableParts count="1"><tablePart r:id="rId1"/></tableParts>"#);
    xml.push_str("</worksheet>");
    xml
}

/// One `<row>` of shared-string cells; empty values produce no cell
fn generate_row_xml(row: usize, values: &[&str], style: usize, strings: &mut SharedStrings) -> String {
    let mut xml = format!(r#"<row r="{}">"#, row);
    for (col, value) in values.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let idx = strings.intern(&truncate_cell(value));
        let style_attr = if style == 0 {
            String::new()
        } else {
            format!(r#" s="{}""#, style)
        };
        xml.push_str(&format!(
            r#"<c r="{}{}" t="s"{}><v>{}</v></c>"#,
            column_letter(col),
            row,
            style_attr,
            idx
        ));
    }
    xml.push_str("</row>");
    xml
}

fn truncate_cell(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_CHARS {
        return value.to_string();
    }
    log::warn!(
        "Cell text of {} characters truncated to {}",
        value.chars().count(),
        MAX_CELL_CHARS
    );
    value.chars().take(MAX_CELL_CHARS).collect()
}

fn generate_conditional_formatting_xml(range: &str) -> String {
    let first_cell = format!("$A{}", FIRST_DATA_ROW);
    let mut xml = format!(r#"<conditionalFormatting sqref="{}">"#, range);
    for (priority, (status, _)) in STATUS_FILLS.iter().enumerate() {
        xml.push_str(&format!(
            r#"<cfRule type="expression" dxfId="{}" priority="{}"><formula>{}</formula></cfRule>"#,
            priority,
            priority + 1,
            escape_xml(&format!("{}=\"{}\"", first_cell, status))
        ));
    }
    xml.push_str("</conditionalFormatting>");
    xml
}

fn generate_data_validation_xml(range: &str) -> String {
    let choices = ComplianceStatus::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"<dataValidations count="1"><dataValidation type="list" allowBlank="1" showErrorMessage="1" sqref="{}"><formula1>{}</formula1></dataValidation></dataValidations>"#,
        range,
        escape_xml(&format!("\"{}\"", choices))
    )
}

fn generate_table_xml(count: usize) -> String {
    let headers = headers();
    let reference = format!(
        "A{}:{}{}",
        HEADER_ROW,
        column_letter(headers.len() - 1),
        last_data_row(count)
    );

    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(
        r#"<table xmlns="{}" id="1" name="{name}" displayName="{name}" ref="{r}" totalsRowShown="0">"#,
        NS_MAIN,
        name = TABLE_NAME,
        r = reference
    ));
    xml.push_str(&format!(r#"<autoFilter ref="{}"/>"#, reference));
    xml.push_str(&format!(r#"<tableColumns count="{}">"#, headers.len()));
    for (idx, header) in headers.iter().enumerate() {
        xml.push_str(&format!(
            r#"<tableColumn id="{}" name="{}"/>"#,
            idx + 1,
            escape_xml(header)
        ));
    }
    xml.push_str("</tableColumns>");
    xml.push_str(&format!(
        r#"<tableStyleInfo name="{}" showFirstColumn="0" showLastColumn="0" showRowStripes="1" showColumnStripes="1"/>"#,
        TABLE_STYLE
    ));
    xml.push_str("</table>");
    xml
}

fn generate_styles_xml() -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(r#"<styleSheet xmlns="{}">"#, NS_MAIN));
    xml.push_str(concat!(
        r#"<fonts count="3">"#,
        r#"<font><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
        r#"<font><b/><sz val="14"/><name val="Calibri"/><family val="2"/></font>"#,
        r#"<font><i/><sz val="12"/><name val="Calibri"/><family val="2"/></font>"#,
        r#"</fonts>"#,
        r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
        r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
        r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
        r#"<cellXfs count="3">"#,
        r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
        r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
        r#"<xf numFmtId="0" fontId="2" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
        r#"</cellXfs>"#,
        r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    ));
    xml.push_str(&format!(r#"<dxfs count="{}">"#, STATUS_FILLS.len()));
    for (_, color) in STATUS_FILLS {
        xml.push_str(&format!(
            r#"<dxf><fill><patternFill patternType="solid"><fgColor rgb="{c}"/><bgColor rgb="{c}"/></patternFill></fill></dxf>"#,
            c = color
        ));
    }
    xml.push_str("</dxfs></styleSheet>");
    xml
}

fn generate_shared_strings_xml(strings: &SharedStrings) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(
        r#"<sst xmlns="{}" count="{}" uniqueCount="{}">"#,
        NS_MAIN,
        strings.references,
        strings.strings.len()
    ));
    for s in &strings.strings {
        xml.push_str(&format!(
            r#"<si><t xml:space="preserve">{}</t></si>"#,
            escape_xml(s)
        ));
    }
    xml.push_str("</sst>");
    xml
}

fn generate_content_types_xml() -> String {
    let overrides = [
        ("/xl/workbook.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"),
        ("/xl/worksheets/sheet1.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"),
        ("/xl/styles.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"),
        ("/xl/sharedStrings.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"),
        ("/xl/tables/table1.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml"),
        ("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml"),
        ("/docProps/app.xml", "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
    ];

    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            part, content_type
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn generate_relationships_xml(relationships: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, NS_PKG_REL));
    for (id, rel_type, target) in relationships {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn generate_root_rels_xml() -> String {
    generate_relationships_xml(&[
        (
            "rId1",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            "xl/workbook.xml",
        ),
        (
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml",
        ),
        (
            "rId3",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
            "docProps/app.xml",
        ),
    ])
}

fn generate_workbook_rels_xml() -> String {
    generate_relationships_xml(&[
        (
            "rId1",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
            "worksheets/sheet1.xml",
        ),
        (
            "rId2",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
            "styles.xml",
        ),
        (
            "rId3",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings",
            "sharedStrings.xml",
        ),
    ])
}

fn generate_sheet_rels_xml() -> String {
    generate_relationships_xml(&[(
        "rId1",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table",
        "../tables/table1.xml",
    )])
}

fn generate_workbook_xml() -> String {
    format!(
        r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        XML_DECL, NS_MAIN, NS_REL, SHEET_NAME
    )
}

fn generate_core_properties_xml(benchmark: &Benchmark) -> String {
    format!(
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{}</dc:title><dc:description>{}</dc:description>",
            "</cp:coreProperties>"
        ),
        XML_DECL,
        escape_xml(benchmark.metadata.display_title()),
        escape_xml(benchmark.metadata.display_version())
    )
}

fn generate_app_properties_xml() -> String {
    format!(
        r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>cisbench</Application></Properties>"#,
        XML_DECL
    )
}

/// Escape XML special characters and drop characters XML 1.0 forbids
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if (c as u32) < 0x20 || c == '\u{fffe}' || c == '\u{ffff}' => {}
            c => out.push(c),
        }
    }
    out
}
