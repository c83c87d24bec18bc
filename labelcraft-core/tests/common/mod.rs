//! In-memory XLSX packages for integration tests

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub struct MockSheet {
    name: String,
    rows: Vec<Vec<String>>,
    merges: Vec<String>,
    has_part: bool,
}

/// Minimal workbook writer: shared strings for text, numbers for integers
#[derive(Default)]
pub struct MockWorkbook {
    sheets: Vec<MockSheet>,
}

impl MockWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet; an empty string leaves the cell out
    pub fn sheet(mut self, name: &str, rows: &[&[&str]], merges: &[&str]) -> Self {
        self.sheets.push(MockSheet {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
            merges: merges.iter().map(|m| m.to_string()).collect(),
            has_part: true,
        });
        self
    }

    /// Add a sheet listed in the workbook whose worksheet part is absent
    pub fn sheet_without_part(mut self, name: &str) -> Self {
        self.sheets.push(MockSheet {
            name: name.to_string(),
            rows: Vec::new(),
            merges: Vec::new(),
            has_part: false,
        });
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.write().expect("mock workbook")
    }

    fn write(&self) -> anyhow::Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        // [Content_Types].xml
        zip.start_file("[Content_Types].xml", options)?;
        let mut content_types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
"#,
        );
        for (i, _) in self.sheets.iter().enumerate().filter(|(_, s)| s.has_part) {
            content_types.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }
        content_types.push_str("</Types>");
        zip.write_all(content_types.as_bytes())?;

        // _rels/.rels
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#.as_bytes())?;

        // xl/workbook.xml
        zip.start_file("xl/workbook.xml", options)?;
        let mut workbook_xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
"#,
        );
        for (i, sheet) in self.sheets.iter().enumerate() {
            workbook_xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(&sheet.name),
                i + 1,
                i + 1
            ));
        }
        workbook_xml.push_str("</sheets></workbook>");
        zip.write_all(workbook_xml.as_bytes())?;

        // xl/_rels/workbook.xml.rels
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        let mut rels_xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
        );
        for i in 0..self.sheets.len() {
            rels_xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }
        rels_xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
            self.sheets.len() + 1
        ));
        rels_xml.push_str("</Relationships>");
        zip.write_all(rels_xml.as_bytes())?;

        // worksheets, collecting shared strings on the way
        let mut shared: Vec<String> = Vec::new();
        for (i, sheet) in self.sheets.iter().enumerate().filter(|(_, s)| s.has_part) {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
            let xml = sheet_xml(sheet, &mut shared);
            zip.write_all(xml.as_bytes())?;
        }

        // xl/sharedStrings.xml
        zip.start_file("xl/sharedStrings.xml", options)?;
        let mut sst = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            shared.len()
        );
        for value in &shared {
            sst.push_str(&format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escape(value)));
        }
        sst.push_str("</sst>");
        zip.write_all(sst.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

fn sheet_xml(sheet: &MockSheet, shared: &mut Vec<String>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", column_name(c + 1), r + 1);
            if !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit()) {
                xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref, value));
            } else {
                let index = match shared.iter().position(|s| s == value) {
                    Some(index) => index,
                    None => {
                        shared.push(value.clone());
                        shared.len() - 1
                    }
                };
                xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, cell_ref, index));
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>");

    if !sheet.merges.is_empty() {
        xml.push_str(&format!(r#"<mergeCells count="{}">"#, sheet.merges.len()));
        for merge in &sheet.merges {
            xml.push_str(&format!(r#"<mergeCell ref="{}"/>"#, merge));
        }
        xml.push_str("</mergeCells>");
    }
    xml.push_str("</worksheet>");
    xml
}

/// 1-based column index to letters (1 -> A, 27 -> AA)
pub fn column_name(mut col: usize) -> String {
    let mut name = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        name.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
