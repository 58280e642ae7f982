use crate::{ExportError, TimetableView, DAY_HEADERS};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Excel is picky about sheet names: at most 31 chars, none of []:*?/\ .
fn sheet_name(raw: &str, index: usize) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => ' ',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().chars().take(31).collect::<String>();
    if cleaned.is_empty() {
        format!("Sheet{}", index + 1)
    } else {
        cleaned
    }
}

fn col_letter(col: usize) -> char {
    // Never more than six columns (slot + five days).
    (b'A' + col as u8) as char
}

fn inline_cell(r#ref: &str, text: &str) -> String {
    format!(
        "<c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
        r#ref,
        xml_escape(text)
    )
}

fn sheet_xml(grid: &crate::ClassGrid) -> String {
    let mut rows = String::new();

    let mut header = String::new();
    header.push_str(&inline_cell("A1", &grid.class_name));
    for (i, day) in DAY_HEADERS.iter().enumerate() {
        header.push_str(&inline_cell(&format!("{}1", col_letter(i + 1)), day));
    }
    rows.push_str(&format!("<row r=\"1\">{header}</row>"));

    for (row, slot) in grid.slots.iter().enumerate() {
        let r = row + 2;
        let mut cells = String::new();
        cells.push_str(&inline_cell(
            &format!("A{r}"),
            &format!("{} {}-{}", slot.label, slot.start, slot.end),
        ));
        for col in 0..DAY_HEADERS.len() {
            let cell = &grid.cells[row][col];
            if cell.is_empty() {
                continue;
            }
            let text: Vec<String> = cell.iter().map(|l| l.line()).collect();
            cells.push_str(&inline_cell(
                &format!("{}{r}", col_letter(col + 1)),
                &text.join("\n"),
            ));
        }
        rows.push_str(&format!("<row r=\"{r}\">{cells}</row>"));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>{rows}</sheetData></worksheet>"
    )
}

/// One sheet per class, inline-string cells only. A minimal SpreadsheetML
/// package: content types, package rels, workbook, workbook rels, sheets.
pub fn render(view: &TimetableView) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let grids: Vec<&crate::ClassGrid> = view.grids.iter().collect();
    let empty_grid;
    let grids = if grids.is_empty() {
        empty_grid = crate::ClassGrid {
            class_name: "Timetable".into(),
            slots: vec![],
            cells: vec![],
        };
        vec![&empty_grid]
    } else {
        grids
    };

    let mut content_types = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
    );
    for i in 0..grids.len() {
        content_types.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            i + 1
        ));
    }
    content_types.push_str("</Types>");
    zip.start_file("[Content_Types].xml", opts)?;
    zip.write_all(content_types.as_bytes())?;

    zip.start_file("_rels/.rels", opts)?;
    zip.write_all(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>\
         </Relationships>"
            .as_bytes(),
    )?;

    let mut sheets = String::new();
    let mut rels = String::new();
    for (i, grid) in grids.iter().enumerate() {
        sheets.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            xml_escape(&sheet_name(&grid.class_name, i)),
            i + 1,
            i + 1
        ));
        rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
            i + 1,
            i + 1
        ));
    }

    zip.start_file("xl/workbook.xml", opts)?;
    zip.write_all(
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
             xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
             <sheets>{sheets}</sheets></workbook>"
        )
        .as_bytes(),
    )?;

    zip.start_file("xl/_rels/workbook.xml.rels", opts)?;
    zip.write_all(
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{rels}</Relationships>"
        )
        .as_bytes(),
    )?;

    for (i, grid) in grids.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), opts)?;
        zip.write_all(sheet_xml(grid).as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}
