use crate::{TimetableView, DAY_HEADERS};

const LINES_PER_PAGE: usize = 48;

/// Minimal PDF 1.4 writer: Helvetica text lines, one logical section per
/// class, paginated. No external pdf crate; the format is small enough to emit
/// directly (catalog, page tree, font, one content stream per page, xref).
pub fn render(view: &TimetableView) -> Vec<u8> {
    build_pdf(&layout(view))
}

fn layout(view: &TimetableView) -> Vec<Vec<String>> {
    let mut lines: Vec<String> = Vec::new();
    for grid in &view.grids {
        lines.push(format!("Timetable - {}", grid.class_name));
        lines.push(String::new());
        for (row, slot) in grid.slots.iter().enumerate() {
            lines.push(format!("{}  {}-{}", slot.label, slot.start, slot.end));
            for (col, day) in DAY_HEADERS.iter().enumerate() {
                for lesson in &grid.cells[row][col] {
                    lines.push(format!("    {}: {}", day, lesson.line()));
                }
            }
        }
        lines.push(String::new());
    }
    if lines.is_empty() {
        lines.push("Timetable".into());
        lines.push(String::new());
        lines.push("No entries.".into());
    }

    lines
        .chunks(LINES_PER_PAGE)
        .map(|c| c.to_vec())
        .collect()
}

/// Literal-string escaping. The font is unembedded Helvetica, so text beyond
/// Latin-1 has no glyph here and degrades to `?`; Latin-1 goes out as an octal
/// escape for the single byte the encoding expects.
fn pdf_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            c if c.is_ascii() => out.push(c),
            c if (c as u32) < 256 => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(lines: &[String]) -> String {
    let mut s = String::from("BT\n/F1 10 Tf\n14 TL\n50 792 Td\n");
    for line in lines {
        s.push_str(&format!("({}) Tj T*\n", pdf_escape(line)));
    }
    s.push_str("ET\n");
    s
}

fn build_pdf(pages: &[Vec<String>]) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");

    let mut push_obj = |buf: &mut Vec<u8>, offsets: &mut Vec<usize>, body: String| {
        offsets.push(buf.len());
        let num = offsets.len();
        buf.extend_from_slice(format!("{num} 0 obj\n{body}\nendobj\n").as_bytes());
    };

    // 1: catalog, 2: page tree, 3: font, then (page, content) pairs.
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    push_obj(
        &mut buf,
        &mut offsets,
        "<< /Type /Catalog /Pages 2 0 R >>".into(),
    );
    push_obj(
        &mut buf,
        &mut offsets,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    );
    push_obj(
        &mut buf,
        &mut offsets,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".into(),
    );
    for (i, page) in pages.iter().enumerate() {
        let content_num = 5 + 2 * i;
        push_obj(
            &mut buf,
            &mut offsets,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {content_num} 0 R >>"
            ),
        );
        let stream = content_stream(page);
        push_obj(
            &mut buf,
            &mut offsets,
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                stream.len(),
                stream
            ),
        );
    }

    let xref_at = buf.len();
    buf.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
    buf.extend_from_slice(b"0000000000 65535 f \n");
    for off in &offsets {
        buf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    buf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    buf
}
