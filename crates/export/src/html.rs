use crate::{TimetableView, DAY_HEADERS};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Self-contained printable page: one table per class, print stylesheet inline.
pub fn render(view: &TimetableView) -> String {
    let mut out = String::from(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Timetable</title>\n<style>\n\
         body { font-family: sans-serif; margin: 2em; }\n\
         table { border-collapse: collapse; margin-bottom: 2em; width: 100%; }\n\
         th, td { border: 1px solid #444; padding: 4px 8px; vertical-align: top; }\n\
         th { background: #eee; }\n\
         .slot { white-space: nowrap; }\n\
         @media print { table { page-break-after: always; } }\n\
         </style>\n</head>\n<body>\n",
    );
    for grid in &view.grids {
        out.push_str(&format!("<h2>{}</h2>\n<table>\n<tr><th></th>", escape(&grid.class_name)));
        for day in DAY_HEADERS {
            out.push_str(&format!("<th>{day}</th>"));
        }
        out.push_str("</tr>\n");
        for (row, slot) in grid.slots.iter().enumerate() {
            out.push_str(&format!(
                "<tr><td class=\"slot\"><b>{}</b><br>{}&ndash;{}</td>",
                escape(&slot.label),
                slot.start,
                slot.end
            ));
            for col in 0..DAY_HEADERS.len() {
                let cell = &grid.cells[row][col];
                if cell.is_empty() {
                    out.push_str("<td></td>");
                } else {
                    let lines: Vec<String> =
                        cell.iter().map(|l| escape(&l.line())).collect();
                    out.push_str(&format!("<td>{}</td>", lines.join("<br>")));
                }
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</table>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}
