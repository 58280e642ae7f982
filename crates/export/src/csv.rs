use crate::{TimetableView, DAY_HEADERS};

/// RFC 4180 quoting: wrap when the field carries a comma, quote or newline.
pub fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Flat rows, one per lesson: class,day,slot,start,end,subject,teacher,room.
pub fn render(view: &TimetableView) -> String {
    let mut out = String::from("class,day,slot,start,end,subject,teacher,room\n");
    for grid in &view.grids {
        for (row, slot) in grid.slots.iter().enumerate() {
            for (col, day) in DAY_HEADERS.iter().enumerate() {
                for lesson in &grid.cells[row][col] {
                    out.push_str(&format!(
                        "{},{},{},{},{},{},{},{}\n",
                        csv_quote(&grid.class_name),
                        day,
                        csv_quote(&slot.label),
                        slot.start,
                        slot.end,
                        csv_quote(&lesson.subject),
                        csv_quote(&lesson.teacher),
                        csv_quote(&lesson.room),
                    ));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_view, fixtures};

    #[test]
    fn quoting() {
        assert_eq!(csv_quote("plain"), "plain");
        assert_eq!(csv_quote("a,b"), "\"a,b\"");
        assert_eq!(csv_quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn renders_one_row_per_lesson() {
        let (cat, entries) = fixtures::sample();
        let csv = render(&build_view(&cat, &entries, None));
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines[0], "class,day,slot,start,end,subject,teacher,room");
        // 3 entries -> 3 data rows.
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("\"Art, \"\"applied\"\"\""));
        assert!(csv.contains("7A (blue),Monday,P1,08:00,08:45,Maths,Ada Lovelace,101"));
        assert!(csv.contains("Tuesday,P2,09:00,09:45,Maths"));
    }
}
