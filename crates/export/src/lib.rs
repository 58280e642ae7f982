pub mod csv;
pub mod html;
pub mod pdf;
pub mod xlsx;

use std::collections::HashMap;
use thiserror::Error;
use types::{Catalog, ClassId, DayOfWeek, TimeSlot, TimetableEntry};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
    Html,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            "html" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Pdf => "application/pdf",
            Self::Html => "text/html; charset=utf-8",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "timetable.csv",
            Self::Xlsx => "timetable.xlsx",
            Self::Pdf => "timetable.pdf",
            Self::Html => "timetable.html",
        }
    }
}

/// One scheduled lesson as a view line: names, not ids.
#[derive(Clone, Debug)]
pub struct Lesson {
    pub subject: String,
    pub teacher: String,
    pub room: String,
}

/// A per-class grid: slots as rows (ordered), Mon-Fri as columns. A cell may
/// hold several lessons when multi-slot subjects share it.
#[derive(Clone, Debug)]
pub struct ClassGrid {
    pub class_name: String,
    pub slots: Vec<TimeSlot>,
    /// cells[slot_row][day_col]
    pub cells: Vec<[Vec<Lesson>; 5]>,
}

#[derive(Clone, Debug, Default)]
pub struct TimetableView {
    pub grids: Vec<ClassGrid>,
}

fn day_col(day: DayOfWeek) -> usize {
    DayOfWeek::WEEK.iter().position(|d| *d == day).unwrap_or(0)
}

pub const DAY_HEADERS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Resolve entries against the catalog into printable grids. Scope to one
/// class or render all of them; classes come out name-sorted.
pub fn build_view(
    cat: &Catalog,
    entries: &[TimetableEntry],
    class: Option<&ClassId>,
) -> TimetableView {
    let subj: HashMap<&str, &types::Subject> =
        cat.subjects.iter().map(|s| (s.id.0.as_str(), s)).collect();
    let teachers: HashMap<&str, &str> = cat
        .teachers
        .iter()
        .map(|t| (t.id.0.as_str(), t.name.as_str()))
        .collect();
    let rooms: HashMap<&str, &str> = cat
        .rooms
        .iter()
        .map(|r| (r.id.0.as_str(), r.name.as_str()))
        .collect();

    let ordered = cat.ordered_slots();
    let slot_row: HashMap<&str, usize> = ordered
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.0.as_str(), i))
        .collect();

    let mut classes: Vec<_> = cat
        .classes
        .iter()
        .filter(|c| match class {
            Some(id) => &c.id == id,
            None => true,
        })
        .collect();
    classes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.0.cmp(&b.id.0)));

    let mut grids = Vec::with_capacity(classes.len());
    for c in classes {
        let mut cells: Vec<[Vec<Lesson>; 5]> = (0..ordered.len()).map(|_| Default::default()).collect();
        for e in entries.iter().filter(|e| e.class_id == c.id) {
            let Some(&row) = slot_row.get(e.slot_id.0.as_str()) else {
                continue;
            };
            let lesson = Lesson {
                subject: subj
                    .get(e.subject_id.0.as_str())
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| e.subject_id.0.clone()),
                teacher: teachers
                    .get(e.teacher_id.0.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| e.teacher_id.0.clone()),
                room: rooms
                    .get(e.room_id.0.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| e.room_id.0.clone()),
            };
            cells[row][day_col(e.day)].push(lesson);
        }
        for slot_cells in &mut cells {
            for cell in slot_cells.iter_mut() {
                cell.sort_by(|a, b| a.subject.cmp(&b.subject));
            }
        }
        let class_name = match &c.section {
            Some(sec) => format!("{} ({})", c.name, sec),
            None => c.name.clone(),
        };
        grids.push(ClassGrid {
            class_name,
            slots: ordered.iter().map(|s| (*s).clone()).collect(),
            cells,
        });
    }
    TimetableView { grids }
}

impl Lesson {
    pub fn line(&self) -> String {
        format!("{} / {} / {}", self.subject, self.teacher, self.room)
    }
}

/// Render a view in the requested format.
pub fn render(view: &TimetableView, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    Ok(match format {
        ExportFormat::Csv => csv::render(view).into_bytes(),
        ExportFormat::Html => html::render(view).into_bytes(),
        ExportFormat::Pdf => pdf::render(view),
        ExportFormat::Xlsx => xlsx::render(view)?,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use types::*;

    pub fn sample() -> (Catalog, Vec<TimetableEntry>) {
        let cat = Catalog {
            classes: vec![SchoolClass {
                id: ClassId("c1".into()),
                name: "7A".into(),
                section: Some("blue".into()),
            }],
            subjects: vec![
                Subject {
                    id: SubjectId("s1".into()),
                    name: "Maths".into(),
                    class_id: ClassId("c1".into()),
                    teacher_id: TeacherId("t1".into()),
                    multi_slot_allowed: false,
                },
                Subject {
                    id: SubjectId("s2".into()),
                    name: "Art, \"applied\"".into(),
                    class_id: ClassId("c1".into()),
                    teacher_id: TeacherId("t1".into()),
                    multi_slot_allowed: true,
                },
            ],
            teachers: vec![Teacher {
                id: TeacherId("t1".into()),
                name: "Ada Lovelace".into(),
                email: None,
            }],
            rooms: vec![Room {
                id: RoomId("r1".into()),
                name: "101".into(),
                capacity: 30,
            }],
            slots: vec![
                TimeSlot {
                    id: SlotId("p1".into()),
                    label: "P1".into(),
                    start: "08:00".into(),
                    end: "08:45".into(),
                    order: 1,
                },
                TimeSlot {
                    id: SlotId("p2".into()),
                    label: "P2".into(),
                    start: "09:00".into(),
                    end: "09:45".into(),
                    order: 2,
                },
            ],
        };
        let entry = |id: &str, subject: &str, slot: &str, day: DayOfWeek| TimetableEntry {
            id: EntryId(id.into()),
            class_id: ClassId("c1".into()),
            subject_id: SubjectId(subject.into()),
            teacher_id: TeacherId("t1".into()),
            room_id: RoomId("r1".into()),
            slot_id: SlotId(slot.into()),
            day,
        };
        let entries = vec![
            entry("e1", "s1", "p1", DayOfWeek::Mon),
            entry("e2", "s2", "p1", DayOfWeek::Mon),
            entry("e3", "s1", "p2", DayOfWeek::Tue),
        ];
        (cat, entries)
    }
}
