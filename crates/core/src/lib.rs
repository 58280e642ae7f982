pub mod conflicts;

use thiserror::Error;
use types::{is_valid_hhmm, Catalog, TimetableEntry};

pub use conflicts::{check_assign, check_swap, ConflictError, SlotUsage};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid catalog: {0}")]
    Msg(String),
}

/// Whole-catalog sanity check: duplicate ids, dangling references, slot formats.
/// Collects every problem it finds rather than stopping at the first.
pub fn validate(cat: &Catalog) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    fn chk_unique<'a>(
        name: &str,
        ids: impl Iterator<Item = &'a String>,
        errors: &mut Vec<String>,
    ) {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id.clone()) {
                errors.push(format!("duplicate {name} id: {id}"));
            }
        }
    }
    chk_unique("class", cat.classes.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("subject", cat.subjects.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("teacher", cat.teachers.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("room", cat.rooms.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("slot", cat.slots.iter().map(|x| &x.id.0), &mut errors);

    for s in &cat.slots {
        if !is_valid_hhmm(&s.start) {
            errors.push(format!("slot {} has invalid start: {}", s.id.0, s.start));
        }
        if !is_valid_hhmm(&s.end) {
            errors.push(format!("slot {} has invalid end: {}", s.id.0, s.end));
        }
        if is_valid_hhmm(&s.start) && is_valid_hhmm(&s.end) && s.start >= s.end {
            errors.push(format!(
                "slot {} does not end after it starts: {}-{}",
                s.id.0, s.start, s.end
            ));
        }
    }
    {
        use std::collections::HashSet;
        let mut orders = HashSet::new();
        for s in &cat.slots {
            if !orders.insert(s.order) {
                errors.push(format!("slot {} reuses order {}", s.id.0, s.order));
            }
        }
    }

    for r in &cat.rooms {
        if r.capacity == 0 {
            errors.push(format!("room {} has zero capacity", r.id.0));
        }
    }

    for s in &cat.subjects {
        if cat.class(&s.class_id).is_none() {
            errors.push(format!(
                "subject {} references missing class {}",
                s.id.0, s.class_id.0
            ));
        }
        if cat.teacher(&s.teacher_id).is_none() {
            errors.push(format!(
                "subject {} references missing teacher {}",
                s.id.0, s.teacher_id.0
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

/// Referential check for a single entry against the catalog.
pub fn validate_entry(cat: &Catalog, e: &TimetableEntry) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();
    if cat.class(&e.class_id).is_none() {
        errors.push(format!("entry {} references missing class {}", e.id.0, e.class_id.0));
    }
    match cat.subject(&e.subject_id) {
        None => errors.push(format!(
            "entry {} references missing subject {}",
            e.id.0, e.subject_id.0
        )),
        Some(s) => {
            if s.class_id != e.class_id {
                errors.push(format!(
                    "entry {} carries subject {} of another class",
                    e.id.0, s.id.0
                ));
            }
        }
    }
    if cat.room(&e.room_id).is_none() {
        errors.push(format!("entry {} references missing room {}", e.id.0, e.room_id.0));
    }
    if cat.slot(&e.slot_id).is_none() {
        errors.push(format!("entry {} references missing slot {}", e.id.0, e.slot_id.0));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::*;

    fn catalog() -> Catalog {
        Catalog {
            classes: vec![SchoolClass {
                id: ClassId("c1".into()),
                name: "7A".into(),
                section: None,
            }],
            subjects: vec![Subject {
                id: SubjectId("s1".into()),
                name: "Maths".into(),
                class_id: ClassId("c1".into()),
                teacher_id: TeacherId("t1".into()),
                multi_slot_allowed: false,
            }],
            teachers: vec![Teacher {
                id: TeacherId("t1".into()),
                name: "Ada".into(),
                email: None,
            }],
            rooms: vec![Room {
                id: RoomId("r1".into()),
                name: "101".into(),
                capacity: 30,
            }],
            slots: vec![TimeSlot {
                id: SlotId("p1".into()),
                label: "P1".into(),
                start: "08:00".into(),
                end: "08:45".into(),
                order: 1,
            }],
        }
    }

    #[test]
    fn clean_catalog_passes() {
        assert!(validate(&catalog()).is_ok());
    }

    #[test]
    fn duplicate_and_dangling_are_both_reported() {
        let mut cat = catalog();
        cat.classes.push(cat.classes[0].clone());
        cat.subjects[0].teacher_id = TeacherId("ghost".into());
        let Err(ValidationError::Msg(msg)) = validate(&cat) else {
            panic!("expected failure");
        };
        assert!(msg.contains("duplicate class id: c1"));
        assert!(msg.contains("missing teacher ghost"));
    }

    #[test]
    fn bad_slot_times_are_reported() {
        let mut cat = catalog();
        cat.slots[0].start = "8:00".into();
        assert!(validate(&cat).is_err());
        cat.slots[0].start = "09:00".into();
        // ends before it starts
        assert!(validate(&cat).is_err());
    }

    #[test]
    fn entry_subject_must_match_class() {
        let cat = catalog();
        let e = TimetableEntry {
            id: EntryId("e1".into()),
            class_id: ClassId("c1".into()),
            subject_id: SubjectId("s1".into()),
            teacher_id: TeacherId("t1".into()),
            room_id: RoomId("r1".into()),
            slot_id: SlotId("p1".into()),
            day: DayOfWeek::Mon,
        };
        assert!(validate_entry(&cat, &e).is_ok());

        let mut other = e.clone();
        other.class_id = ClassId("nope".into());
        assert!(validate_entry(&cat, &other).is_err());
    }
}
