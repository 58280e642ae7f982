use std::collections::HashSet;
use thiserror::Error;
use types::{ClassId, DayOfWeek, SlotId, Subject, TimetableEntry};

#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("slot {slot} on {day} is already taken for class {class}")]
    BlockedCell {
        class: String,
        slot: String,
        day: &'static str,
    },
    #[error("entries {a} and {b} belong to different classes")]
    ClassMismatch { a: String, b: String },
}

/// The used-slot set: a (class, slot, day) cell is blocked iff some entry with a
/// non-multi-slot subject occupies it. Multi-slot subjects never block, so
/// elective blocks can pile into one cell.
pub struct SlotUsage {
    blocked: HashSet<(String, String, DayOfWeek)>,
}

impl SlotUsage {
    pub fn build<'a, I>(entries: I, subjects: &[Subject]) -> Self
    where
        I: IntoIterator<Item = &'a TimetableEntry>,
    {
        let multi: HashSet<&str> = subjects
            .iter()
            .filter(|s| s.multi_slot_allowed)
            .map(|s| s.id.0.as_str())
            .collect();
        let mut blocked = HashSet::new();
        for e in entries {
            if !multi.contains(e.subject_id.0.as_str()) {
                blocked.insert((e.class_id.0.clone(), e.slot_id.0.clone(), e.day));
            }
        }
        Self { blocked }
    }

    pub fn is_blocked(&self, class: &ClassId, slot: &SlotId, day: DayOfWeek) -> bool {
        self.blocked
            .contains(&(class.0.clone(), slot.0.clone(), day))
    }
}

fn blocked_err(e: &TimetableEntry) -> ConflictError {
    ConflictError::BlockedCell {
        class: e.class_id.0.clone(),
        slot: e.slot_id.0.clone(),
        day: e.day.as_str(),
    }
}

/// Would `candidate` (an edited version of an existing entry) collide with the
/// rest of the timetable? The entry's previous position is ignored.
pub fn check_assign(
    subjects: &[Subject],
    entries: &[TimetableEntry],
    candidate: &TimetableEntry,
) -> Result<(), ConflictError> {
    let usage = SlotUsage::build(entries.iter().filter(|e| e.id != candidate.id), subjects);
    if usage.is_blocked(&candidate.class_id, &candidate.slot_id, candidate.day) {
        return Err(blocked_err(candidate));
    }
    Ok(())
}

/// Would exchanging the subjects of `a` and `b` leave a legal timetable?
/// Entries keep their cells; only the subjects (and their blocking nature) move.
pub fn check_swap(
    subjects: &[Subject],
    entries: &[TimetableEntry],
    a: &TimetableEntry,
    b: &TimetableEntry,
) -> Result<(), ConflictError> {
    if a.class_id != b.class_id {
        return Err(ConflictError::ClassMismatch {
            a: a.id.0.clone(),
            b: b.id.0.clone(),
        });
    }
    // Same cell: the exchange does not move anything, always fine.
    if a.slot_id == b.slot_id && a.day == b.day {
        return Ok(());
    }

    let usage = SlotUsage::build(
        entries.iter().filter(|e| e.id != a.id && e.id != b.id),
        subjects,
    );
    let mut a2 = a.clone();
    a2.subject_id = b.subject_id.clone();
    a2.teacher_id = b.teacher_id.clone();
    let mut b2 = b.clone();
    b2.subject_id = a.subject_id.clone();
    b2.teacher_id = a.teacher_id.clone();

    for e in [&a2, &b2] {
        if usage.is_blocked(&e.class_id, &e.slot_id, e.day) {
            return Err(blocked_err(e));
        }
    }
    Ok(())
}
