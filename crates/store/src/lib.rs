use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use timetable_core::{check_assign, check_swap, ConflictError};
use types::{
    is_valid_hhmm, Catalog, ClassId, EntryFilter, EntryId, EntryPatch, NewRoom, NewSchoolClass,
    NewSubject, NewSwapRequest, NewTeacher, NewTimeSlot, Room, RoomId, SchoolClass, SlotId,
    Subject, SubjectId, SwapRequest, SwapRequestId, SwapStatus, Teacher, TeacherId, TimeSlot,
    TimetableEntry,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    ForeignKey(String),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error("swap request {id} is already {status}")]
    InvalidTransition { id: String, status: &'static str },
    #[error("entry {entry} is not taught by {teacher}")]
    NotOwner { entry: String, teacher: String },
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[derive(Default)]
struct Db {
    classes: HashMap<String, SchoolClass>,
    subjects: HashMap<String, Subject>,
    teachers: HashMap<String, Teacher>,
    rooms: HashMap<String, Room>,
    slots: HashMap<String, TimeSlot>,
    entries: HashMap<String, TimetableEntry>,
    swaps: HashMap<String, SwapRequest>,
}

impl Db {
    fn subjects_vec(&self) -> Vec<Subject> {
        self.subjects.values().cloned().collect()
    }
    fn entries_vec(&self) -> Vec<TimetableEntry> {
        self.entries.values().cloned().collect()
    }

    /// Remove the given entries and every swap request touching one of them.
    fn drop_entries(&mut self, ids: &[String]) {
        for id in ids {
            self.entries.remove(id);
        }
        let entries = &self.entries;
        self.swaps.retain(|_, s| {
            entries.contains_key(&s.entry_a.0) && entries.contains_key(&s.entry_b.0)
        });
    }
}

/// In-memory repository. Everything lives behind one RwLock so multi-step
/// mutations (cascades, generation replace) are atomic to readers.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<Db>>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn sorted_by_id<T, F: Fn(&T) -> &str>(mut v: Vec<T>, key: F) -> Vec<T> {
    v.sort_by(|a, b| key(a).cmp(key(b)));
    v
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every catalog entity, id-sorted for stable iteration.
    pub fn catalog(&self) -> Catalog {
        let db = self.inner.read();
        Catalog {
            classes: sorted_by_id(db.classes.values().cloned().collect(), |c| &c.id.0),
            subjects: sorted_by_id(db.subjects.values().cloned().collect(), |s| &s.id.0),
            teachers: sorted_by_id(db.teachers.values().cloned().collect(), |t| &t.id.0),
            rooms: sorted_by_id(db.rooms.values().cloned().collect(), |r| &r.id.0),
            slots: sorted_by_id(db.slots.values().cloned().collect(), |s| &s.id.0),
        }
    }

    // ---- classes ----

    pub fn list_classes(&self) -> Vec<SchoolClass> {
        sorted_by_id(self.inner.read().classes.values().cloned().collect(), |c| {
            &c.id.0
        })
    }

    pub fn get_class(&self, id: &ClassId) -> Result<SchoolClass, StoreError> {
        self.inner
            .read()
            .classes
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("class", &id.0))
    }

    pub fn create_class(&self, new: NewSchoolClass) -> SchoolClass {
        let class = SchoolClass {
            id: ClassId(new_id()),
            name: new.name,
            section: new.section,
        };
        self.inner
            .write()
            .classes
            .insert(class.id.0.clone(), class.clone());
        class
    }

    pub fn update_class(&self, id: &ClassId, new: NewSchoolClass) -> Result<SchoolClass, StoreError> {
        let mut db = self.inner.write();
        let class = db
            .classes
            .get_mut(&id.0)
            .ok_or_else(|| not_found("class", &id.0))?;
        class.name = new.name;
        class.section = new.section;
        Ok(class.clone())
    }

    pub fn delete_class(&self, id: &ClassId) -> Result<(), StoreError> {
        let mut db = self.inner.write();
        db.classes
            .remove(&id.0)
            .ok_or_else(|| not_found("class", &id.0))?;
        db.subjects.retain(|_, s| s.class_id != *id);
        let dead: Vec<String> = db
            .entries
            .values()
            .filter(|e| e.class_id == *id)
            .map(|e| e.id.0.clone())
            .collect();
        db.drop_entries(&dead);
        Ok(())
    }

    // ---- teachers ----

    pub fn list_teachers(&self) -> Vec<Teacher> {
        sorted_by_id(self.inner.read().teachers.values().cloned().collect(), |t| {
            &t.id.0
        })
    }

    pub fn get_teacher(&self, id: &TeacherId) -> Result<Teacher, StoreError> {
        self.inner
            .read()
            .teachers
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("teacher", &id.0))
    }

    pub fn create_teacher(&self, new: NewTeacher) -> Teacher {
        let teacher = Teacher {
            id: TeacherId(new_id()),
            name: new.name,
            email: new.email,
        };
        self.inner
            .write()
            .teachers
            .insert(teacher.id.0.clone(), teacher.clone());
        teacher
    }

    pub fn update_teacher(&self, id: &TeacherId, new: NewTeacher) -> Result<Teacher, StoreError> {
        let mut db = self.inner.write();
        let teacher = db
            .teachers
            .get_mut(&id.0)
            .ok_or_else(|| not_found("teacher", &id.0))?;
        teacher.name = new.name;
        teacher.email = new.email;
        Ok(teacher.clone())
    }

    pub fn delete_teacher(&self, id: &TeacherId) -> Result<(), StoreError> {
        let mut db = self.inner.write();
        db.teachers
            .remove(&id.0)
            .ok_or_else(|| not_found("teacher", &id.0))?;
        let dead_subjects: Vec<String> = db
            .subjects
            .values()
            .filter(|s| s.teacher_id == *id)
            .map(|s| s.id.0.clone())
            .collect();
        for sid in &dead_subjects {
            db.subjects.remove(sid);
        }
        let dead: Vec<String> = db
            .entries
            .values()
            .filter(|e| dead_subjects.contains(&e.subject_id.0))
            .map(|e| e.id.0.clone())
            .collect();
        db.drop_entries(&dead);
        Ok(())
    }

    // ---- rooms ----

    pub fn list_rooms(&self) -> Vec<Room> {
        sorted_by_id(self.inner.read().rooms.values().cloned().collect(), |r| {
            &r.id.0
        })
    }

    pub fn get_room(&self, id: &RoomId) -> Result<Room, StoreError> {
        self.inner
            .read()
            .rooms
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("room", &id.0))
    }

    pub fn create_room(&self, new: NewRoom) -> Result<Room, StoreError> {
        if new.capacity == 0 {
            return Err(StoreError::Invalid("room capacity must be positive".into()));
        }
        let room = Room {
            id: RoomId(new_id()),
            name: new.name,
            capacity: new.capacity,
        };
        self.inner
            .write()
            .rooms
            .insert(room.id.0.clone(), room.clone());
        Ok(room)
    }

    pub fn update_room(&self, id: &RoomId, new: NewRoom) -> Result<Room, StoreError> {
        if new.capacity == 0 {
            return Err(StoreError::Invalid("room capacity must be positive".into()));
        }
        let mut db = self.inner.write();
        let room = db
            .rooms
            .get_mut(&id.0)
            .ok_or_else(|| not_found("room", &id.0))?;
        room.name = new.name;
        room.capacity = new.capacity;
        Ok(room.clone())
    }

    pub fn delete_room(&self, id: &RoomId) -> Result<(), StoreError> {
        let mut db = self.inner.write();
        db.rooms
            .remove(&id.0)
            .ok_or_else(|| not_found("room", &id.0))?;
        let dead: Vec<String> = db
            .entries
            .values()
            .filter(|e| e.room_id == *id)
            .map(|e| e.id.0.clone())
            .collect();
        db.drop_entries(&dead);
        Ok(())
    }

    // ---- time slots ----

    pub fn list_slots(&self) -> Vec<TimeSlot> {
        let mut v: Vec<TimeSlot> = self.inner.read().slots.values().cloned().collect();
        v.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.0.cmp(&b.id.0)));
        v
    }

    pub fn get_slot(&self, id: &SlotId) -> Result<TimeSlot, StoreError> {
        self.inner
            .read()
            .slots
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("slot", &id.0))
    }

    fn check_slot(new: &NewTimeSlot) -> Result<(), StoreError> {
        if !is_valid_hhmm(&new.start) || !is_valid_hhmm(&new.end) {
            return Err(StoreError::Invalid(format!(
                "slot times must be HH:MM, got {}-{}",
                new.start, new.end
            )));
        }
        if new.start >= new.end {
            return Err(StoreError::Invalid(format!(
                "slot must end after it starts, got {}-{}",
                new.start, new.end
            )));
        }
        Ok(())
    }

    pub fn create_slot(&self, new: NewTimeSlot) -> Result<TimeSlot, StoreError> {
        Self::check_slot(&new)?;
        let mut db = self.inner.write();
        if db.slots.values().any(|s| s.order == new.order) {
            return Err(StoreError::Invalid(format!(
                "slot order {} is already taken",
                new.order
            )));
        }
        let slot = TimeSlot {
            id: SlotId(new_id()),
            label: new.label,
            start: new.start,
            end: new.end,
            order: new.order,
        };
        db.slots.insert(slot.id.0.clone(), slot.clone());
        Ok(slot)
    }

    pub fn update_slot(&self, id: &SlotId, new: NewTimeSlot) -> Result<TimeSlot, StoreError> {
        Self::check_slot(&new)?;
        let mut db = self.inner.write();
        if db
            .slots
            .values()
            .any(|s| s.order == new.order && s.id.0 != id.0)
        {
            return Err(StoreError::Invalid(format!(
                "slot order {} is already taken",
                new.order
            )));
        }
        let slot = db
            .slots
            .get_mut(&id.0)
            .ok_or_else(|| not_found("slot", &id.0))?;
        slot.label = new.label;
        slot.start = new.start;
        slot.end = new.end;
        slot.order = new.order;
        Ok(slot.clone())
    }

    pub fn delete_slot(&self, id: &SlotId) -> Result<(), StoreError> {
        let mut db = self.inner.write();
        db.slots
            .remove(&id.0)
            .ok_or_else(|| not_found("slot", &id.0))?;
        let dead: Vec<String> = db
            .entries
            .values()
            .filter(|e| e.slot_id == *id)
            .map(|e| e.id.0.clone())
            .collect();
        db.drop_entries(&dead);
        Ok(())
    }

    // ---- subjects ----

    pub fn list_subjects(&self) -> Vec<Subject> {
        sorted_by_id(self.inner.read().subjects.values().cloned().collect(), |s| {
            &s.id.0
        })
    }

    pub fn get_subject(&self, id: &SubjectId) -> Result<Subject, StoreError> {
        self.inner
            .read()
            .subjects
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("subject", &id.0))
    }

    pub fn create_subject(&self, new: NewSubject) -> Result<Subject, StoreError> {
        let mut db = self.inner.write();
        if !db.classes.contains_key(&new.class_id.0) {
            return Err(StoreError::ForeignKey(format!(
                "class {} does not exist",
                new.class_id.0
            )));
        }
        if !db.teachers.contains_key(&new.teacher_id.0) {
            return Err(StoreError::ForeignKey(format!(
                "teacher {} does not exist",
                new.teacher_id.0
            )));
        }
        let subject = Subject {
            id: SubjectId(new_id()),
            name: new.name,
            class_id: new.class_id,
            teacher_id: new.teacher_id,
            multi_slot_allowed: new.multi_slot_allowed,
        };
        db.subjects.insert(subject.id.0.clone(), subject.clone());
        Ok(subject)
    }

    pub fn update_subject(&self, id: &SubjectId, new: NewSubject) -> Result<Subject, StoreError> {
        let mut db = self.inner.write();
        if !db.classes.contains_key(&new.class_id.0) {
            return Err(StoreError::ForeignKey(format!(
                "class {} does not exist",
                new.class_id.0
            )));
        }
        if !db.teachers.contains_key(&new.teacher_id.0) {
            return Err(StoreError::ForeignKey(format!(
                "teacher {} does not exist",
                new.teacher_id.0
            )));
        }
        if !db.subjects.contains_key(&id.0) {
            return Err(not_found("subject", &id.0));
        }
        // A reassigned subject drags its entries' denormalized teacher along; a
        // class change orphans existing entries, so those are dropped.
        let class_changed = db.subjects[&id.0].class_id != new.class_id;
        let subject = db.subjects.get_mut(&id.0).unwrap();
        subject.name = new.name;
        subject.class_id = new.class_id;
        subject.teacher_id = new.teacher_id.clone();
        subject.multi_slot_allowed = new.multi_slot_allowed;
        let out = subject.clone();

        if class_changed {
            let dead: Vec<String> = db
                .entries
                .values()
                .filter(|e| e.subject_id == *id)
                .map(|e| e.id.0.clone())
                .collect();
            db.drop_entries(&dead);
        } else {
            for e in db.entries.values_mut().filter(|e| e.subject_id == *id) {
                e.teacher_id = new.teacher_id.clone();
            }
        }
        Ok(out)
    }

    pub fn delete_subject(&self, id: &SubjectId) -> Result<(), StoreError> {
        let mut db = self.inner.write();
        db.subjects
            .remove(&id.0)
            .ok_or_else(|| not_found("subject", &id.0))?;
        let dead: Vec<String> = db
            .entries
            .values()
            .filter(|e| e.subject_id == *id)
            .map(|e| e.id.0.clone())
            .collect();
        db.drop_entries(&dead);
        Ok(())
    }

    // ---- timetable entries ----

    pub fn list_entries(&self, filter: &EntryFilter) -> Vec<TimetableEntry> {
        let db = self.inner.read();
        let slot_order: HashMap<&str, u32> = db
            .slots
            .values()
            .map(|s| (s.id.0.as_str(), s.order))
            .collect();
        let mut out: Vec<TimetableEntry> = db
            .entries
            .values()
            .filter(|e| match &filter.class_id {
                Some(c) => e.class_id == *c,
                None => true,
            })
            .filter(|e| match &filter.teacher_id {
                Some(t) => e.teacher_id == *t,
                None => true,
            })
            .filter(|e| match filter.day {
                Some(d) => e.day == d,
                None => true,
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            let oa = slot_order.get(a.slot_id.0.as_str()).copied().unwrap_or(0);
            let ob = slot_order.get(b.slot_id.0.as_str()).copied().unwrap_or(0);
            a.day
                .cmp(&b.day)
                .then(oa.cmp(&ob))
                .then_with(|| a.class_id.0.cmp(&b.class_id.0))
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        out
    }

    pub fn get_entry(&self, id: &EntryId) -> Result<TimetableEntry, StoreError> {
        self.inner
            .read()
            .entries
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("entry", &id.0))
    }

    /// Manual assignment: change an entry's subject, room and/or slot, refusing
    /// edits that collide with another entry of the same class and slot.
    pub fn assign_entry(
        &self,
        id: &EntryId,
        patch: EntryPatch,
    ) -> Result<TimetableEntry, StoreError> {
        let mut db = self.inner.write();
        let mut candidate = db
            .entries
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("entry", &id.0))?;

        if let Some(sid) = patch.subject_id {
            let subject = db
                .subjects
                .get(&sid.0)
                .ok_or_else(|| StoreError::ForeignKey(format!("subject {} does not exist", sid.0)))?;
            if subject.class_id != candidate.class_id {
                return Err(StoreError::Invalid(format!(
                    "subject {} belongs to class {}, entry is for class {}",
                    sid.0, subject.class_id.0, candidate.class_id.0
                )));
            }
            candidate.teacher_id = subject.teacher_id.clone();
            candidate.subject_id = sid;
        }
        if let Some(rid) = patch.room_id {
            if !db.rooms.contains_key(&rid.0) {
                return Err(StoreError::ForeignKey(format!("room {} does not exist", rid.0)));
            }
            candidate.room_id = rid;
        }
        if let Some(slid) = patch.slot_id {
            if !db.slots.contains_key(&slid.0) {
                return Err(StoreError::ForeignKey(format!("slot {} does not exist", slid.0)));
            }
            candidate.slot_id = slid;
        }

        let subjects = db.subjects_vec();
        let entries = db.entries_vec();
        check_assign(&subjects, &entries, &candidate)?;
        db.entries.insert(id.0.clone(), candidate.clone());
        Ok(candidate)
    }

    /// Exchange the subjects (and teacher denorms) of two entries.
    pub fn swap_entries(
        &self,
        a: &EntryId,
        b: &EntryId,
    ) -> Result<(TimetableEntry, TimetableEntry), StoreError> {
        let mut db = self.inner.write();
        db.swap_entries_locked(a, b)
    }

    /// Delete every entry in the scope and insert the replacement set. Used by
    /// generation so a re-run replaces instead of accumulating.
    pub fn replace_entries(
        &self,
        class_id: Option<&ClassId>,
        teacher_id: Option<&TeacherId>,
        new: Vec<TimetableEntry>,
    ) -> usize {
        let mut db = self.inner.write();
        let dead: Vec<String> = db
            .entries
            .values()
            .filter(|e| match class_id {
                Some(c) => e.class_id == *c,
                None => true,
            })
            .filter(|e| match teacher_id {
                Some(t) => e.teacher_id == *t,
                None => true,
            })
            .map(|e| e.id.0.clone())
            .collect();
        let replaced = dead.len();
        db.drop_entries(&dead);
        for e in new {
            db.entries.insert(e.id.0.clone(), e);
        }
        replaced
    }

    // ---- swap requests ----

    pub fn create_swap_request(
        &self,
        from: &TeacherId,
        new: NewSwapRequest,
    ) -> Result<SwapRequest, StoreError> {
        let mut db = self.inner.write();
        let a = db
            .entries
            .get(&new.entry_a.0)
            .cloned()
            .ok_or_else(|| not_found("entry", &new.entry_a.0))?;
        let b = db
            .entries
            .get(&new.entry_b.0)
            .cloned()
            .ok_or_else(|| not_found("entry", &new.entry_b.0))?;
        if a.teacher_id != *from {
            return Err(StoreError::NotOwner {
                entry: a.id.0.clone(),
                teacher: from.0.clone(),
            });
        }
        // Reject requests that could never apply.
        check_swap(&db.subjects_vec(), &db.entries_vec(), &a, &b)?;

        let req = SwapRequest {
            id: SwapRequestId(new_id()),
            from_teacher: from.clone(),
            to_teacher: b.teacher_id.clone(),
            entry_a: a.id.clone(),
            entry_b: b.id.clone(),
            status: SwapStatus::Pending,
            note: new.note,
            created_at: Utc::now(),
            decided_at: None,
        };
        db.swaps.insert(req.id.0.clone(), req.clone());
        Ok(req)
    }

    pub fn list_swap_requests(
        &self,
        teacher: Option<&TeacherId>,
        status: Option<SwapStatus>,
    ) -> Vec<SwapRequest> {
        let db = self.inner.read();
        let mut out: Vec<SwapRequest> = db
            .swaps
            .values()
            .filter(|s| match teacher {
                Some(t) => s.from_teacher == *t || s.to_teacher == *t,
                None => true,
            })
            .filter(|s| match status {
                Some(st) => s.status == st,
                None => true,
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        out
    }

    pub fn get_swap_request(&self, id: &SwapRequestId) -> Result<SwapRequest, StoreError> {
        self.inner
            .read()
            .swaps
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("swap request", &id.0))
    }

    /// Approve and apply. `decider` is the acting teacher; `None` means an admin
    /// is deciding. The conflict check runs again here: entries may have moved
    /// since the request was filed.
    pub fn approve_swap_request(
        &self,
        id: &SwapRequestId,
        decider: Option<&TeacherId>,
    ) -> Result<SwapRequest, StoreError> {
        let mut db = self.inner.write();
        let req = db
            .swaps
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("swap request", &id.0))?;
        Self::check_decidable(&req, decider)?;

        let (entry_a, entry_b) = (req.entry_a.clone(), req.entry_b.clone());
        db.swap_entries_locked(&entry_a, &entry_b)?;

        let req = db.swaps.get_mut(&id.0).unwrap();
        req.status = SwapStatus::Approved;
        req.decided_at = Some(Utc::now());
        Ok(req.clone())
    }

    pub fn reject_swap_request(
        &self,
        id: &SwapRequestId,
        decider: Option<&TeacherId>,
    ) -> Result<SwapRequest, StoreError> {
        let mut db = self.inner.write();
        let req = db
            .swaps
            .get(&id.0)
            .cloned()
            .ok_or_else(|| not_found("swap request", &id.0))?;
        Self::check_decidable(&req, decider)?;
        let req = db.swaps.get_mut(&id.0).unwrap();
        req.status = SwapStatus::Rejected;
        req.decided_at = Some(Utc::now());
        Ok(req.clone())
    }

    fn check_decidable(req: &SwapRequest, decider: Option<&TeacherId>) -> Result<(), StoreError> {
        match req.status {
            SwapStatus::Pending => {}
            SwapStatus::Approved => {
                return Err(StoreError::InvalidTransition {
                    id: req.id.0.clone(),
                    status: "approved",
                })
            }
            SwapStatus::Rejected => {
                return Err(StoreError::InvalidTransition {
                    id: req.id.0.clone(),
                    status: "rejected",
                })
            }
        }
        if let Some(t) = decider {
            if req.to_teacher != *t {
                return Err(StoreError::NotOwner {
                    entry: req.entry_b.0.clone(),
                    teacher: t.0.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Db {
    fn swap_entries_locked(
        &mut self,
        a: &EntryId,
        b: &EntryId,
    ) -> Result<(TimetableEntry, TimetableEntry), StoreError> {
        let ea = self
            .entries
            .get(&a.0)
            .cloned()
            .ok_or_else(|| not_found("entry", &a.0))?;
        let eb = self
            .entries
            .get(&b.0)
            .cloned()
            .ok_or_else(|| not_found("entry", &b.0))?;
        check_swap(&self.subjects_vec(), &self.entries_vec(), &ea, &eb)?;

        let mut na = ea.clone();
        na.subject_id = eb.subject_id.clone();
        na.teacher_id = eb.teacher_id.clone();
        let mut nb = eb.clone();
        nb.subject_id = ea.subject_id.clone();
        nb.teacher_id = ea.teacher_id.clone();
        self.entries.insert(na.id.0.clone(), na.clone());
        self.entries.insert(nb.id.0.clone(), nb.clone());
        Ok((na, nb))
    }
}
