use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(ClassId);
id_newtype!(SubjectId);
id_newtype!(TeacherId);
id_newtype!(RoomId);
id_newtype!(SlotId);
id_newtype!(EntryId);
id_newtype!(SwapRequestId);

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl DayOfWeek {
    /// School week, Monday first. Generation fills Monday and replicates the rest.
    pub const WEEK: [DayOfWeek; 5] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SchoolClass {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TimeSlot {
    pub id: SlotId,
    pub label: String,
    /// "HH:MM", 24h.
    pub start: String,
    pub end: String,
    /// Position of the slot within a day; rows in views are ordered by this.
    pub order: u32,
}

pub fn is_valid_hhmm(s: &str) -> bool {
    let parts: Vec<_> = s.split(':').collect();
    if parts.len() != 2 || parts[0].len() != 2 || parts[1].len() != 2 {
        return false;
    }
    let (Ok(h), Ok(m)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) else {
        return false;
    };
    h < 24 && m < 60
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub class_id: ClassId,
    pub teacher_id: TeacherId,
    /// Elective blocks: may share a (class, slot) cell with other subjects.
    #[serde(default)]
    pub multi_slot_allowed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: EntryId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    /// Denormalized from the subject when the entry is written.
    pub teacher_id: TeacherId,
    pub room_id: RoomId,
    pub slot_id: SlotId,
    pub day: DayOfWeek,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: SwapRequestId,
    pub from_teacher: TeacherId,
    pub to_teacher: TeacherId,
    pub entry_a: EntryId,
    pub entry_b: EntryId,
    pub status: SwapStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

/// Everything generation and validation read: the full entity catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Catalog {
    pub classes: Vec<SchoolClass>,
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
    pub rooms: Vec<Room>,
    pub slots: Vec<TimeSlot>,
}

impl Catalog {
    pub fn class(&self, id: &ClassId) -> Option<&SchoolClass> {
        self.classes.iter().find(|c| &c.id == id)
    }
    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }
    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teachers.iter().find(|t| &t.id == id)
    }
    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| &r.id == id)
    }
    pub fn slot(&self, id: &SlotId) -> Option<&TimeSlot> {
        self.slots.iter().find(|s| &s.id == id)
    }

    /// Slots ordered by their in-day position, id as tiebreak.
    pub fn ordered_slots(&self) -> Vec<&TimeSlot> {
        let mut slots: Vec<&TimeSlot> = self.slots.iter().collect();
        slots.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.0.cmp(&b.id.0)));
        slots
    }
}

// ---- request/response payloads ----

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct NewSchoolClass {
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct NewTeacher {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct NewRoom {
    pub name: String,
    pub capacity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct NewTimeSlot {
    pub label: String,
    pub start: String,
    pub end: String,
    pub order: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    pub class_id: ClassId,
    pub teacher_id: TeacherId,
    #[serde(default)]
    pub multi_slot_allowed: bool,
}

/// Manual per-entry assignment; omitted fields keep the entry's current value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub slot_id: Option<SlotId>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilter {
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
    #[serde(default)]
    pub day: Option<DayOfWeek>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
    /// Fixed seed reproduces a timetable; omitted means a fresh random one.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReport {
    /// Scope the run covered; both `None` means the whole school.
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
    pub seed: u64,
    /// Entries deleted before the fill (the previous timetable in scope).
    pub replaced: usize,
    pub created: usize,
    pub entries: Vec<TimetableEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSwapRequest {
    pub entry_a: EntryId,
    pub entry_b: EntryId,
    /// Required when an admin files the request on a teacher's behalf;
    /// teachers file as themselves and leave it unset.
    #[serde(default)]
    pub from_teacher: Option<TeacherId>,
    #[serde(default)]
    pub note: Option<String>,
}
