use crate::slots::{Day, GridConfig, TimeSlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn one() -> usize {
    1
}

fn yes() -> bool {
    true
}

/// One scheduled occurrence of a course meeting, as the generator backend
/// exports it. Multi-slot classes are materialized once per covered slot;
/// only the entry with `is_start` carries the full `colspan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub class_id: String,
    /// Course display name.
    pub course: String,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub section: String,
    /// Open string; unknown values map to the default visual style.
    #[serde(default)]
    pub course_type: String,
    /// Total contiguous slots the class occupies.
    #[serde(default = "one")]
    pub duration: usize,
    #[serde(default = "yes")]
    pub is_start: bool,
    #[serde(default = "one")]
    pub colspan: usize,
}

impl Session {
    /// Slots this entry spans on the grid. Continuation entries always
    /// report 1 regardless of the parent class duration.
    pub fn span(&self) -> usize {
        self.colspan.max(1)
    }

    /// Grouping key for the legend: course id, falling back to the name
    /// when the backend left the id blank.
    pub fn course_key(&self) -> &str {
        if self.course_id.is_empty() {
            &self.course
        } else {
            &self.course_id
        }
    }
}

/// Sparse weekly schedule: day name -> slot key -> sessions.
///
/// Keys stay exactly as the backend sent them (including weekend days and
/// slot keys outside the configured axis); the grid and legend decide what
/// renders. The inner map is ordered by slot key, which for `HH:MM:SS`
/// bounds is chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule(pub BTreeMap<String, BTreeMap<String, Vec<Session>>>);

impl Schedule {
    pub fn sessions_at(&self, day: Day, slot: &TimeSlot) -> &[Session] {
        self.0
            .get(&day.to_string())
            .and_then(|slots| slots.get(&slot.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_occupied(&self, day: Day, slot: &TimeSlot) -> bool {
        !self.sessions_at(day, slot).is_empty()
    }

    /// Fold another section's schedule into this one (the combined
    /// timetable view). Sessions already present by `class_id` at the same
    /// day/slot are not duplicated.
    pub fn merge(&mut self, other: &Schedule) {
        for (day, slots) in &other.0 {
            let day_map = self.0.entry(day.clone()).or_default();
            for (key, sessions) in slots {
                let cell = day_map.entry(key.clone()).or_default();
                for session in sessions {
                    if !cell.iter().any(|s| s.class_id == session.class_id) {
                        cell.push(session.clone());
                    }
                }
            }
        }
    }

    /// Keep only sessions belonging to `section`, dropping emptied keys.
    pub fn retain_section(&mut self, section: &str) {
        for slots in self.0.values_mut() {
            for sessions in slots.values_mut() {
                sessions.retain(|s| s.section == section);
            }
            slots.retain(|_, sessions| !sessions.is_empty());
        }
        self.0.retain(|_, slots| !slots.is_empty());
    }

    /// Relocate a class to `day`/`slot`, re-materializing continuation
    /// entries along the configured axis. Returns false when `class_id` is
    /// unknown or the target slot is off the axis.
    pub fn apply_move(&mut self, class_id: &str, day: Day, slot: &TimeSlot, config: &GridConfig) -> bool {
        let Some(start_index) = config.slot_index(slot) else {
            return false;
        };
        let Some(template) = self
            .0
            .values()
            .flat_map(|slots| slots.values())
            .flat_map(|sessions| sessions.iter())
            .find(|s| s.class_id == class_id && s.is_start)
            .cloned()
        else {
            return false;
        };

        for slots in self.0.values_mut() {
            for sessions in slots.values_mut() {
                sessions.retain(|s| s.class_id != class_id);
            }
            slots.retain(|_, sessions| !sessions.is_empty());
        }
        self.0.retain(|_, slots| !slots.is_empty());

        let span = template.duration.max(template.span());
        let day_map = self.0.entry(day.to_string()).or_default();
        for offset in 0..span {
            let Some(key_slot) = config.slots.get(start_index + offset) else {
                break;
            };
            let mut entry = template.clone();
            entry.is_start = offset == 0;
            entry.colspan = if offset == 0 { span } else { 1 };
            day_map
                .entry(key_slot.to_string())
                .or_default()
                .push(entry);
        }
        true
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn slot(key: &str) -> TimeSlot {
        key.parse().unwrap()
    }

    #[test]
    fn deserializes_backend_export_shape() {
        let json = r#"{
            "Monday": {
                "09:00:00-10:00:00": [{
                    "class_id": "c1", "course": "Algorithms", "course_id": "CS201",
                    "instructor": "Dr. Grey", "room": "R2", "section": "A",
                    "course_type": "lab", "duration": 2, "is_start": true, "colspan": 2
                }],
                "10:00:00-11:00:00": [{
                    "class_id": "c1", "course": "Algorithms", "course_id": "CS201",
                    "instructor": "Dr. Grey", "room": "R2", "section": "A",
                    "course_type": "lab", "duration": 2, "is_start": false, "colspan": 1
                }]
            }
        }"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        let start = &schedule.sessions_at(Day::Monday, &slot("09:00:00-10:00:00"))[0];
        assert!(start.is_start);
        assert_eq!(start.span(), 2);
        let cont = &schedule.sessions_at(Day::Monday, &slot("10:00:00-11:00:00"))[0];
        assert!(!cont.is_start);
        assert_eq!(cont.span(), 1);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"Monday": {"09:00:00-10:00:00": [{"class_id": "c1", "course": "Intro"}]}}"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        let s = &schedule.sessions_at(Day::Monday, &slot("09:00:00-10:00:00"))[0];
        assert!(s.is_start);
        assert_eq!(s.span(), 1);
        assert_eq!(s.course_type, "");
        assert_eq!(s.course_key(), "Intro");
    }

    #[test]
    fn course_key_prefers_id() {
        let s = session("c1", "Networks", "Dr. Blue");
        assert_eq!(s.course_key(), "Networks-ID");
    }

    #[test]
    fn sessions_at_unknown_location_is_empty() {
        let schedule = Schedule::default();
        assert!(schedule.sessions_at(Day::Monday, &slot("09:00:00-10:00:00")).is_empty());
        assert!(!schedule.is_occupied(Day::Monday, &slot("09:00:00-10:00:00")));
    }

    #[test]
    fn merge_combines_sections_without_duplicates() {
        let a = schedule_with(&[("Monday", "09:00:00-10:00:00", session("c1", "Intro", "Dr. Grey"))]);
        let mut combined = a.clone();
        let mut b = schedule_with(&[("Monday", "09:00:00-10:00:00", session("c2", "Logic", "Dr. Blue"))]);
        b.merge(&a);
        combined.merge(&b);
        let cell = combined.sessions_at(Day::Monday, &slot("09:00:00-10:00:00"));
        assert_eq!(cell.len(), 2);
    }

    #[test]
    fn retain_section_drops_other_sections() {
        let mut b = session("c2", "Logic", "Dr. Blue");
        b.section = "B".to_string();
        let mut schedule = schedule_with(&[
            ("Monday", "09:00:00-10:00:00", session("c1", "Intro", "Dr. Grey")),
            ("Monday", "10:00:00-11:00:00", b),
        ]);
        schedule.retain_section("A");
        assert!(schedule.is_occupied(Day::Monday, &slot("09:00:00-10:00:00")));
        assert!(!schedule.is_occupied(Day::Monday, &slot("10:00:00-11:00:00")));
    }

    #[test]
    fn apply_move_relocates_single_slot_class() {
        let config = GridConfig::default();
        let mut schedule =
            schedule_with(&[("Monday", "09:00:00-10:00:00", session("c1", "Intro", "Dr. Grey"))]);
        assert!(schedule.apply_move("c1", Day::Wednesday, &slot("10:00:00-11:00:00"), &config));
        assert!(!schedule.is_occupied(Day::Monday, &slot("09:00:00-10:00:00")));
        let moved = schedule.sessions_at(Day::Wednesday, &slot("10:00:00-11:00:00"));
        assert_eq!(moved.len(), 1);
        assert!(moved[0].is_start);
    }

    #[test]
    fn apply_move_rematerializes_continuations() {
        let config = GridConfig::default();
        let mut cont = spanning("c1", "Algorithms", 2);
        cont.is_start = false;
        cont.colspan = 1;
        let mut schedule = schedule_with(&[
            ("Monday", "09:00:00-10:00:00", spanning("c1", "Algorithms", 2)),
            ("Monday", "10:00:00-11:00:00", cont),
        ]);
        assert!(schedule.apply_move("c1", Day::Friday, &slot("09:00:00-10:00:00"), &config));
        let start = schedule.sessions_at(Day::Friday, &slot("09:00:00-10:00:00"));
        assert_eq!(start.len(), 1);
        assert_eq!(start[0].span(), 2);
        let cont = schedule.sessions_at(Day::Friday, &slot("10:00:00-11:00:00"));
        assert_eq!(cont.len(), 1);
        assert!(!cont[0].is_start);
        assert!(!schedule.0.contains_key("Monday"));
    }

    #[test]
    fn apply_move_unknown_class_is_noop() {
        let config = GridConfig::default();
        let mut schedule =
            schedule_with(&[("Monday", "09:00:00-10:00:00", session("c1", "Intro", "Dr. Grey"))]);
        let before = schedule.clone();
        assert!(!schedule.apply_move("nope", Day::Monday, &slot("10:00:00-11:00:00"), &config));
        assert_eq!(schedule, before);
    }

    #[test]
    fn apply_move_off_axis_slot_is_rejected() {
        let config = GridConfig::default();
        let mut schedule =
            schedule_with(&[("Monday", "09:00:00-10:00:00", session("c1", "Intro", "Dr. Grey"))]);
        assert!(!schedule.apply_move("c1", Day::Monday, &slot("23:00:00-23:59:00"), &config));
    }

    #[test]
    fn apply_move_clamps_span_at_end_of_axis() {
        let config = GridConfig::default();
        let mut schedule =
            schedule_with(&[("Monday", "09:00:00-10:00:00", spanning("c1", "Algorithms", 3))]);
        let last = *config.slots.last().unwrap();
        assert!(schedule.apply_move("c1", Day::Monday, &last, &config));
        let placed = schedule.sessions_at(Day::Monday, &last);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].span(), 3);
        // No continuation entries exist past the axis.
        let total: usize = schedule
            .0
            .values()
            .flat_map(|slots| slots.values())
            .map(|v| v.len())
            .sum();
        assert_eq!(total, 1);
    }
}
