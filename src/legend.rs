use crate::schedule::Schedule;
use crate::slots::Day;
use std::collections::HashMap;

/// Derived course -> instructor-set view for the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub course_id: String,
    pub course: String,
    pub instructors: Vec<String>,
}

/// Scan every (day, slot) of the schedule in fixed day order (weekend keys
/// skipped, slot keys in chronological order) and group sessions by course.
/// Entries appear in first-encounter order; instructors accumulate as a
/// deduplicated list in encounter order.
pub fn build_legend(schedule: &Schedule) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for day in Day::ALL {
        let Some(slots) = schedule.0.get(&day.to_string()) else {
            continue;
        };
        for sessions in slots.values() {
            for session in sessions {
                let key = session.course_key().to_string();
                let index = *by_key.entry(key).or_insert_with(|| {
                    entries.push(LegendEntry {
                        course_id: session.course_id.clone(),
                        course: session.course.clone(),
                        instructors: Vec::new(),
                    });
                    entries.len() - 1
                });
                let entry = &mut entries[index];
                if !entry.instructors.iter().any(|i| i == &session.instructor) {
                    entry.instructors.push(session.instructor.clone());
                }
            }
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::fixtures::{schedule_with, session};

    #[test]
    fn groups_shared_course_across_instructors() {
        let mut first = session("c1", "Networks", "Dr. Grey");
        first.course_id = "CS101".to_string();
        let mut second = session("c2", "Networks", "Dr. Blue");
        second.course_id = "CS101".to_string();
        let schedule = schedule_with(&[
            ("Monday", "09:00:00-10:00:00", first),
            ("Wednesday", "10:00:00-11:00:00", second),
        ]);

        let legend = build_legend(&schedule);
        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].course_id, "CS101");
        assert_eq!(legend[0].instructors, vec!["Dr. Grey", "Dr. Blue"]);
    }

    #[test]
    fn falls_back_to_course_name_without_id() {
        let mut a = session("c1", "Seminar", "Dr. Grey");
        a.course_id = String::new();
        let mut b = session("c2", "Seminar", "Dr. Grey");
        b.course_id = String::new();
        let schedule = schedule_with(&[
            ("Monday", "09:00:00-10:00:00", a),
            ("Monday", "10:00:00-11:00:00", b),
        ]);

        let legend = build_legend(&schedule);
        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].instructors, vec!["Dr. Grey"]);
    }

    #[test]
    fn order_is_first_encounter_in_day_then_slot_scan() {
        let schedule = schedule_with(&[
            ("Friday", "09:00:00-10:00:00", session("c3", "Zoology", "Dr. Zed")),
            ("Monday", "10:00:00-11:00:00", session("c1", "Botany", "Dr. Bee")),
            ("Monday", "09:00:00-10:00:00", session("c2", "Anatomy", "Dr. Ay")),
        ]);

        let legend = build_legend(&schedule);
        let courses: Vec<&str> = legend.iter().map(|e| e.course.as_str()).collect();
        assert_eq!(courses, vec!["Anatomy", "Botany", "Zoology"]);
    }

    #[test]
    fn weekend_sessions_are_excluded() {
        let schedule = schedule_with(&[
            ("Saturday", "09:00:00-10:00:00", session("c1", "Ghost", "Dr. Grey")),
        ]);
        assert!(build_legend(&schedule).is_empty());
    }

    #[test]
    fn empty_schedule_yields_empty_legend() {
        assert!(build_legend(&Schedule::default()).is_empty());
    }

    #[test]
    fn duplicate_instructor_listed_once() {
        let schedule = schedule_with(&[
            ("Monday", "09:00:00-10:00:00", session("c1", "Intro", "Dr. Grey")),
            ("Tuesday", "09:00:00-10:00:00", session("c2", "Intro", "Dr. Grey")),
        ]);
        let legend = build_legend(&schedule);
        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].instructors, vec!["Dr. Grey"]);
    }
}
