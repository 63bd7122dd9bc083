use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One interval on the grid's time axis, second precision.
///
/// The canonical key form is `HH:MM:SS-HH:MM:SS`, matching the keys the
/// generator backend uses in its schedule export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build a slot from `(hour, minute)` pairs; seconds are always zero.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Option<Self> {
        Some(Self::new(
            NaiveTime::from_hms_opt(start.0, start.1, 0)?,
            NaiveTime::from_hms_opt(end.0, end.1, 0)?,
        ))
    }

    /// Display label with seconds truncated: `HH:MM - HH:MM`.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M:%S"),
            self.end.format("%H:%M:%S")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSlotError(String);

impl fmt::Display for ParseSlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time slot: {}", self.0)
    }
}

impl std::error::Error for ParseSlotError {}

impl FromStr for TimeSlot {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| ParseSlotError(s.to_string()))?;
        let parse = |t: &str| {
            NaiveTime::parse_from_str(t.trim(), "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(t.trim(), "%H:%M"))
                .map_err(|_| ParseSlotError(s.to_string()))
        };
        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ParseSlotError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Rendered weekday. Weekend keys in schedule data are never rendered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::Display,
)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Parse a backend day-name key. Unknown names (e.g. `Saturday`) yield
    /// `None`, which callers treat as "not rendered".
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Monday" => Some(Day::Monday),
            "Tuesday" => Some(Day::Tuesday),
            "Wednesday" => Some(Day::Wednesday),
            "Thursday" => Some(Day::Thursday),
            "Friday" => Some(Day::Friday),
            _ => None,
        }
    }
}

/// The fixed time axis for a grid: an ordered slot sequence plus the lunch
/// interval. Lunch bounds come from configuration, never from schedule data,
/// so the lunch column renders even on days with no scheduled sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    pub slots: Vec<TimeSlot>,
    pub lunch: TimeSlot,
}

impl Default for GridConfig {
    fn default() -> Self {
        let hm = |s, e| TimeSlot::from_hm(s, e).unwrap();
        Self {
            slots: vec![
                hm((9, 0), (10, 0)),
                hm((10, 0), (11, 0)),
                hm((11, 0), (12, 0)),
                hm((12, 0), (13, 0)),
                hm((13, 0), (13, 45)), // lunch break
                hm((13, 45), (14, 45)),
                hm((14, 45), (15, 45)),
                hm((15, 45), (16, 45)),
            ],
            lunch: hm((13, 0), (13, 45)),
        }
    }
}

impl GridConfig {
    /// Literal comparison against the configured lunch bounds.
    pub fn is_lunch(&self, slot: &TimeSlot) -> bool {
        slot.start == self.lunch.start && slot.end == self.lunch.end
    }

    pub fn slot_index(&self, slot: &TimeSlot) -> Option<usize> {
        self.slots.iter().position(|s| s == slot)
    }

    pub fn lunch_index(&self) -> Option<usize> {
        self.slots.iter().position(|s| self.is_lunch(s))
    }

    /// A usable axis has at least one teaching slot and exactly one slot
    /// matching the lunch bounds.
    pub fn is_valid(&self) -> bool {
        self.slots.len() > 1 && self.slots.iter().filter(|s| self.is_lunch(s)).count() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_key_roundtrip() {
        let slot: TimeSlot = "09:00:00-10:00:00".parse().unwrap();
        assert_eq!(slot.to_string(), "09:00:00-10:00:00");
        assert_eq!(slot.label(), "09:00 - 10:00");
    }

    #[test]
    fn slot_parses_without_seconds() {
        let slot: TimeSlot = "09:00-10:00".parse().unwrap();
        assert_eq!(slot.to_string(), "09:00:00-10:00:00");
    }

    #[test]
    fn slot_rejects_garbage() {
        assert!("".parse::<TimeSlot>().is_err());
        assert!("nine to ten".parse::<TimeSlot>().is_err());
        assert!("09:00:00".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn slot_serde_uses_key_form() {
        let slot: TimeSlot = "13:00:00-13:45:00".parse().unwrap();
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, "\"13:00:00-13:45:00\"");
        let back: TimeSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);
    }

    #[test]
    fn day_names_roundtrip() {
        for day in Day::ALL {
            assert_eq!(Day::from_name(&day.to_string()), Some(day));
        }
    }

    #[test]
    fn weekend_days_are_not_rendered() {
        assert_eq!(Day::from_name("Saturday"), None);
        assert_eq!(Day::from_name("Sunday"), None);
        assert_eq!(Day::from_name("monday"), None);
    }

    #[test]
    fn default_config_has_eight_slots_and_one_lunch() {
        let config = GridConfig::default();
        assert_eq!(config.slots.len(), 8);
        assert_eq!(config.lunch_index(), Some(4));
        assert!(config.is_valid());
    }

    #[test]
    fn lunch_is_literal_bounds_comparison() {
        let config = GridConfig::default();
        let lunch: TimeSlot = "13:00:00-13:45:00".parse().unwrap();
        let not_lunch: TimeSlot = "13:00:00-14:00:00".parse().unwrap();
        assert!(config.is_lunch(&lunch));
        assert!(!config.is_lunch(&not_lunch));
    }

    #[test]
    fn config_with_duplicate_lunch_is_invalid() {
        let mut config = GridConfig::default();
        config.slots.push(config.lunch);
        assert!(!config.is_valid());
    }
}
