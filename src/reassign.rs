use crate::schedule::{Schedule, Session};
use crate::slots::{Day, GridConfig, TimeSlot};
use std::fmt;

/// Selection state for the two-step move interaction. Owned by the app and
/// passed around explicitly; never ambient.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Armed(Session),
}

impl MoveState {
    pub fn armed(&self) -> Option<&Session> {
        match self {
            MoveState::Armed(session) => Some(session),
            MoveState::Idle => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, MoveState::Armed(_))
    }
}

/// Why a click did not transition the machine. All are recovered locally;
/// a rejected target click keeps the current selection so the operator can
/// retry on a different slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EditModeRequired,
    TargetLunch,
    TargetOccupied,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Rejection::EditModeRequired => "enable edit mode to move classes",
            Rejection::TargetLunch => "cannot move classes into the lunch break",
            Rejection::TargetOccupied => "slot is already occupied, pick an empty one",
        };
        f.write_str(msg)
    }
}

/// A validated relocation, handed to the caller's update operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub class_id: String,
    pub course: String,
    pub day: Day,
    pub slot: TimeSlot,
}

impl MoveState {
    /// First click: pick the session to move. Only legal in edit mode;
    /// re-clicking with another session abandons the prior selection.
    pub fn session_click(&mut self, session: &Session, edit_mode: bool) -> Result<(), Rejection> {
        if !edit_mode {
            return Err(Rejection::EditModeRequired);
        }
        *self = MoveState::Armed(session.clone());
        Ok(())
    }

    /// Second click: pick the destination. Validates against the lunch
    /// bounds and current occupancy; on success the selection clears
    /// immediately and the returned request is dispatched by the caller
    /// (the machine itself performs no I/O).
    pub fn slot_click(
        &mut self,
        day: Day,
        slot: &TimeSlot,
        schedule: &Schedule,
        config: &GridConfig,
        edit_mode: bool,
    ) -> Result<Option<MoveRequest>, Rejection> {
        let MoveState::Armed(session) = self else {
            return Ok(None);
        };
        if !edit_mode {
            return Ok(None);
        }
        if config.is_lunch(slot) {
            return Err(Rejection::TargetLunch);
        }
        if schedule.is_occupied(day, slot) {
            return Err(Rejection::TargetOccupied);
        }

        let request = MoveRequest {
            class_id: session.class_id.clone(),
            course: session.course.clone(),
            day,
            slot: *slot,
        };
        *self = MoveState::Idle;
        Ok(Some(request))
    }

    /// Explicit cancel. Returns whether a selection was dropped.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_armed();
        *self = MoveState::Idle;
        was_armed
    }
}
