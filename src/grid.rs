use crate::schedule::{Schedule, Session};
use crate::slots::{Day, GridConfig};

/// Projection of one (day, slot) position.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// The lunch column. Always rendered as lunch regardless of any data
    /// keyed at the lunch slot.
    Lunch,
    /// Covered by an earlier multi-slot session; no independent cell is
    /// rendered, the covering cell extends over this position.
    Skip,
    /// Zero sessions, not lunch, not covered.
    Empty,
    /// Everything scheduled at this slot. `span` is the covering session's
    /// width when a multi-slot class starts here, else 1.
    Content { sessions: Vec<Session>, span: usize },
}

impl Cell {
    pub fn sessions(&self) -> &[Session] {
        match self {
            Cell::Content { sessions, .. } => sessions,
            _ => &[],
        }
    }

    pub fn span(&self) -> usize {
        match self {
            Cell::Content { span, .. } => *span,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub day: Day,
    pub cells: Vec<Cell>,
}

/// Map the sparse schedule onto the dense slot axis, row-major.
///
/// Each day is scanned left to right with a covered-until watermark: a
/// session with `is_start` and span > 1 at index `i` marks the following
/// `span - 1` positions as [`Cell::Skip`]. The watermark also advances from
/// data found at already-covered positions, so overlapping multi-slot
/// sessions (a backend inconsistency) skip-mark by first scan order. Data
/// keyed at the lunch slot never renders and never advances the watermark.
///
/// Pure function of its inputs; callers rebuild after every schedule change.
pub fn build_grid(schedule: &Schedule, config: &GridConfig) -> Vec<GridRow> {
    Day::ALL
        .iter()
        .map(|&day| GridRow {
            day,
            cells: build_day(schedule, config, day),
        })
        .collect()
}

fn build_day(schedule: &Schedule, config: &GridConfig, day: Day) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(config.slots.len());
    // Exclusive index bound: positions below it are covered.
    let mut covered_until = 0usize;

    for (index, slot) in config.slots.iter().enumerate() {
        if config.is_lunch(slot) {
            cells.push(Cell::Lunch);
            continue;
        }

        let sessions = schedule.sessions_at(day, slot);
        let start_span = sessions
            .iter()
            .find(|s| s.is_start && s.span() > 1)
            .map(Session::span);

        if index < covered_until {
            cells.push(Cell::Skip);
        } else if sessions.is_empty() {
            cells.push(Cell::Empty);
        } else {
            cells.push(Cell::Content {
                sessions: sessions.to_vec(),
                span: start_span.unwrap_or(1),
            });
        }

        if let Some(span) = start_span {
            covered_until = covered_until.max(index + span);
        }
    }

    cells
}

/// Resolve a cursor position to the cell that physically occupies it: a
/// [`Cell::Skip`] belongs to the covering cell to its left.
pub fn resolve_origin(row: &GridRow, slot_index: usize) -> usize {
    let mut index = slot_index.min(row.cells.len().saturating_sub(1));
    while index > 0 && matches!(row.cells[index], Cell::Skip) {
        index -= 1;
    }
    index
}
