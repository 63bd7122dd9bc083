use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell as TableCell, Paragraph, Row, Table, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::grid::{build_grid, resolve_origin, Cell, GridRow};
use crate::legend::build_legend;
use crate::theme::{lunch_style, type_style, type_tag};
use crate::{App, NoticeKind};

const DAY_COLUMN_WIDTH: u16 = 10;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let legend = build_legend(&self.schedule);
        let legend_height = if legend.is_empty() {
            3
        } else {
            (legend.len().min(6) + 3) as u16
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),             // title + selection banner
                Constraint::Min(12),               // grid
                Constraint::Length(legend_height), // legend
                Constraint::Length(1),             // status line
            ])
            .split(area);

        self.render_banner(chunks[0], buf);
        self.render_grid(chunks[1], buf);
        self.render_legend(&legend, chunks[2], buf);
        self.render_status(chunks[3], buf);
    }
}

impl App {
    fn render_banner(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let mut header = String::new();
        if let Some(title) = &self.title {
            header.push_str(title);
            header.push_str("  ");
        }
        header.push_str(if self.edit_mode {
            "[edit mode]"
        } else {
            "[view only]"
        });
        buf.set_string(
            area.x,
            area.y,
            fit(&header, area.width as usize),
            Style::default().add_modifier(Modifier::BOLD),
        );

        if area.height < 2 {
            return;
        }
        if let Some(session) = self.move_state.armed() {
            let line = format!(
                "Selected {} ({}) — pick an empty slot, esc cancels",
                session.course, session.instructor
            );
            buf.set_string(
                area.x,
                area.y + 1,
                fit(&line, area.width as usize),
                Style::default().fg(Color::Green),
            );
        }
    }

    fn render_grid(&self, area: Rect, buf: &mut Buffer) {
        let rows = build_grid(&self.schedule, &self.grid_config);
        let slot_count = self.grid_config.slots.len() as u16;
        if slot_count == 0 || area.width <= DAY_COLUMN_WIDTH || area.height < 3 {
            return;
        }
        let slot_w = ((area.width - DAY_COLUMN_WIDTH) / slot_count).max(6);

        self.render_grid_header(area, buf, slot_w);

        let mut y = area.y + 2;
        for (day_index, row) in rows.iter().enumerate() {
            let height = row_height(row);
            if y + height > area.bottom() {
                break;
            }
            self.render_day_row(row, day_index, area.x, y, slot_w, buf);
            y += height + 1;
        }
    }

    fn render_grid_header(&self, area: Rect, buf: &mut Buffer, slot_w: u16) {
        let dim = Style::default().fg(Color::Gray);
        buf.set_string(area.x, area.y, "Day", dim.add_modifier(Modifier::BOLD));
        for (index, slot) in self.grid_config.slots.iter().enumerate() {
            let x = area.x + DAY_COLUMN_WIDTH + index as u16 * slot_w;
            let lunch = self.grid_config.is_lunch(slot);
            let style = if lunch { lunch_style() } else { dim };
            buf.set_string(x, area.y, fit(&slot.label(), slot_w as usize - 1), style);
            if lunch {
                buf.set_string(x, area.y + 1, "LUNCH", lunch_style());
            }
        }
    }

    fn render_day_row(
        &self,
        row: &GridRow,
        day_index: usize,
        x0: u16,
        y: u16,
        slot_w: u16,
        buf: &mut Buffer,
    ) {
        let height = row_height(row);
        buf.set_string(
            x0,
            y,
            row.day.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        );

        let cursor_origin = if self.cursor.day == day_index {
            Some(resolve_origin(row, self.cursor.slot))
        } else {
            None
        };

        for (index, cell) in row.cells.iter().enumerate() {
            if matches!(cell, Cell::Skip) {
                continue;
            }
            let span = cell.span().min(row.cells.len() - index).max(1) as u16;
            let rect = Rect {
                x: x0 + DAY_COLUMN_WIDTH + index as u16 * slot_w,
                y,
                width: span * slot_w - 1,
                height,
            }
            .intersection(buf.area);
            if cursor_origin == Some(index) {
                buf.set_style(rect, Style::default().bg(Color::DarkGray));
            }
            self.render_cell(cell, rect, cursor_origin == Some(index), buf);
        }
    }

    fn render_cell(&self, cell: &Cell, rect: Rect, under_cursor: bool, buf: &mut Buffer) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let width = rect.width as usize;
        match cell {
            Cell::Skip => {}
            Cell::Lunch => {
                buf.set_string(rect.x, rect.y + rect.height / 2, fit("LUNCH BREAK", width), lunch_style());
            }
            Cell::Empty => {
                if self.edit_mode && self.move_state.is_armed() {
                    buf.set_string(
                        rect.x,
                        rect.y + rect.height / 2,
                        fit("· place here ·", width),
                        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                    );
                }
            }
            Cell::Content { sessions, .. } => {
                let highlighted = self.session_cycle % sessions.len();
                for (i, session) in sessions.iter().enumerate() {
                    let line_y = rect.y + (i as u16) * 2;
                    if line_y >= rect.y + rect.height {
                        break;
                    }
                    let mut style = type_style(&session.course_type);
                    let armed_here = self
                        .move_state
                        .armed()
                        .is_some_and(|armed| armed.class_id == session.class_id);
                    if armed_here {
                        style = style.add_modifier(Modifier::REVERSED);
                    } else if under_cursor && i == highlighted {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    let tag = type_tag(&session.course_type);
                    let head = if tag.is_empty() {
                        session.course.clone()
                    } else {
                        format!("{} {}", session.course, tag)
                    };
                    buf.set_string(rect.x, line_y, fit(&head, width), style);
                    if line_y + 1 < rect.y + rect.height {
                        let detail = format!("{} {}", session.room, session.instructor);
                        buf.set_string(
                            rect.x,
                            line_y + 1,
                            fit(detail.trim(), width),
                            Style::default().fg(Color::Gray),
                        );
                    }
                }
            }
        }
    }

    fn render_legend(&self, legend: &[crate::legend::LegendEntry], area: Rect, buf: &mut Buffer) {
        if legend.is_empty() {
            let empty = Paragraph::new("No classes scheduled")
                .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Instructors"));
            empty.render(area, buf);
            return;
        }

        let armed_instructor = self.move_state.armed().map(|s| s.instructor.clone());
        let rows: Vec<Row> = legend
            .iter()
            .map(|entry| {
                let course = if entry.course_id.is_empty() {
                    entry.course.clone()
                } else {
                    format!("{}  {}", entry.course_id, entry.course)
                };
                let mut spans: Vec<Span> = Vec::new();
                for (i, instructor) in entry.instructors.iter().enumerate() {
                    if i > 0 {
                        spans.push(Span::raw(", "));
                    }
                    let style = if armed_instructor.as_deref() == Some(instructor.as_str()) {
                        Style::default().fg(Color::Black).bg(Color::Blue)
                    } else {
                        Style::default()
                    };
                    spans.push(Span::styled(instructor.clone(), style));
                }
                Row::new(vec![
                    TableCell::from(course),
                    TableCell::from(Line::from(spans)),
                ])
            })
            .collect();

        let table = Table::new(rows, &[Constraint::Length(34), Constraint::Min(20)])
            .header(
                Row::new(vec!["Course", "Instructors"]).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            )
            .block(Block::default().borders(Borders::ALL).title("Instructors"));
        table.render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        if let Some(notice) = &self.notice {
            let style = match notice.kind {
                NoticeKind::Info => Style::default().fg(Color::Cyan),
                NoticeKind::Success => Style::default().fg(Color::Green),
                NoticeKind::Error => Style::default().fg(Color::Red),
            };
            buf.set_string(area.x, area.y, fit(&notice.text, area.width as usize), style);
        } else {
            let help = "(e)dit · enter select/place · tab cycle · (m)oves · (r)eload · esc/q quit";
            buf.set_string(
                area.x,
                area.y,
                fit(help, area.width as usize),
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            );
        }
    }
}

fn row_height(row: &GridRow) -> u16 {
    let max_sessions = row
        .cells
        .iter()
        .map(|cell| cell.sessions().len())
        .max()
        .unwrap_or(0)
        .max(1);
    (max_sessions * 2) as u16
}

/// Truncate to a display width, unicode-aware.
fn fit(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        if out.width() + 1 >= width {
            out.push('…');
            break;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_keeps_short_text() {
        assert_eq!(fit("short", 10), "short");
    }

    #[test]
    fn fit_truncates_with_ellipsis() {
        let out = fit("a very long cell label", 8);
        assert!(out.width() <= 8);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn fit_handles_zero_width() {
        assert_eq!(fit("", 0), "");
    }
}
