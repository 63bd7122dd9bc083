use ratatui::style::{Color, Modifier, Style};

/// Visual category for a session cell. `course_type` is an open string from
/// the backend; everything unrecognized (including blank) maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Lab,
    Theory,
    Practical,
    Other,
}

pub fn classify(course_type: &str) -> TypeClass {
    match course_type.trim().to_lowercase().as_str() {
        "lab" => TypeClass::Lab,
        "theory" => TypeClass::Theory,
        "practical" => TypeClass::Practical,
        _ => TypeClass::Other,
    }
}

pub fn type_style(course_type: &str) -> Style {
    let base = Style::default().add_modifier(Modifier::BOLD);
    match classify(course_type) {
        TypeClass::Lab => base.fg(Color::Yellow),
        TypeClass::Theory => base.fg(Color::Green),
        TypeClass::Practical => base.fg(Color::Magenta),
        TypeClass::Other => base.fg(Color::White),
    }
}

/// Short tag rendered next to the course code.
pub fn type_tag(course_type: &str) -> &'static str {
    match classify(course_type) {
        TypeClass::Lab => "lab",
        TypeClass::Theory => "thy",
        TypeClass::Practical => "prc",
        TypeClass::Other => "",
    }
}

pub fn lunch_style() -> Style {
    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
}
