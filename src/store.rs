use crate::schedule::Schedule;
use crate::slots::{Day, GridConfig, TimeSlot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// A loaded timetable: the (possibly merged) schedule plus whatever title
/// the export carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedTimetable {
    pub title: Option<String>,
    pub schedule: Schedule,
}

/// Source of schedule data and sink for slot updates. The grid never talks
/// to a transport directly; production uses the JSON file a generator
/// export was saved to, tests substitute their own.
pub trait ScheduleStore: Send + Sync {
    fn load(&self) -> io::Result<LoadedTimetable>;

    /// Apply "move class to day/slot" and persist it. Mirrors the backend's
    /// `update_slot` operation; callers re-load afterwards to reconcile.
    fn update_slot(&self, class_id: &str, day: Day, slot: &TimeSlot) -> io::Result<()>;
}

/// Full generator export: `{ timetable_name, sections: [{ section_id,
/// schedule, .. }], .. }`. Unknown fields ride along so a rewrite does not
/// strip them.
#[derive(Debug, Serialize, Deserialize)]
struct TimetableExport {
    #[serde(default)]
    timetable_name: Option<String>,
    sections: Vec<SectionExport>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SectionExport {
    #[serde(default)]
    section_id: String,
    schedule: Schedule,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

enum ScheduleFile {
    Export(TimetableExport),
    Bare(Schedule),
}

#[derive(Debug, Clone)]
pub struct FileScheduleStore {
    path: PathBuf,
    section: Option<String>,
    config: GridConfig,
}

impl FileScheduleStore {
    pub fn new<P: AsRef<Path>>(path: P, section: Option<String>, config: GridConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            section,
            config,
        }
    }

    fn read(&self) -> io::Result<ScheduleFile> {
        let bytes = fs::read(&self.path)?;
        if let Ok(export) = serde_json::from_slice::<TimetableExport>(&bytes) {
            return Ok(ScheduleFile::Export(export));
        }
        serde_json::from_slice::<Schedule>(&bytes)
            .map(ScheduleFile::Bare)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
    }

    fn write(&self, file: &ScheduleFile) -> io::Result<()> {
        let data = match file {
            ScheduleFile::Export(export) => serde_json::to_vec_pretty(export),
            ScheduleFile::Bare(schedule) => serde_json::to_vec_pretty(schedule),
        }
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        fs::write(&self.path, data)
    }
}

impl ScheduleStore for FileScheduleStore {
    fn load(&self) -> io::Result<LoadedTimetable> {
        match self.read()? {
            ScheduleFile::Bare(mut schedule) => {
                if let Some(section) = &self.section {
                    schedule.retain_section(section);
                }
                Ok(LoadedTimetable {
                    title: None,
                    schedule,
                })
            }
            ScheduleFile::Export(export) => {
                let mut schedule = Schedule::default();
                for section in &export.sections {
                    match &self.section {
                        Some(wanted) if *wanted != section.section_id => continue,
                        _ => schedule.merge(&section.schedule),
                    }
                }
                Ok(LoadedTimetable {
                    title: export.timetable_name,
                    schedule,
                })
            }
        }
    }

    fn update_slot(&self, class_id: &str, day: Day, slot: &TimeSlot) -> io::Result<()> {
        let mut file = self.read()?;
        let moved = match &mut file {
            ScheduleFile::Bare(schedule) => schedule.apply_move(class_id, day, slot, &self.config),
            ScheduleFile::Export(export) => export
                .sections
                .iter_mut()
                .any(|section| section.schedule.apply_move(class_id, day, slot, &self.config)),
        };
        if !moved {
            return Err(io::Error::new(
                ErrorKind::NotFound,
                format!("class {} not found in {}", class_id, self.path.display()),
            ));
        }
        self.write(&file)
    }
}
