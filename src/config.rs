use crate::slots::GridConfig;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub trait GridConfigStore {
    fn load(&self) -> GridConfig;
    fn save(&self, config: &GridConfig) -> std::io::Result<()>;
}

/// JSON-backed grid configuration (slot axis + lunch bounds). A missing or
/// invalid file yields the default deployment axis.
#[derive(Debug, Clone)]
pub struct FileGridConfigStore {
    path: PathBuf,
}

impl FileGridConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "rota") {
            pd.config_dir().join("grid.json")
        } else {
            PathBuf::from("rota_grid.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileGridConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GridConfigStore for FileGridConfigStore {
    fn load(&self) -> GridConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(config) = serde_json::from_slice::<GridConfig>(&bytes) {
                if config.is_valid() {
                    return config;
                }
            }
        }
        GridConfig::default()
    }

    fn save(&self, config: &GridConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(config).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::TimeSlot;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileGridConfigStore::with_path(dir.path().join("grid.json"));
        let config = GridConfig::default();
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let store = FileGridConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), GridConfig::default());
    }

    #[test]
    fn invalid_axis_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.json");
        // Two slots matching the lunch bounds: not a usable axis.
        let mut config = GridConfig::default();
        config.slots.push(config.lunch);
        fs::write(&path, serde_json::to_vec(&config).unwrap()).unwrap();
        let store = FileGridConfigStore::with_path(&path);
        assert_eq!(store.load(), GridConfig::default());
    }

    #[test]
    fn custom_axis_roundtrips() {
        let dir = tempdir().unwrap();
        let store = FileGridConfigStore::with_path(dir.path().join("grid.json"));
        let lunch = TimeSlot::from_hm((12, 0), (12, 30)).unwrap();
        let config = GridConfig {
            slots: vec![
                TimeSlot::from_hm((8, 0), (9, 0)).unwrap(),
                TimeSlot::from_hm((9, 0), (10, 0)).unwrap(),
                lunch,
                TimeSlot::from_hm((12, 30), (13, 30)).unwrap(),
            ],
            lunch,
        };
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }
}
