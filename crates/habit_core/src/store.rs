use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::habit::Habit;

/// Persistence collaborator. The service owns the in-memory collection and
/// hands the full snapshot over on every save.
pub trait HabitStore: Send + Sync {
    fn load(&self) -> Result<Vec<Habit>>;
    fn persist(&self, habits: &[Habit]) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    habits: Mutex<Vec<Habit>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_habits(habits: Vec<Habit>) -> Self {
        Self {
            habits: Mutex::new(habits),
        }
    }
}

impl HabitStore for MemoryStore {
    fn load(&self) -> Result<Vec<Habit>> {
        Ok(self.habits.lock().clone())
    }

    fn persist(&self, habits: &[Habit]) -> Result<()> {
        *self.habits.lock() = habits.to_vec();
        Ok(())
    }
}

/// Stores every habit, with its logs and reminder, in one JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HabitStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Habit>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.path)
            .with_context(|| format!("reading habit store {}", self.path.display()))?;
        let mut habits: Vec<Habit> = serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding habit store {}", self.path.display()))?;
        for habit in &mut habits {
            let merged = habit.repair_logs();
            if merged > 0 {
                tracing::warn!(habit = %habit.id, merged, "merged duplicate day logs");
            }
        }
        Ok(habits)
    }

    fn persist(&self, habits: &[Habit]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating habit store directory {}", parent.display()))?;
            }
        }
        let payload = serde_json::to_vec_pretty(habits)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload)
            .with_context(|| format!("writing habit store {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("replacing habit store {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), count = habits.len(), "habit store persisted");
        Ok(())
    }
}
