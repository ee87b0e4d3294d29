use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::warn;

use crate::score::ScoreRecord;

/// Namespaced key the leaderboard is stored under
pub const LEADERBOARD_KEY: &str = "quickdraw.leaderboard";
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Durable string storage keyed by a fixed identifier
pub trait KeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Store rooted in the app state directory, falling back to the working dir
    pub fn in_state_dir() -> Self {
        Self::new(crate::app_dirs::AppDirs::state_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves a half-written board
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(tmp, path)
    }
}

/// In-memory store; clones share the same map, so a test can keep a handle
/// and "reload" from it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persisted top-N leaderboard ranked by hits
#[derive(Debug)]
pub struct ScoreStore<S: KeyValueStore> {
    backend: S,
    capacity: usize,
    records: Vec<ScoreRecord>,
}

impl<S: KeyValueStore> ScoreStore<S> {
    /// Load the board from `backend`. Missing or corrupt data yields an empty board.
    pub fn open(backend: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut records = match backend.get(LEADERBOARD_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<ScoreRecord>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "leaderboard data is corrupt, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "leaderboard could not be read, starting empty");
                Vec::new()
            }
        };
        rank(&mut records, capacity);

        Self {
            backend,
            capacity,
            records,
        }
    }

    pub fn record(&mut self, entry: ScoreRecord) -> io::Result<()> {
        self.records.push(entry);
        rank(&mut self.records, self.capacity);
        self.persist()
    }

    pub fn all(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn clear(&mut self) -> io::Result<()> {
        self.records.clear();
        self.persist()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 1-based leaderboard position of `entry`, if it made the cut
    pub fn rank_of(&self, entry: &ScoreRecord) -> Option<usize> {
        self.records.iter().position(|r| r == entry).map(|i| i + 1)
    }

    fn persist(&mut self) -> io::Result<()> {
        let data = serde_json::to_string(&self.records)?;
        self.backend.set(LEADERBOARD_KEY, &data)
    }
}

/// Highest hits first; `sort_by` is stable so ties keep insertion order.
fn rank(records: &mut Vec<ScoreRecord>, capacity: usize) {
    records.sort_by(|a, b| b.hits.cmp(&a.hits));
    records.truncate(capacity);
}
