use crate::error::PlaygroundError;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// Persistence collaborator for the exported database payload.
pub trait StateStore {
    fn save(&self, payload: &[u8]) -> Result<(), PlaygroundError>;
    fn load(&self) -> Result<Option<Vec<u8>>, PlaygroundError>;
    fn clear(&self) -> Result<(), PlaygroundError>;
}

const STATE_KEY: &[u8] = b"sqliteDb";

#[derive(Clone)]
pub struct SledStateStore {
    db: sled::Db,
    state: sled::Tree,
}

impl SledStateStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlaygroundError> {
        let db = sled::open(path)?;
        let state = db.open_tree("state")?;
        Ok(Self { db, state })
    }

    pub fn flush(&self) -> Result<(), PlaygroundError> {
        self.state.flush()?;
        self.db.flush()?;
        Ok(())
    }
}

impl StateStore for SledStateStore {
    fn save(&self, payload: &[u8]) -> Result<(), PlaygroundError> {
        self.state.insert(STATE_KEY, payload)?;
        self.flush()
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PlaygroundError> {
        Ok(self.state.get(STATE_KEY)?.map(|v| v.to_vec()))
    }

    fn clear(&self) -> Result<(), PlaygroundError> {
        self.state.remove(STATE_KEY)?;
        self.flush()
    }
}

/// Keeps the payload in process memory. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn save(&self, payload: &[u8]) -> Result<(), PlaygroundError> {
        *self.slot.lock() = Some(payload.to_vec());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PlaygroundError> {
        Ok(self.slot.lock().clone())
    }

    fn clear(&self) -> Result<(), PlaygroundError> {
        self.slot.lock().take();
        Ok(())
    }
}
