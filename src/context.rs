use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use crate::database::Database;
use crate::error::KeyMapperError;
use crate::keymaps::KeyMapRepository;

/// Where the keymap store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    InMemory,
}

type Entry<T> = Mutex<Option<Arc<T>>>;

/// The long-lived services of the application, opened on first use.
///
/// Built once at startup and passed to whatever needs the store. When both
/// entries are locked, `keymaps` is always taken before `database`.
pub struct AppContext {
    location: DatabaseLocation,
    database: Entry<Mutex<Database>>,
    keymaps: Entry<KeyMapRepository>,
}

fn lock<T>(entry: &Entry<T>) -> Result<MutexGuard<'_, Option<Arc<T>>>, KeyMapperError> {
    entry
        .lock()
        .map_err(|_| KeyMapperError::Error("Context entry lock poisoned".to_string()))
}

impl AppContext {
    pub fn new(location: DatabaseLocation) -> Self {
        AppContext {
            location,
            database: Mutex::new(None),
            keymaps: Mutex::new(None),
        }
    }

    pub fn location(&self) -> &DatabaseLocation {
        &self.location
    }

    /// The open store. The first call opens it and runs any pending
    /// migration; the handle is only published once that has succeeded.
    pub fn database(&self) -> Result<Arc<Mutex<Database>>, KeyMapperError> {
        let mut entry = lock(&self.database)?;
        if let Some(db) = entry.as_ref() {
            return Ok(Arc::clone(db));
        }

        let db = match &self.location {
            DatabaseLocation::File(path) => Database::open(path)?,
            DatabaseLocation::InMemory => Database::open_in_memory()?,
        };
        let db = Arc::new(Mutex::new(db));
        *entry = Some(Arc::clone(&db));
        Ok(db)
    }

    pub fn keymaps(&self) -> Result<Arc<KeyMapRepository>, KeyMapperError> {
        let mut entry = lock(&self.keymaps)?;
        if let Some(repo) = entry.as_ref() {
            return Ok(Arc::clone(repo));
        }

        let repo = Arc::new(KeyMapRepository::new(self.database()?));
        *entry = Some(Arc::clone(&repo));
        Ok(repo)
    }

    /// Drop every entry. The next access opens them again.
    ///
    /// A file store keeps its data. An in-memory store lives only as long as
    /// its connection, so after a release the next access starts empty.
    pub fn release(&self) -> Result<(), KeyMapperError> {
        let mut keymaps = lock(&self.keymaps)?;
        let mut database = lock(&self.database)?;
        let was_open = database.is_some();
        *keymaps = None;
        *database = None;
        if was_open {
            info!("Released keymap store");
        }
        Ok(())
    }

    pub fn is_open(&self) -> Result<bool, KeyMapperError> {
        Ok(lock(&self.database)?.is_some())
    }
}
