use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use rusqlite::params;
use serde::Serialize;

use crate::database::Database;
use crate::error::KeyMapperError;
use crate::model::current::{Action, Constraint, Trigger};
use crate::model::{self, v9};
use crate::schema::rows::{self, Columns, KeymapRow};

/// A keymap as stored at the current schema version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMap {
    pub id: i64,
    pub uid: String,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    pub constraints: Vec<Constraint>,
    pub constraint_mode: i64,
    pub flags: i64,
    pub folder_name: Option<String>,
    pub is_enabled: bool,
}

/// A keymap that hasn't been stored yet. Blank uids are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewKeyMap {
    pub uid: String,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    pub constraints: Vec<Constraint>,
    pub constraint_mode: i64,
    pub flags: i64,
    pub folder_name: Option<String>,
    pub is_enabled: bool,
}

impl NewKeyMap {
    pub fn new(trigger: Trigger, actions: Vec<Action>) -> Self {
        NewKeyMap {
            uid: String::new(),
            trigger,
            actions,
            constraints: Vec::new(),
            constraint_mode: model::CONSTRAINT_MODE_AND,
            flags: 0,
            folder_name: None,
            is_enabled: true,
        }
    }
}

impl KeyMap {
    fn from_stored(row: KeymapRow) -> Result<Self, KeyMapperError> {
        Ok(KeyMap {
            id: row.id,
            uid: row.uid.unwrap_or_default(),
            trigger: model::decode(row.id, "trigger", &row.trigger)?,
            actions: model::decode(row.id, "action_list", &row.action_list)?,
            constraints: model::decode(row.id, "constraint_list", &row.constraint_list)?,
            constraint_mode: row.constraint_mode,
            flags: row.flags,
            folder_name: row.folder_name,
            is_enabled: row.is_enabled,
        })
    }
}

fn fill_uid(uid: &mut String) {
    if uid.is_empty() {
        *uid = v9::new_uid();
    }
}

/// Reads and writes current-shape keymaps.
pub struct KeyMapRepository {
    db: Arc<Mutex<Database>>,
}

impl KeyMapRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        KeyMapRepository { db }
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>, KeyMapperError> {
        self.db
            .lock()
            .map_err(|_| KeyMapperError::Error("Database lock poisoned".to_string()))
    }

    pub fn all(&self) -> Result<Vec<KeyMap>, KeyMapperError> {
        let db = self.db()?;
        rows::load_keymaps(db.conn(), Columns::WithUid)?
            .into_iter()
            .map(KeyMap::from_stored)
            .collect()
    }

    pub fn get(&self, id: i64) -> Result<Option<KeyMap>, KeyMapperError> {
        let db = self.db()?;
        rows::load_keymap(db.conn(), Columns::WithUid, id)?
            .map(KeyMap::from_stored)
            .transpose()
    }

    pub fn insert(&self, mut keymap: NewKeyMap) -> Result<KeyMap, KeyMapperError> {
        fill_uid(&mut keymap.uid);
        keymap.trigger.keys.iter_mut().for_each(|key| fill_uid(&mut key.uid));
        keymap.actions.iter_mut().for_each(|action| fill_uid(&mut action.uid));

        let db = self.db()?;
        let id: i64 = db.conn().query_row(
            "INSERT INTO keymaps (trigger, action_list, constraint_list, constraint_mode, flags, folder_name, is_enabled, uid)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                model::encode(&keymap.trigger)?,
                model::encode(&keymap.actions)?,
                model::encode(&keymap.constraints)?,
                keymap.constraint_mode,
                keymap.flags,
                keymap.folder_name,
                keymap.is_enabled,
                keymap.uid,
            ],
            |row| row.get(0),
        )?;
        debug!("Inserted keymap {} ({})", id, keymap.uid);

        Ok(KeyMap {
            id,
            uid: keymap.uid,
            trigger: keymap.trigger,
            actions: keymap.actions,
            constraints: keymap.constraints,
            constraint_mode: keymap.constraint_mode,
            flags: keymap.flags,
            folder_name: keymap.folder_name,
            is_enabled: keymap.is_enabled,
        })
    }

    /// Returns false if no keymap has this id.
    pub fn set_enabled(&self, id: i64, enabled: bool) -> Result<bool, KeyMapperError> {
        let db = self.db()?;
        let updated = db
            .conn()
            .execute("UPDATE keymaps SET is_enabled = ? WHERE id = ?", params![enabled, id])?;
        Ok(updated == 1)
    }

    pub fn delete_all(&self) -> Result<usize, KeyMapperError> {
        let db = self.db()?;
        let deleted = db.conn().execute("DELETE FROM keymaps", [])?;
        Ok(deleted)
    }

    pub fn count(&self) -> Result<i64, KeyMapperError> {
        let db = self.db()?;
        let count = db.conn().query_row("SELECT count(*) FROM keymaps", [], |row| row.get(0))?;
        Ok(count)
    }
}
