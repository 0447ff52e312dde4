use super::{PersistenceError, PersistenceResult, ReleaseStore};
use crate::Release;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

pub struct SqliteReleaseStore {
    connection: Mutex<Connection>,
}

impl SqliteReleaseStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS releases (
                id TEXT PRIMARY KEY,
                release_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection mutex poisoned".into()))
    }
}

impl ReleaseStore for SqliteReleaseStore {
    fn save_release(&self, release: &Release) -> PersistenceResult<()> {
        super::validate_release(release)?;
        let json = serde_json::to_string(release)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO releases (id, release_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET release_json = excluded.release_json",
            params![release.id, json],
        )?;
        tracing::info!(release = %release.id, "release stored in sqlite");
        Ok(())
    }

    fn load_release(&self, release_id: &str) -> PersistenceResult<Option<Release>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT release_json FROM releases WHERE id = ?1")?;
        let json: Option<String> = stmt
            .query_row(params![release_id], |row| row.get(0))
            .optional()?;

        let Some(json) = json else {
            return Ok(None);
        };
        let release: Release = serde_json::from_str(&json)?;
        super::validate_release(&release)?;
        Ok(Some(release))
    }

    fn list_release_ids(&self) -> PersistenceResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id FROM releases ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(id?);
        }
        Ok(ids)
    }

    fn delete_release(&self, release_id: &str) -> PersistenceResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM releases WHERE id = ?1", params![release_id])?;
        Ok(removed > 0)
    }
}
