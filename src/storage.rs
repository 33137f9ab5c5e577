use crate::model::{self, Funnel};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Storage key for the whole funnel snapshot, one JSON array blob.
const FUNNELS_KEY: &str = "funnels_data";
/// Storage key for the simulated pairing flag, stored as "true"/"false".
const CONNECTED_KEY: &str = "whatsapp_connected";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no data directory available")]
    NoDataDir,
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn db_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "techview", "TechLeads")?;
    Some(proj.data_dir().join("techleads.sqlite"))
}

fn ensure_dir(path: &PathBuf) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn open_conn() -> Result<Connection, StorageError> {
    let path = db_path().ok_or(StorageError::NoDataDir)?;
    let _ = ensure_dir(&path);
    Ok(Connection::open(path)?)
}

fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

pub fn init() -> Result<(), StorageError> {
    let conn = open_conn()?;
    init_schema(&conn)
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
    let value = stmt
        .query_row(params![key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        r#"
        INSERT INTO kv (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        params![key, value],
    )?;
    Ok(())
}

/// Missing or unparseable snapshots degrade to the seed funnel set; the user
/// never sees a load error.
fn load_funnels_from(conn: &Connection) -> Vec<Funnel> {
    match read_value(conn, FUNNELS_KEY) {
        Ok(Some(blob)) => match serde_json::from_str::<Vec<Funnel>>(&blob) {
            Ok(funnels) => funnels,
            Err(e) => {
                log::warn!("stored funnel snapshot is unreadable, using defaults: {e}");
                model::seed_funnels()
            }
        },
        Ok(None) => model::seed_funnels(),
        Err(e) => {
            log::warn!("could not read funnel snapshot, using defaults: {e}");
            model::seed_funnels()
        }
    }
}

fn save_funnels_to(conn: &Connection, funnels: &[Funnel]) -> Result<(), StorageError> {
    let blob = serde_json::to_string(funnels)?;
    write_value(conn, FUNNELS_KEY, &blob)
}

fn load_connected_from(conn: &Connection) -> bool {
    matches!(read_value(conn, CONNECTED_KEY), Ok(Some(v)) if v == "true")
}

fn save_connected_to(conn: &Connection, connected: bool) -> Result<(), StorageError> {
    write_value(conn, CONNECTED_KEY, if connected { "true" } else { "false" })
}

pub fn load_funnels() -> Vec<Funnel> {
    match open_conn() {
        Ok(conn) => load_funnels_from(&conn),
        Err(e) => {
            log::warn!("storage unavailable, using default funnels: {e}");
            model::seed_funnels()
        }
    }
}

/// Whole-value replace of the snapshot row; every mutation re-serializes the
/// complete funnel list.
pub fn save_funnels(funnels: &[Funnel]) -> Result<(), StorageError> {
    let conn = open_conn()?;
    save_funnels_to(&conn, funnels)
}

pub fn load_connected() -> bool {
    match open_conn() {
        Ok(conn) => load_connected_from(&conn),
        Err(_) => false,
    }
}

pub fn save_connected(connected: bool) -> Result<(), StorageError> {
    let conn = open_conn()?;
    save_connected_to(&conn, connected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed_funnels;

    fn mem_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn snapshot_round_trips_deep_equal() {
        let conn = mem_conn();
        let funnels = seed_funnels();
        save_funnels_to(&conn, &funnels).unwrap();
        let loaded = load_funnels_from(&conn);
        assert_eq!(
            serde_json::to_value(&loaded).unwrap(),
            serde_json::to_value(&funnels).unwrap()
        );
    }

    #[test]
    fn missing_snapshot_yields_the_seed_set() {
        let conn = mem_conn();
        let loaded = load_funnels_from(&conn);
        assert_eq!(loaded[0].id, "f1");
        assert_eq!(loaded[0].stages.len(), 2);
    }

    #[test]
    fn corrupt_snapshot_yields_the_seed_set() {
        let conn = mem_conn();
        write_value(&conn, FUNNELS_KEY, "{not json at all").unwrap();
        let loaded = load_funnels_from(&conn);
        assert_eq!(loaded[0].id, "f1");

        // wrong shape counts as corrupt too
        write_value(&conn, FUNNELS_KEY, r#"{"id":"f9"}"#).unwrap();
        assert_eq!(load_funnels_from(&conn)[0].id, "f1");
    }

    #[test]
    fn saving_overwrites_the_single_row() {
        let conn = mem_conn();
        let mut funnels = seed_funnels();
        save_funnels_to(&conn, &funnels).unwrap();
        funnels[0].name = "Renomeado".into();
        save_funnels_to(&conn, &funnels).unwrap();

        let loaded = load_funnels_from(&conn);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Renomeado");
    }

    #[test]
    fn connected_flag_defaults_to_false_and_round_trips() {
        let conn = mem_conn();
        assert!(!load_connected_from(&conn));
        save_connected_to(&conn, true).unwrap();
        assert!(load_connected_from(&conn));
        save_connected_to(&conn, false).unwrap();
        assert!(!load_connected_from(&conn));

        // unrecognised stored values read as disconnected
        write_value(&conn, CONNECTED_KEY, "yes").unwrap();
        assert!(!load_connected_from(&conn));
    }
}
