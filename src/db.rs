use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Transaction};

use crate::parser::kind::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexRecord {
    pub name: String,
    pub kind: EntityKind,
    pub path: String,
}

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    Ok(conn)
}

/// Drop the search index if present and create it empty.
pub fn reset_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS searchIndex;
        CREATE TABLE searchIndex (
            id   INTEGER PRIMARY KEY,
            name TEXT,
            type TEXT,
            path TEXT
        );
        CREATE UNIQUE INDEX anchor ON searchIndex (name, type, path);
        ",
    )?;
    Ok(())
}

/// Returns how many rows were actually written; duplicates count as zero.
pub fn insert_record(tx: &Transaction, record: &IndexRecord) -> Result<usize> {
    let n = tx
        .prepare_cached("INSERT OR IGNORE INTO searchIndex (name, type, path) VALUES (?1, ?2, ?3)")?
        .execute(params![record.name, record.kind.as_str(), record.path])?;
    Ok(n)
}

pub fn fetch_records(conn: &Connection) -> Result<Vec<IndexRecord>> {
    let mut stmt = conn.prepare("SELECT name, type, path FROM searchIndex ORDER BY name, type, path")?;
    let rows = stmt
        .query_map([], |row| {
            let kind: String = row.get(1)?;
            Ok(IndexRecord {
                name: row.get(0)?,
                kind: EntityKind::parse(&kind).unwrap_or(EntityKind::Unknown),
                path: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Row count per entity type, ordered by type name.
pub fn kind_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare("SELECT type, COUNT(*) FROM searchIndex GROUP BY type ORDER BY type")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
