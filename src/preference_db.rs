use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::cmp::Ordering;
use std::path::Path;

use crate::utils;

/* Small key-value store backing the screen's preferences. Values are plain
strings grouped by a bucket name, the same shape as platform preference files
(a bucket is one "file", keys are unique within it).

Writes are synchronous: when `put_string` returns the value is committed.
*/

pub trait PreferenceStore {
    fn get_string(&mut self, bucket: &str, key: &str) -> Result<Option<String>>;

    fn put_string(&mut self, bucket: &str, key: &str, value: &str) -> Result<()>;

    fn get_string_with_default(&mut self, bucket: &str, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get_string(bucket, key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

#[allow(clippy::type_complexity)]
fn open_db_and_run_migration(
    support_dir: &str,
    file_name: &str,
    migrations: &[&dyn Fn(&Transaction) -> Result<()>],
) -> Result<Connection> {
    debug!("open and run migration for {}", file_name);
    let mut conn = Connection::open(Path::new(support_dir).join(file_name))?;
    let tx = conn.transaction()?;

    let version = utils::db::init_metadata_and_get_version(&tx)? as usize;
    let target_version = migrations.len();
    debug!(
        "current version = {}, target_version = {}",
        version, target_version
    );
    match version.cmp(&target_version) {
        Ordering::Equal => (),
        Ordering::Less => {
            for (i, migration) in migrations.iter().enumerate().skip(version) {
                info!("running migration for version: {}", i + 1);
                migration(&tx)?;
            }
            utils::db::set_version_in_metadata(&tx, target_version as i32)?;
        }
        Ordering::Greater => {
            bail!(
                "version too high: current version = {}, target_version = {}",
                version,
                target_version
            );
        }
    }
    tx.commit()?;
    Ok(conn)
}

pub struct PreferenceDb {
    conn: Connection,
}

impl PreferenceDb {
    pub fn open(support_dir: &str) -> Result<PreferenceDb> {
        let conn = open_db_and_run_migration(
            support_dir,
            "preferences.db",
            &[&|tx| {
                let sql = "
                CREATE TABLE preference (
                    bucket            TEXT    NOT NULL,
                    key               TEXT    NOT NULL,
                    value             TEXT    NOT NULL,
                    PRIMARY KEY (bucket, key)
                );
                ";
                for s in sql_split::split(sql) {
                    tx.execute(&s, ())?;
                }
                Ok(())
            }],
        )?;
        Ok(PreferenceDb { conn })
    }

    pub fn flush(&self) -> Result<()> {
        self.conn.cache_flush()?;
        Ok(())
    }

    pub fn remove(&mut self, bucket: &str, key: &str) -> Result<bool> {
        let changes = self.conn.execute(
            "DELETE FROM preference WHERE bucket = ?1 AND key = ?2;",
            (bucket, key),
        )?;
        Ok(changes > 0)
    }
}

impl PreferenceStore for PreferenceDb {
    fn get_string(&mut self, bucket: &str, key: &str) -> Result<Option<String>> {
        let mut query = self
            .conn
            .prepare_cached("SELECT value FROM preference WHERE bucket = ?1 AND key = ?2;")?;
        let value: Option<String> = query
            .query_row((bucket, key), |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn put_string(&mut self, bucket: &str, key: &str, value: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let sql = "INSERT OR REPLACE INTO preference (bucket, key, value) VALUES (?1, ?2, ?3);";
        tx.prepare_cached(sql)?.execute((bucket, key, value))?;
        tx.commit()?;
        Ok(())
    }
}
