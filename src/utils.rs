pub mod db {
    use anyhow::Result;
    use rusqlite::{OptionalExtension, Transaction};

    pub fn init_metadata_and_get_version(tx: &Transaction) -> Result<i32> {
        let create_db_metadata_sql = "
        CREATE TABLE IF NOT EXISTS `db_metadata` (
        `key`	TEXT NOT NULL,
        `value`	TEXT,
        PRIMARY KEY(`key`)
        )";
        tx.execute(create_db_metadata_sql, ())?;

        let version_str: Option<String> = tx
            .query_row(
                "SELECT `value` FROM `db_metadata` WHERE key='version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match version_str {
            None => Ok(0),
            Some(s) => Ok(s.parse::<i32>()?),
        }
    }

    pub fn set_version_in_metadata(tx: &Transaction, version: i32) -> Result<()> {
        tx.execute(
            "INSERT OR REPLACE INTO `db_metadata` (key, value) VALUES (?1, ?2)",
            ("version", version.to_string()),
        )?;
        Ok(())
    }
}

// Java-style split: trailing empty pieces are dropped, so `"1,2,"` has two
// fields and `";;"` has none.
pub fn split_dropping_trailing_empty(s: &str, separator: char) -> Vec<&str> {
    let mut pieces: Vec<&str> = s.split(separator).collect();
    while pieces.last().is_some_and(|x| x.is_empty()) {
        pieces.pop();
    }
    pieces
}
