use crate::api_model::Fields;
use crate::database_api::Document;
use crate::database_api::DocumentStore;
use crate::error::Error;
use crate::error::ErrorContext;
use crate::error::Result;
use async_trait::async_trait;
use log::debug;
use refinery::Runner;
use rusqlite::params;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use std::fs::create_dir_all;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use warp::http::StatusCode;

pub mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./res/migrations");
}

/// Run "refinery" migrations to bring the documents table up-to-date
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let runner: Runner = embedded::migrations::runner();
    runner.run(conn).map(|_report| ()).map_err(|e| e.into())
}

/// Document store kept in a local SQLite file, one JSON document per row.
///
/// Calls are executed on the blocking thread pool, one at a time.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    collection: String,
}

impl SqliteStore {
    pub fn open(path: &Path, collection: &str) -> Result<SqliteStore> {
        if let Some(dir) = path.parent() {
            create_dir_all(dir).context(|| format!("Failed to create directory {:?}", dir))?;
        }
        let conn = Connection::open(path)
            .context(|| format!("Failed to open database file {:?}", path))?;
        SqliteStore::with_connection(conn, collection)
    }

    pub fn open_in_memory(collection: &str) -> Result<SqliteStore> {
        SqliteStore::with_connection(Connection::open_in_memory()?, collection)
    }

    fn with_connection(mut conn: Connection, collection: &str) -> Result<SqliteStore> {
        migrate(&mut conn)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.to_string(),
        })
    }

    async fn run<T, F>(&self, func: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &str) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        let collection = self.collection.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock()?;
            func(&mut conn, &collection)
        })
        .await?
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, id: &str, data: &Fields) -> Result<()> {
        let id = id.to_string();
        let json = serde_json::to_string(data)?;
        self.run(move |conn, collection| {
            debug!("Inserting document {}/{}", collection, id);
            let mut stmt = conn.prepare_cached(
                "INSERT INTO documents (collection, id, data) VALUES (?, ?, ?);",
            )?;
            match stmt.execute(params![collection, id, json]) {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(Error {
                        code: StatusCode::CONFLICT,
                        msg: format!("Document {} already exists", id),
                    })
                }
                Err(err) => Err(err.into()),
            }
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<Fields>> {
        let id = id.to_string();
        self.run(move |conn, collection| {
            let data = select_data(conn, collection, &id)?;
            data.as_deref().map(parse_stored).transpose()
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Document>> {
        self.run(|conn, collection| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, data FROM documents WHERE collection = ? ORDER BY rowid;",
            )?;
            let rows = stmt.query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut result = Vec::new();
            for row in rows {
                let (id, data) = row?;
                let data = parse_stored(&data)?;
                result.push(Document { id, data });
            }
            Ok(result)
        })
        .await
    }

    async fn update(&self, id: &str, data: &Fields) -> Result<bool> {
        let id = id.to_string();
        let data = data.clone();
        self.run(move |conn, collection| {
            in_transaction(conn, |tx| {
                let stored = match select_data(tx, collection, &id)? {
                    Some(stored) => stored,
                    None => return Ok(false),
                };
                let mut merged = parse_stored(&stored)?;
                merged.extend(data);
                debug!("Updating document {}/{}", collection, id);
                let mut stmt = tx.prepare_cached(
                    "UPDATE documents SET data = ? WHERE collection = ? AND id = ?;",
                )?;
                stmt.execute(params![serde_json::to_string(&merged)?, collection, id])?;
                Ok(true)
            })
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.run(move |conn, collection| {
            debug!("Deleting document {}/{}", collection, id);
            let mut stmt =
                conn.prepare_cached("DELETE FROM documents WHERE collection = ? AND id = ?;")?;
            let deleted = stmt.execute(params![collection, id])?;
            Ok(deleted > 0)
        })
        .await
    }
}

fn in_transaction<T, F: FnOnce(&Transaction) -> Result<T>>(
    conn: &mut Connection,
    func: F,
) -> Result<T> {
    let tx = conn.transaction()?;
    let result = func(&tx)?; // Note that this function needs to exit early in case of error
    tx.commit()?;
    Ok(result)
}

fn select_data(conn: &Connection, collection: &str, id: &str) -> Result<Option<String>> {
    let mut stmt =
        conn.prepare_cached("SELECT data FROM documents WHERE collection = ? AND id = ?;")?;
    let data = stmt
        .query_row(params![collection, id], |row| row.get(0))
        .optional()?;
    Ok(data)
}

fn parse_stored(data: &str) -> Result<Fields> {
    serde_json::from_str(data).map_err(|err| Error {
        code: StatusCode::INTERNAL_SERVER_ERROR,
        msg: format!("Stored document is not a JSON object, {}", err),
    })
}
