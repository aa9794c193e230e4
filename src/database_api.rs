use crate::api_model::Fields;
use crate::command_line_interface::CliOptions;
use crate::command_line_interface::StoreBackend;
use crate::constants;
use crate::database_firestore::FirestoreStore;
use crate::database_sqlite::SqliteStore;
use crate::error::Error;
use crate::error::Result;
use async_trait::async_trait;
use log::info;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use warp::http::StatusCode;

/// A stored document together with the id it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

/// One collection of a document database.
///
/// Every operation is a single round trip to the backend.
/// Conditional operations (`update`, `delete`) check existence and write atomically,
/// and report a missing document as `Ok(false)`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document, failing if the id is already taken.
    async fn insert(&self, id: &str, data: &Fields) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<Fields>>;

    /// All documents of the collection, in the backend's iteration order.
    async fn list(&self) -> Result<Vec<Document>>;

    /// Overwrite the given fields of an existing document.
    /// Fields that are not part of `data` keep their stored values.
    async fn update(&self, id: &str, data: &Fields) -> Result<bool>;

    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Generate a new document id, the same shape as Firestore auto-ids.
pub fn generate_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(constants::DOCUMENT_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Open the document store selected on the command line.
pub async fn connect_store(cli_options: &CliOptions) -> Result<Arc<dyn DocumentStore>> {
    let collection = &cli_options.collection;
    match cli_options.store {
        StoreBackend::Sqlite => {
            info!(
                "Using SQLite document store {}, collection {}",
                cli_options.sqlite_file, collection
            );
            let store = SqliteStore::open(Path::new(&cli_options.sqlite_file), collection)?;
            Ok(Arc::new(store))
        }
        StoreBackend::Firestore => {
            let project = cli_options.firestore_project.as_ref().ok_or_else(|| Error {
                code: StatusCode::INTERNAL_SERVER_ERROR,
                msg: "Firestore store requires --firestore-project (or GOOGLE_CLOUD_PROJECT)"
                    .to_string(),
            })?;
            info!(
                "Using Firestore document store, project {}, collection {}",
                project, collection
            );
            let store = FirestoreStore::connect(project, collection).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_alphanumeric() {
        let id = generate_document_id();
        assert_eq!(id.len(), constants::DOCUMENT_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_ids_differ() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_document_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[tokio::test]
    async fn test_firestore_requires_project() {
        let mut cli = crate::command_line_interface::tests::test_cli();
        cli.store = StoreBackend::Firestore;
        cli.firestore_project = None;
        let err = connect_store(&cli).await.err().unwrap();
        assert_eq!(err.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.msg.contains("--firestore-project"));
    }
}
