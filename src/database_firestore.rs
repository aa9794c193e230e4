use crate::api_model::Fields;
use crate::constants;
use crate::database_api::Document;
use crate::database_api::DocumentStore;
use crate::error::Error;
use crate::error::ErrorContext;
use crate::error::Result;
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreDb;
use firestore::FirestoreWritePrecondition;
use log::debug;
use serde_json::Value;
use warp::http::StatusCode;

/// Field injected by the firestore client when documents are deserialized.
const FIRESTORE_ID_FIELD: &str = "_firestore_id";

/// Document store backed by a Google Firestore collection.
///
/// Credentials are resolved by the client from the environment
/// (`GOOGLE_APPLICATION_CREDENTIALS`, metadata server, or gcloud).
pub struct FirestoreStore {
    db: FirestoreDb,
    collection: String,
}

impl FirestoreStore {
    pub async fn connect(project_id: &str, collection: &str) -> Result<FirestoreStore> {
        let db = FirestoreDb::new(project_id)
            .await
            .context(|| format!("Failed to connect to Firestore project {}", project_id))?;
        Ok(FirestoreStore {
            db,
            collection: collection.to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn insert(&self, id: &str, data: &Fields) -> Result<()> {
        debug!("Inserting Firestore document {}/{}", self.collection, id);
        let result: std::result::Result<Fields, FirestoreError> = self
            .db
            .fluent()
            .insert()
            .into(self.collection.as_str())
            .document_id(id)
            .object(data)
            .execute()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(FirestoreError::DataConflictError(_)) => Err(Error {
                code: StatusCode::CONFLICT,
                msg: format!("Document {} already exists", id),
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Fields>> {
        let document: Option<Fields> = self
            .db
            .fluent()
            .select()
            .by_id_in(self.collection.as_str())
            .obj::<Fields>()
            .one(id)
            .await?;
        Ok(document.map(|mut data| {
            strip_client_fields(&mut data);
            data
        }))
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let documents: Vec<Fields> = self
            .db
            .fluent()
            .select()
            .from(self.collection.as_str())
            .obj::<Fields>()
            .query()
            .await?;
        documents.into_iter().map(into_document).collect()
    }

    async fn update(&self, id: &str, data: &Fields) -> Result<bool> {
        debug!("Updating Firestore document {}/{}", self.collection, id);
        // Only the listed fields are written, the rest of the document is left untouched.
        let field_paths: Vec<String> = data.keys().map(|name| quote_field_path(name)).collect();
        let result: std::result::Result<Fields, FirestoreError> = self
            .db
            .fluent()
            .update()
            .fields(field_paths)
            .in_col(self.collection.as_str())
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .object(data)
            .execute()
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(FirestoreError::DataNotFoundError(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        debug!("Deleting Firestore document {}/{}", self.collection, id);
        let result = self
            .db
            .fluent()
            .delete()
            .from(self.collection.as_str())
            .document_id(id)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .execute()
            .await;
        match result {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataNotFoundError(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

fn into_document(mut data: Fields) -> Result<Document> {
    let id = match data.remove(FIRESTORE_ID_FIELD) {
        Some(Value::String(id)) => id,
        _ => {
            return Err(Error {
                code: StatusCode::INTERNAL_SERVER_ERROR,
                msg: "Firestore document without an id".to_string(),
            })
        }
    };
    strip_client_fields(&mut data);
    Ok(Document { id, data })
}

fn strip_client_fields(data: &mut Fields) {
    data.retain(|name, _| !name.starts_with(constants::RESERVED_FIELD_PREFIX));
}

/// Field mask path for a single top-level field.
/// Backtick quoting is accepted for every name, simple or not.
fn quote_field_path(name: &str) -> String {
    let mut path = String::with_capacity(name.len() + 2);
    path.push('`');
    for c in name.chars() {
        if c == '`' || c == '\\' {
            path.push('\\');
        }
        path.push(c);
    }
    path.push('`');
    path
}
