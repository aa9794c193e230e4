// Constants used in the project. These are "convention over configuration" for now.

pub const APP_NAME: &str = "Firestore CRUD API";

pub const DEFAULT_COLLECTION: &str = "test-collection";

pub const DATABASE_FILE: &str = "./data/items.sqlite";

/// Length of generated document ids, same as Firestore auto-ids.
pub const DOCUMENT_ID_LENGTH: usize = 20;

pub const ITEM_NOT_FOUND: &str = "Item not found";
pub const ITEM_DELETED: &str = "Item deleted successfully";

/// Metadata fields assigned by the server, never accepted from clients.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Prefix of the fields the Firestore client injects into read documents.
pub const RESERVED_FIELD_PREFIX: &str = "_firestore_";
