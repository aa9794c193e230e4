use crate::cache_api::CacheUpdatePolicy;
use crate::constants;
use std::net::IpAddr;
use std::str::FromStr;
use structopt::clap::AppSettings;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "Firestore CRUD API, items over a document store with an optional Redis cache.",
    setting = AppSettings::DeriveDisplayOrder,
    setting = AppSettings::UnifiedHelpMessage,
    version = crate::internal_api::get_project_version(),
)]
pub struct CliOptions {
    /// Port to listen to.
    #[structopt(short, long, default_value = "8080", env = "ITEMS_PORT")]
    pub port: u16,

    /// Network interface to listen on.
    #[structopt(long, default_value = "127.0.0.1", env = "ITEMS_HOST")]
    pub host: IpAddr,

    /// Collection (Firestore) or document group (SQLite) that holds the items.
    #[structopt(
        long,
        default_value = constants::DEFAULT_COLLECTION,
        env = "ITEMS_COLLECTION"
    )]
    pub collection: String,

    /// Document store to use.
    /// "sqlite" keeps documents in a local file, "firestore" uses Google Firestore.
    #[structopt(
        long,
        default_value = "sqlite",
        possible_values = &StoreBackend::VARIANTS,
        case_insensitive = true,
        env = "ITEMS_STORE"
    )]
    pub store: StoreBackend,

    /// SQLite file to keep documents in, created if missing.
    #[structopt(
        long,
        default_value = constants::DATABASE_FILE,
        value_name = "FILE",
        env = "ITEMS_SQLITE_FILE"
    )]
    pub sqlite_file: String,

    /// Google Cloud project of the Firestore database.
    /// Credentials are taken from the environment,
    /// e.g. `GOOGLE_APPLICATION_CREDENTIALS` or the metadata server.
    #[structopt(long, value_name = "PROJECT_ID", env = "GOOGLE_CLOUD_PROJECT")]
    pub firestore_project: Option<String>,

    /// Redis server to cache items in, e.g. "redis://localhost:6379".
    /// If not specified, items are not cached.
    #[structopt(long, value_name = "URL", env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// What the cache holds for an item after an update:
    /// "payload" stores only the fields sent in the update (plus `updated_at`),
    /// "merged" stores the full document, "invalidate" drops the cache entry.
    #[structopt(
        long,
        default_value = "payload",
        possible_values = &CacheUpdatePolicy::VARIANTS,
        case_insensitive = true,
        env = "ITEMS_CACHE_UPDATE_POLICY"
    )]
    pub cache_update_policy: CacheUpdatePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Firestore,
}

impl StoreBackend {
    pub const VARIANTS: [&'static str; 2] = ["sqlite", "firestore"];
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "firestore" => Ok(StoreBackend::Firestore),
            _ => Err(format!(
                "unknown store '{}', expected one of {:?}",
                s,
                StoreBackend::VARIANTS
            )),
        }
    }
}
