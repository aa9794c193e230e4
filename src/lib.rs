// Library interface of the service, used by the binary and by integration tests

pub mod api_model;
pub mod cache_api;
pub mod cache_redis;
pub mod command_line_interface;
pub mod constants;
pub mod database_api;
pub mod database_firestore;
pub mod database_sqlite;
pub mod error;
pub mod internal_api;
pub mod warp_api;
