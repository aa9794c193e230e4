use crate::api_model::ErrorResponse;
use crate::api_model::ItemCreate;
use crate::constants;
use crate::error::Error;
use crate::error::Result;
use crate::internal_api;
use crate::internal_api::ItemsApi;
use bytes::Bytes;
use log::error;
use log::info;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::status::StatusCode;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// All HTTP endpoints of the service.
pub fn routes(
    api: Arc<ItemsApi>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    // Get version of cargo project.
    let version = warp::path("version")
        .and(warp::path::end())
        .and(warp::get())
        .map(internal_api::get_project_version);

    // POST a new item.
    // Input: json object of the item fields within the body.
    // Return the created item with its generated id and `created_at`.
    let api_clone = api.clone();
    let create_item = warp::path("items")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .then(move |body: Bytes| {
            let api = api_clone.clone();
            async move {
                match ItemCreate::from_json_bytes(&body) {
                    Ok(payload) => respond(api.create_item(payload).await),
                    Err(err) => error_reply(err),
                }
            }
        });

    // GET a single item.
    // Return 404 if the item does not exist.
    let api_clone = api.clone();
    let get_item = warp::path!("items" / String)
        .and(warp::path::end())
        .and(warp::get())
        .then(move |id: String| {
            let api = api_clone.clone();
            async move { respond(api.get_item(&id).await) }
        });

    // GET all items.
    // Return empty array if there are none.
    let api_clone = api.clone();
    let list_items = warp::path("items")
        .and(warp::path::end())
        .and(warp::get())
        .then(move || {
            let api = api_clone.clone();
            async move { respond(api.list_items().await) }
        });

    // PUT (update) a single item
    // Input:
    //      - id of the item to be updated
    //      - json object of the new item fields
    // See `internal_api::ItemsApi::update_item` for more details
    let api_clone = api.clone();
    let update_item = warp::path!("items" / String)
        .and(warp::path::end())
        .and(warp::put())
        .and(json_body())
        .then(move |id: String, body: Bytes| {
            let api = api_clone.clone();
            async move {
                match ItemCreate::from_json_bytes(&body) {
                    Ok(payload) => respond(api.update_item(&id, payload).await),
                    Err(err) => error_reply(err),
                }
            }
        });

    // DELETE a single item
    let api_clone = api;
    let delete_item = warp::path!("items" / String)
        .and(warp::path::end())
        .and(warp::delete())
        .then(move |id: String| {
            let api = api_clone.clone();
            async move { respond(api.delete_item(&id).await) }
        });

    version
        .or(create_item)
        .or(list_items)
        .or(get_item)
        .or(update_item)
        .or(delete_item)
        .with(warp::log(env!("CARGO_PKG_NAME")))
}

/// Start web framework with the item APIs, until `shutdown` completes.
pub async fn run_server<F>(api: Arc<ItemsApi>, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Starting {} HTTP server", constants::APP_NAME);
    let (bound, server) = warp::serve(routes(api))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|err| Error {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            msg: format!("Failed to listen on {}, {}", addr, err),
        })?;
    info!("Listening on http://{}", bound);
    server.await;
    info!("HTTP server stopped");
    Ok(())
}

fn json_body() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::bytes())
}

fn respond<T: Serialize>(result: Result<T>) -> Box<dyn Reply> {
    match result {
        Ok(result) => Box::new(warp::reply::json(&result)),
        Err(err) => error_reply(err),
    }
}

fn error_reply(err: Error) -> Box<dyn Reply> {
    if err.code.is_server_error() {
        error!("{}", err);
    }
    let body = ErrorResponse { detail: err.msg };
    Box::new(warp::reply::with_status(warp::reply::json(&body), err.code))
}
