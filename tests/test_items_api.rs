extern crate items_pod;

use items_pod::warp_api::routes;
use serde_json::json;
use serde_json::Value;
use warp::http::StatusCode;

mod common;

#[tokio::test]
async fn test_item_lifecycle() {
    let filter = routes(common::api_without_cache());

    let res = warp::test::request()
        .method("POST")
        .path("/items")
        .json(&json!({"name": "a"}))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let created = common::body_json(&res);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "a");
    assert!(created["created_at"].is_string());
    assert!(created.get("updated_at").is_none());

    let res = warp::test::request()
        .path(&format!("/items/{}", id))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body_json(&res), created);

    let res = warp::test::request()
        .method("PUT")
        .path(&format!("/items/{}", id))
        .json(&json!({"name": "b"}))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = common::body_json(&res);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["name"], "b");
    assert!(updated["updated_at"].is_string());
    assert!(updated.get("created_at").is_none());

    let res = warp::test::request()
        .method("DELETE")
        .path(&format!("/items/{}", id))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        common::body_json(&res),
        json!({"message": "Item deleted successfully"})
    );

    let res = warp::test::request()
        .path(&format!("/items/{}", id))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_json(&res), json!({"detail": "Item not found"}));
}

#[tokio::test]
async fn test_missing_item_is_not_found() {
    let filter = routes(common::api_without_cache());
    let requests = [
        ("GET", None),
        ("PUT", Some(json!({"name": "b"}))),
        ("DELETE", None),
    ];
    for (method, body) in &requests {
        let mut req = warp::test::request().method(method).path("/items/unknown");
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.reply(&filter).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{} /items/unknown", method);
        assert_eq!(common::body_json(&res), json!({"detail": "Item not found"}));
    }
}

#[tokio::test]
async fn test_deleted_item_stays_gone() {
    let filter = routes(common::api_without_cache());
    let res = warp::test::request()
        .method("POST")
        .path("/items")
        .json(&json!({"name": "a"}))
        .reply(&filter)
        .await;
    let id = common::body_json(&res)["id"].as_str().unwrap().to_string();
    let path = format!("/items/{}", id);

    let res = warp::test::request()
        .method("DELETE")
        .path(&path)
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = warp::test::request().path(&path).reply(&filter).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = warp::test::request()
        .method("PUT")
        .path(&path)
        .json(&json!({"name": "b"}))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = warp::test::request()
        .method("DELETE")
        .path(&path)
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_items() {
    let filter = routes(common::api_without_cache());
    let res = warp::test::request().path("/items").reply(&filter).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body_json(&res), json!([]));

    let mut ids = Vec::new();
    for i in 0..5 {
        let res = warp::test::request()
            .method("POST")
            .path("/items")
            .json(&json!({ "name": format!("item {}", i), "rank": i }))
            .reply(&filter)
            .await;
        ids.push(common::body_json(&res)["id"].as_str().unwrap().to_string());
    }

    let res = warp::test::request().path("/items").reply(&filter).await;
    let listed = common::body_json(&res);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 5);
    let mut listed_ids: Vec<String> = listed
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect();
    listed_ids.sort();
    ids.sort();
    assert_eq!(listed_ids, ids);
}

#[tokio::test]
async fn test_update_merges_into_stored_item() {
    let filter = routes(common::api_without_cache());
    let res = warp::test::request()
        .method("POST")
        .path("/items")
        .json(&json!({"name": "a", "color": "red"}))
        .reply(&filter)
        .await;
    let created = common::body_json(&res);
    let path = format!("/items/{}", created["id"].as_str().unwrap());

    let res = warp::test::request()
        .method("PUT")
        .path(&path)
        .json(&json!({"name": "b"}))
        .reply(&filter)
        .await;
    let updated = common::body_json(&res);

    let res = warp::test::request().path(&path).reply(&filter).await;
    let fetched = common::body_json(&res);
    assert_eq!(fetched["name"], "b");
    assert_eq!(fetched["color"], "red");
    assert_eq!(fetched["created_at"], created["created_at"]);
    assert_eq!(fetched["updated_at"], updated["updated_at"]);
    assert!(
        parse_time(&fetched["updated_at"]) >= parse_time(&created["created_at"]),
        "updated_at must not be earlier than created_at"
    );
}

#[tokio::test]
async fn test_invalid_payloads_are_rejected() {
    let filter = routes(common::api_without_cache());
    let cases: Vec<(&[u8], StatusCode)> = vec![
        (&b"not json"[..], StatusCode::BAD_REQUEST),
        (&b"[1, 2]"[..], StatusCode::BAD_REQUEST),
        (&br#"{"id": "mine"}"#[..], StatusCode::UNPROCESSABLE_ENTITY),
        (&br#"{"tags": ["a", "b"]}"#[..], StatusCode::UNPROCESSABLE_ENTITY),
    ];
    for (body, status) in cases {
        let res = warp::test::request()
            .method("POST")
            .path("/items")
            .body(body)
            .reply(&filter)
            .await;
        assert_eq!(res.status(), status);
        assert!(common::body_json(&res)["detail"].is_string());
    }
    // Nothing reached the store.
    let res = warp::test::request().path("/items").reply(&filter).await;
    assert_eq!(common::body_json(&res), json!([]));
}

#[tokio::test]
async fn test_version() {
    let filter = routes(common::api_without_cache());
    let res = warp::test::request().path("/version").reply(&filter).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body().as_ref(), env!("CARGO_PKG_VERSION").as_bytes());
}

fn parse_time(value: &Value) -> chrono::DateTime<chrono::Utc> {
    value.as_str().unwrap().parse().unwrap()
}
