//! Title catalog flows: creation, search, aliases and name resolution.

mod common;

use axum::http::StatusCode;
use common::{primary_names, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_requires_authentication() {
    let app = spawn_app().await;

    let (status, _) = common::send(&app.router, "GET", "/api/titles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        common::send(&app.router, "GET", "/api/titles", Some("wrong-key"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = app.get("/api/titles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn test_create_and_get_title() {
    let app = spawn_app().await;

    let (status, json) = app
        .post(
            "/api/titles",
            json!({
                "name": "  Attack   on Titan ",
                "kind": "Anime",
                "episodes": 25,
                "description": "Humanity behind walls.",
                "aliases": ["Shingeki no Kyojin", "attack on titan", "SHINGEKI NO KYOJIN"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");

    let title = &json["data"];
    assert_eq!(title["name"]["name"], "Attack on Titan");
    assert_eq!(title["kind"], "anime");
    assert_eq!(title["episodes"], 25);

    // The primary name and the repeated alias fold away.
    let aliases = title["aliases"].as_array().unwrap();
    assert_eq!(aliases.len(), 1);
    assert_eq!(aliases[0]["name"], "Shingeki no Kyojin");

    let id = title["id"].as_i64().unwrap();
    let (status, json) = app.get(&format!("/api/titles/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["aliases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_title_validation() {
    let app = spawn_app().await;

    let (status, _) = app
        .post("/api/titles", json!({ "name": "   ", "kind": "anime" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/titles", json!({ "name": "Berserk", "kind": "manga" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/titles",
            json!({ "name": "Berserk", "kind": "anime", "episodes": -3 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.create_title("Berserk", Some(25), &[]).await;
    let (status, _) = app
        .post("/api/titles", json!({ "name": "BERSERK", "kind": "anime" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_missing_title() {
    let app = spawn_app().await;

    let (status, json) = app.get("/api/titles/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);

    let (status, _) = app.get("/api/titles/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_matches_typos_and_aliases() {
    let app = spawn_app().await;

    app.create_title("Attack on Titan", Some(25), &["Shingeki no Kyojin"])
        .await;
    app.create_title("Cowboy Bebop", Some(26), &[]).await;
    app.create_title("Mushishi", Some(26), &[]).await;

    let (status, json) = app.get("/api/titles?search=attak").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(primary_names(&json), vec!["Attack on Titan"]);

    let (_, json) = app.get("/api/titles?search=kyojin").await;
    assert_eq!(primary_names(&json), vec!["Attack on Titan"]);

    let (_, json) = app.get("/api/titles?search=BEBOP").await;
    assert_eq!(primary_names(&json), vec!["Cowboy Bebop"]);

    let (_, json) = app.get("/api/titles?search=evangelion").await;
    assert!(primary_names(&json).is_empty());
}

#[tokio::test]
async fn test_search_finds_short_names_with_typos() {
    let app = spawn_app().await;

    app.create_title("Ao", Some(12), &[]).await;
    app.create_title("Mushishi", Some(26), &[]).await;

    let (status, json) = app.get("/api/titles?search=ai").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(primary_names(&json), vec!["Ao"]);
}

#[tokio::test]
async fn test_list_sorted_by_primary_name() {
    let app = spawn_app().await;

    app.create_title("Mushishi", Some(26), &[]).await;
    app.create_title("attack on Titan", Some(25), &[]).await;
    app.create_title("Cowboy Bebop", Some(26), &[]).await;

    let (_, json) = app.get("/api/titles").await;
    assert_eq!(
        primary_names(&json),
        vec!["attack on Titan", "Cowboy Bebop", "Mushishi"]
    );

    let (_, json) = app.get("/api/titles?sort=desc").await;
    assert_eq!(
        primary_names(&json),
        vec!["Mushishi", "Cowboy Bebop", "attack on Titan"]
    );

    // Unrecognized sort values fall back to ascending.
    let (_, json) = app.get("/api/titles?sort=sideways").await;
    assert_eq!(
        primary_names(&json),
        vec!["attack on Titan", "Cowboy Bebop", "Mushishi"]
    );
}

#[tokio::test]
async fn test_exclude_titles_already_in_library() {
    let app = spawn_app().await;

    let bebop = app.create_title("Cowboy Bebop", Some(26), &[]).await;
    app.create_title("Mushishi", Some(26), &[]).await;
    app.add_to_library(bebop).await;

    let (_, json) = app.get("/api/titles?exclude_in_library=true").await;
    assert_eq!(primary_names(&json), vec!["Mushishi"]);

    let (_, json) = app.get("/api/titles?exclude_in_library=false").await;
    assert_eq!(primary_names(&json).len(), 2);
}

#[tokio::test]
async fn test_list_point_lookup_returns_one_title() {
    let app = spawn_app().await;

    let bebop = app.create_title("Cowboy Bebop", Some(26), &[]).await;
    let mushi = app.create_title("Mushishi", Some(26), &[]).await;
    let progress = app.add_to_library(mushi).await;

    let (status, json) = app
        .get(&format!("/api/titles?title_id={bebop}&search=zzz&exclude_in_library=true"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(primary_names(&json), vec!["Cowboy Bebop"]);

    // A progress id wins over a title id.
    let (_, json) = app
        .get(&format!("/api/titles?progress_id={progress}&title_id={bebop}"))
        .await;
    assert_eq!(primary_names(&json), vec!["Mushishi"]);

    let (status, json) = app.get("/api/titles?title_id=4242").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_alias_and_duplicates() {
    let app = spawn_app().await;
    let id = app.create_title("Frieren: Beyond Journey's End", Some(28), &[]).await;

    let uri = format!("/api/titles/{id}/aliases");

    let (status, json) = app.post(&uri, json!({ "name": "Sousou no Frieren" })).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["created"], true);

    let (status, _) = app.post(&uri, json!({ "name": "  sousou NO frieren" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(&uri, json!({ "name": "frieren: beyond journey's end" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post("/api/titles/4242/aliases", json!({ "name": "Nope" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app.get(&format!("/api/titles/{id}/names")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["primary"]["name"], "Frieren: Beyond Journey's End");
    assert_eq!(json["data"]["aliases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_aliases_share_one_name() {
    let app = spawn_app().await;
    let a = app.create_title("Space Cowboy", Some(26), &[]).await;
    let b = app.create_title("See You Space Cowboy", Some(1), &[]).await;

    let uri_a = format!("/api/titles/{a}/aliases");
    let uri_b = format!("/api/titles/{b}/aliases");
    let (first, second) = tokio::join!(
        app.post(&uri_a, json!({ "name": "Cowboy Bebop" })),
        app.post(&uri_b, json!({ "name": "cowboy bebop " })),
    );

    assert_eq!(first.0, StatusCode::CREATED, "{}", first.1);
    assert_eq!(second.0, StatusCode::CREATED, "{}", second.1);
    assert_eq!(
        first.1["data"]["name"]["id"], second.1["data"]["name"]["id"],
        "both aliases must resolve to the same name row"
    );

    let created = [&first.1, &second.1]
        .iter()
        .filter(|r| r["data"]["created"] == true)
        .count();
    assert_eq!(created, 1);
}

#[tokio::test]
async fn test_remove_aliases_reports_failures() {
    let app = spawn_app().await;
    let id = app
        .create_title("Attack on Titan", Some(25), &["Shingeki no Kyojin", "AoT"])
        .await;

    let (_, json) = app.get(&format!("/api/titles/{id}/names")).await;
    let alias_ids: Vec<i64> = json["data"]["aliases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(alias_ids.len(), 2);

    let uri = format!("/api/titles/{id}/aliases");
    let (status, json) = app
        .delete(&uri, Some(json!({ "name_ids": [alias_ids[0], 9999] })))
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["removed"], 1);
    assert_eq!(json["data"]["failed"], json!([9999]));

    let (_, json) = app.get(&format!("/api/titles/{id}")).await;
    assert_eq!(json["data"]["aliases"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .delete("/api/titles/4242/aliases", Some(json!({ "name_ids": [1] })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&uri, Some(json!({ "name_ids": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_title() {
    let app = spawn_app().await;
    let id = app.create_title("Shingeki no Kyojin", Some(12), &["AoT"]).await;
    let uri = format!("/api/titles/{id}");

    let (status, json) = app
        .put(
            &uri,
            json!({
                "name": "Attack on Titan",
                "episodes": 25,
                "aliases": ["Shingeki no Kyojin"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["name"]["name"], "Attack on Titan");
    assert_eq!(json["data"]["episodes"], 25);

    let aliases: Vec<&str> = json["data"]["aliases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(aliases, vec!["AoT", "Shingeki no Kyojin"]);

    // Promoting an alias to primary drops its alias link.
    let (_, json) = app.put(&uri, json!({ "name": "aot" })).await;
    assert_eq!(json["data"]["name"]["name"], "AoT");
    let aliases = json["data"]["aliases"].as_array().unwrap();
    assert_eq!(aliases.len(), 1);
    assert_eq!(aliases[0]["name"], "Shingeki no Kyojin");

    let (status, _) = app.put("/api/titles/4242", json!({ "episodes": 3 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_cannot_strand_progress() {
    let app = spawn_app().await;
    let id = app.create_title("Mushishi", Some(26), &[]).await;
    let progress = app.add_to_library(id).await;

    let (status, _) = app
        .put(&format!("/api/library/{progress}/episode"), json!({ "episode": 20 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .put(&format!("/api/titles/{id}"), json!({ "episodes": 12 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = app.get(&format!("/api/titles/{id}")).await;
    assert_eq!(json["data"]["episodes"], 26);
}

#[tokio::test]
async fn test_delete_title_cascades() {
    let app = spawn_app().await;
    let id = app.create_title("Cowboy Bebop", Some(26), &["Kaubōi Bibappu"]).await;
    app.add_to_library(id).await;

    let (status, _) = app.delete(&format!("/api/titles/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/titles/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = app.get("/api/library").await;
    assert!(json["data"].as_array().unwrap().is_empty());

    // Name rows outlive the title.
    let (status, json) = app.get("/api/names?name=cowboy%20bebop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "Cowboy Bebop");

    let (status, _) = app.delete(&format!("/api/titles/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_name_resolution_is_idempotent() {
    let app = spawn_app().await;

    let (status, first) = app.post("/api/names", json!({ "name": "Mushishi" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["created"], true);

    let (status, second) = app.post("/api/names", json!({ "name": " MUSHISHI " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["created"], false);
    assert_eq!(first["data"]["name"]["id"], second["data"]["name"]["id"]);

    let (status, _) = app.get("/api/names?name=unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
