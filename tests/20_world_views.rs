mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_read_update_delete() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;

    let created = app
        .post(
            "/worldviews",
            &token,
            json!({ "name": "Eldoria", "description": "A drowned kingdom", "notes": "tides" }),
        )
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["code"], 201);
    assert_eq!(created.data()["name"], "Eldoria");
    assert_eq!(created.data()["characterIds"], json!([]));
    let id = created.id();

    let fetched = app.get(&format!("/worldviews/{id}"), &token).await?;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.data()["description"], "A drowned kingdom");

    let updated = app
        .put(&format!("/worldviews/{id}"), &token, json!({ "notes": "" }))
        .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["name"], "Eldoria");
    assert_eq!(updated.data()["description"], "A drowned kingdom");
    assert_eq!(updated.data()["notes"], "");

    let renamed = app
        .put(&format!("/worldviews/{id}"), &token, json!({ "name": "" }))
        .await?;
    assert_eq!(renamed.data()["name"], "Eldoria");

    let deleted = app.delete(&format!("/worldviews/{id}"), &token).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(deleted.data().is_null());

    let gone = app.get(&format!("/worldviews/{id}"), &token).await?;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["message"], "world view not found");
    Ok(())
}

#[tokio::test]
async fn create_requires_a_name() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;

    let res = app.post("/worldviews", &token, json!({ "name": "  " })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"]["name"], "must not be empty");

    let res = app
        .post(
            "/worldviews",
            &token,
            json!({ "name": "ok", "description": "d".repeat(501) }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["errors"]["description"].is_string());
    Ok(())
}

#[tokio::test]
async fn other_owners_see_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let id = app.world_view(&alice, "Private").await?;
    let path = format!("/worldviews/{id}");

    let get = app.get(&path, &bob).await?;
    assert_eq!(get.status, StatusCode::NOT_FOUND);
    assert_eq!(get.body["code"], 404);

    let put = app.put(&path, &bob, json!({ "name": "Stolen" })).await?;
    assert_eq!(put.status, StatusCode::NOT_FOUND);

    let delete = app.delete(&path, &bob).await?;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let list = app.get("/worldviews", &bob).await?;
    assert_eq!(list.data()["total"], 0);

    let still_there = app.get(&path, &alice).await?;
    assert_eq!(still_there.data()["name"], "Private");
    Ok(())
}

#[tokio::test]
async fn second_page_holds_items_eleven_to_twenty() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    for i in 0..25 {
        app.world_view(&token, &format!("w{i:02}")).await?;
    }

    let page = app.get("/worldviews?page=2&size=10", &token).await?;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.data()["total"], 25);

    let names: Vec<&str> = page.data()["list"]
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|w| w["name"].as_str())
        .collect();
    let expected: Vec<String> = (5..15).rev().map(|i| format!("w{i:02}")).collect();
    assert_eq!(names, expected);
    Ok(())
}

#[tokio::test]
async fn page_and_size_are_clamped() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    for i in 0..12 {
        app.world_view(&token, &format!("w{i}")).await?;
    }

    let defaults = app.get("/worldviews?page=0&size=-3", &token).await?;
    assert_eq!(defaults.data()["list"].as_array().map(Vec::len), Some(10));
    assert_eq!(defaults.data()["total"], 12);

    let capped = app.get("/worldviews?size=1000", &token).await?;
    assert_eq!(capped.data()["list"].as_array().map(Vec::len), Some(12));

    let past_end = app.get("/worldviews?page=9", &token).await?;
    assert_eq!(past_end.data()["list"], json!([]));
    assert_eq!(past_end.data()["total"], 12);
    Ok(())
}

#[tokio::test]
async fn child_ids_are_reported_on_the_world_view() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w = app.world_view(&token, "w").await?;
    let c = app.character(&token, w, "Ayla").await?;
    let n = app.novel(&token, w, "Book One").await?;

    let fetched = app.get(&format!("/worldviews/{w}"), &token).await?;
    assert_eq!(fetched.data()["characterIds"], json!([c]));
    assert_eq!(fetched.data()["novelIds"], json!([n]));
    assert_eq!(fetched.data()["miscIds"], json!([]));
    Ok(())
}

#[tokio::test]
async fn delete_cascades_rows_and_chapter_files() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let doomed = app.world_view(&token, "doomed").await?;
    let kept = app.world_view(&token, "kept").await?;

    for name in ["Ayla", "Bram"] {
        let c = app.character(&token, doomed, name).await?;
        let s = app
            .post(
                "/character-snapshots",
                &token,
                json!({ "worldViewId": doomed, "characterId": c, "name": format!("{name} young") }),
            )
            .await?;
        assert_eq!(s.status, StatusCode::CREATED);
    }
    let event = app
        .post(
            "/world-events",
            &token,
            json!({
                "worldViewId": doomed,
                "name": "Flood",
                "happenedAt": "1201-03-01T00:00:00Z",
                "endAt": "1201-03-09T00:00:00Z"
            }),
        )
        .await?;
    assert_eq!(event.status, StatusCode::CREATED);
    let misc = app
        .post(
            "/miscs",
            &token,
            json!({ "worldViewId": doomed, "name": "Salt", "type": "item" }),
        )
        .await?;
    assert_eq!(misc.status, StatusCode::CREATED);

    let doomed_novel = app.novel(&token, doomed, "Sunk").await?;
    for order in 1..=2 {
        let ch = app
            .post(
                &format!("/novels/{doomed_novel}/chapters"),
                &token,
                json!({ "title": format!("Ch {order}"), "order": order, "content": "water" }),
            )
            .await?;
        assert_eq!(ch.status, StatusCode::CREATED);
    }
    let kept_novel = app.novel(&token, kept, "Dry").await?;
    app.post(
        &format!("/novels/{kept_novel}/chapters"),
        &token,
        json!({ "title": "Ch 1", "content": "sand" }),
    )
    .await?;
    assert_eq!(app.content_files().len(), 3);

    let deleted = app.delete(&format!("/worldviews/{doomed}"), &token).await?;
    assert_eq!(deleted.status, StatusCode::OK);

    assert_eq!(app.memory().rows_referencing_world_view(doomed as i32), 0);
    assert_eq!(app.content_files().len(), 1);
    assert_eq!(app.get("/characters", &token).await?.data()["total"], 0);
    assert_eq!(app.get("/character-snapshots", &token).await?.data()["total"], 0);

    let survivor = app
        .get(&format!("/novels/{kept_novel}/chapters"), &token)
        .await?;
    assert_eq!(survivor.data().as_array().map(Vec::len), Some(1));
    Ok(())
}
