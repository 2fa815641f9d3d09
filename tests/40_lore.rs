mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

async fn event(app: &TestApp, token: &str, w: i64, name: &str, year: u32) -> Result<i64> {
    let res = app
        .post(
            "/world-events",
            token,
            json!({
                "worldViewId": w,
                "name": name,
                "happenedAt": format!("{year}-06-01T00:00:00Z"),
                "endAt": format!("{year}-06-02T00:00:00Z"),
                "relatedCharacterSnapshotIds": []
            }),
        )
        .await?;
    anyhow::ensure!(res.status == StatusCode::CREATED, "{}", res.body);
    Ok(res.id())
}

#[tokio::test]
async fn timeline_lists_latest_first() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w = app.world_view(&token, "w").await?;
    let other = app.world_view(&token, "other").await?;
    event(&app, &token, w, "founding", 1100).await?;
    event(&app, &token, w, "siege", 1300).await?;
    event(&app, &token, w, "plague", 1200).await?;
    event(&app, &token, other, "elsewhere", 1250).await?;

    let res = app.get(&format!("/world-events/list/{w}"), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    let names: Vec<&str> = res
        .data()
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|e| e["name"].as_str())
        .collect();
    assert_eq!(names, vec!["siege", "plague", "founding"]);
    Ok(())
}

#[tokio::test]
async fn timeline_of_a_foreign_world_view_is_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let w = app.world_view(&alice, "w").await?;

    let res = app.get(&format!("/world-events/list/{w}"), &bob).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "world view not found");
    Ok(())
}

#[tokio::test]
async fn event_requires_times_and_an_owned_world_view() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let w = app.world_view(&alice, "w").await?;

    let missing_times = app
        .post("/world-events", &alice, json!({ "worldViewId": w, "name": "when?" }))
        .await?;
    assert_eq!(missing_times.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_times.body["code"], 400);

    let foreign = app
        .post(
            "/world-events",
            &bob,
            json!({
                "worldViewId": w,
                "name": "sneaky",
                "happenedAt": "1200-01-01T00:00:00Z",
                "endAt": "1200-01-02T00:00:00Z"
            }),
        )
        .await?;
    assert_eq!(foreign.status, StatusCode::BAD_REQUEST);
    assert_eq!(foreign.body["message"], "world view not found or inaccessible");
    Ok(())
}

#[tokio::test]
async fn event_update_keeps_untouched_fields() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w = app.world_view(&token, "w").await?;
    let id = event(&app, &token, w, "siege", 1300).await?;

    let res = app
        .put(
            &format!("/world-events/{id}"),
            &token,
            json!({ "relatedCharacterSnapshotIds": [4, 5] }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["name"], "siege");
    assert_eq!(res.data()["relatedCharacterSnapshotIds"], json!([4, 5]));
    assert_eq!(res.data()["happenedAt"], "1300-06-01T00:00:00Z");
    Ok(())
}

#[tokio::test]
async fn misc_requires_a_type() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w = app.world_view(&token, "w").await?;

    let untyped = app
        .post("/miscs", &token, json!({ "worldViewId": w, "name": "Salt" }))
        .await?;
    assert_eq!(untyped.status, StatusCode::BAD_REQUEST);
    assert_eq!(untyped.body["errors"]["type"], "must not be empty");

    let typed = app
        .post(
            "/miscs",
            &token,
            json!({ "worldViewId": w, "name": "Salt", "type": "resource" }),
        )
        .await?;
    assert_eq!(typed.status, StatusCode::CREATED);
    assert_eq!(typed.data()["type"], "resource");

    let id = typed.id();
    let retyped = app
        .put(&format!("/miscs/{id}"), &token, json!({ "type": "currency" }))
        .await?;
    assert_eq!(retyped.data()["type"], "currency");
    assert_eq!(retyped.data()["name"], "Salt");

    let listed = app.get(&format!("/miscs?worldViewId={w}"), &token).await?;
    assert_eq!(listed.data()["total"], 1);

    let deleted = app.delete(&format!("/miscs/{id}"), &token).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(
        app.get(&format!("/miscs/{id}"), &token).await?.status,
        StatusCode::NOT_FOUND
    );
    Ok(())
}

#[tokio::test]
async fn lore_of_other_owners_is_invisible() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let w = app.world_view(&alice, "w").await?;
    let e = event(&app, &alice, w, "siege", 1300).await?;
    let m = app
        .post(
            "/miscs",
            &alice,
            json!({ "worldViewId": w, "name": "Salt", "type": "resource" }),
        )
        .await?
        .id();

    for path in [format!("/world-events/{e}"), format!("/miscs/{m}")] {
        assert_eq!(app.get(&path, &bob).await?.status, StatusCode::NOT_FOUND);
        assert_eq!(
            app.put(&path, &bob, json!({ "name": "Renamed" })).await?.status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(app.delete(&path, &bob).await?.status, StatusCode::NOT_FOUND);

        let own = app.get(&path, &alice).await?;
        assert_eq!(own.status, StatusCode::OK);
        assert_ne!(own.data()["name"], "Renamed");
    }
    assert_eq!(app.get("/world-events", &bob).await?.data()["total"], 0);
    assert_eq!(app.get("/miscs", &bob).await?.data()["total"], 0);
    Ok(())
}
