mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn character_needs_an_owned_world_view() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let w = app.world_view(&alice, "w").await?;

    let res = app
        .post("/characters", &bob, json!({ "worldViewId": w, "name": "Intruder" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "world view not found or inaccessible");

    let res = app
        .post("/characters", &alice, json!({ "worldViewId": 9999, "name": "Nobody" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_filters_by_world_view() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w1 = app.world_view(&token, "one").await?;
    let w2 = app.world_view(&token, "two").await?;
    app.character(&token, w1, "A").await?;
    app.character(&token, w1, "B").await?;
    app.character(&token, w2, "C").await?;

    let all = app.get("/characters", &token).await?;
    assert_eq!(all.data()["total"], 3);

    let only_w1 = app.get(&format!("/characters?worldViewId={w1}"), &token).await?;
    assert_eq!(only_w1.data()["total"], 2);
    let names: Vec<&str> = only_w1.data()["list"]
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["B", "A"]);
    Ok(())
}

#[tokio::test]
async fn update_is_partial() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w = app.world_view(&token, "w").await?;
    let created = app
        .post(
            "/characters",
            &token,
            json!({ "worldViewId": w, "name": "Ayla", "description": "scout", "note": "left-handed" }),
        )
        .await?;
    let id = created.id();

    let updated = app
        .put(&format!("/characters/{id}"), &token, json!({ "description": "captain" }))
        .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["name"], "Ayla");
    assert_eq!(updated.data()["description"], "captain");
    assert_eq!(updated.data()["note"], "left-handed");
    Ok(())
}

#[tokio::test]
async fn snapshots_are_tracked_on_their_character() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w = app.world_view(&token, "w").await?;
    let c = app.character(&token, w, "Ayla").await?;

    let mut ids = Vec::new();
    for name in ["child", "adult"] {
        let s = app
            .post(
                "/character-snapshots",
                &token,
                json!({ "worldViewId": w, "characterId": c, "name": name }),
            )
            .await?;
        assert_eq!(s.status, StatusCode::CREATED);
        assert_eq!(s.data()["characterId"], c);
        ids.push(s.id());
    }

    let character = app.get(&format!("/characters/{c}"), &token).await?;
    assert_eq!(character.data()["snapshotIds"], json!(ids));

    let removed = app
        .delete(&format!("/character-snapshots/{}", ids[0]), &token)
        .await?;
    assert_eq!(removed.status, StatusCode::OK);

    let character = app.get(&format!("/characters/{c}"), &token).await?;
    assert_eq!(character.data()["snapshotIds"], json!([ids[1]]));

    let filtered = app
        .get(&format!("/character-snapshots?characterId={c}"), &token)
        .await?;
    assert_eq!(filtered.data()["total"], 1);
    Ok(())
}

#[tokio::test]
async fn snapshot_character_must_share_the_world_view() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w1 = app.world_view(&token, "one").await?;
    let w2 = app.world_view(&token, "two").await?;
    let c = app.character(&token, w1, "Ayla").await?;

    let res = app
        .post(
            "/character-snapshots",
            &token,
            json!({ "worldViewId": w2, "characterId": c, "name": "misplaced" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "character not found or inaccessible");
    Ok(())
}

#[tokio::test]
async fn deleting_a_character_removes_its_snapshots() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user("alice").await?;
    let w = app.world_view(&token, "w").await?;
    let c = app.character(&token, w, "Ayla").await?;
    let s = app
        .post(
            "/character-snapshots",
            &token,
            json!({ "worldViewId": w, "characterId": c, "name": "once" }),
        )
        .await?
        .id();

    let res = app.delete(&format!("/characters/{c}"), &token).await?;
    assert_eq!(res.status, StatusCode::OK);

    let snapshot = app.get(&format!("/character-snapshots/{s}"), &token).await?;
    assert_eq!(snapshot.status, StatusCode::NOT_FOUND);
    assert_eq!(snapshot.body["message"], "character snapshot not found");
    Ok(())
}

#[tokio::test]
async fn characters_and_snapshots_of_other_owners_are_invisible() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let w = app.world_view(&alice, "w").await?;
    let c = app.character(&alice, w, "Ayla").await?;
    let s = app
        .post(
            "/character-snapshots",
            &alice,
            json!({ "worldViewId": w, "characterId": c, "name": "young" }),
        )
        .await?
        .id();

    for path in [format!("/characters/{c}"), format!("/character-snapshots/{s}")] {
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
    assert_eq!(app.get("/characters", &bob).await?.data()["total"], 0);
    assert_eq!(app.get("/character-snapshots", &bob).await?.data()["total"], 0);
    Ok(())
}
