//! Runs the HTTP surface against the sqlx store. Needs a scratch database:
//! `DATABASE_URL=postgres://... cargo test --test 70_postgres`.

mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, JWT_SECRET};
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use talearc_api::config::AppConfig;
use talearc_api::database::{DatabaseManager, PgStore, Store};

static SCHEMA: OnceCell<()> = OnceCell::const_new();

async fn postgres_app() -> Result<Option<(TestApp, PgPool)>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("SKIP-POSTGRES: set DATABASE_URL to run the Postgres store suite");
        return Ok(None);
    };

    let mut config = AppConfig::development();
    config.security.jwt_secret = JWT_SECRET.to_string();
    config.database.url = url;

    let pool = DatabaseManager::connect(&config.database).await?;
    SCHEMA
        .get_or_try_init(|| DatabaseManager::init_schema(&pool))
        .await?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));
    let app = TestApp::with_store(config, store, None).await?;
    Ok(Some((app, pool)))
}

/// Users persist between runs, so every test registers fresh names
fn unique(name: &str) -> String {
    format!("{}-{}", name, Uuid::new_v4().simple())
}

async fn count(pool: &PgPool, sql: &str, id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar(sql).bind(id as i32).fetch_one(pool).await?)
}

#[tokio::test]
async fn world_view_cascade_removes_rows_and_files() -> Result<()> {
    let Some((app, pool)) = postgres_app().await? else {
        return Ok(());
    };
    let token = app.user(&unique("alice")).await?;
    let doomed = app.world_view(&token, "doomed").await?;
    let kept = app.world_view(&token, "kept").await?;

    let c = app.character(&token, doomed, "Ayla").await?;
    app.post(
        "/character-snapshots",
        &token,
        json!({ "worldViewId": doomed, "characterId": c, "name": "young" }),
    )
    .await?;
    let m = app
        .post("/miscs", &token, json!({ "worldViewId": doomed, "name": "Salt", "type": "resource" }))
        .await?
        .id();
    let e = app
        .post(
            "/world-events",
            &token,
            json!({
                "worldViewId": doomed,
                "name": "siege",
                "happenedAt": "1300-01-01T00:00:00Z",
                "endAt": "1300-01-02T00:00:00Z"
            }),
        )
        .await?
        .id();
    let n = app.novel(&token, doomed, "doomed novel").await?;
    for title in ["one", "two"] {
        let res = app
            .post(&format!("/novels/{n}/chapters"), &token, json!({ "title": title, "content": title }))
            .await?;
        assert_eq!(res.status, StatusCode::CREATED);
    }
    let kept_novel = app.novel(&token, kept, "kept novel").await?;
    let kept_chapter = app
        .post(
            &format!("/novels/{kept_novel}/chapters"),
            &token,
            json!({ "title": "survivor", "content": "still here" }),
        )
        .await?
        .id();
    assert_eq!(app.content_files().len(), 3);

    let view = app.get(&format!("/worldviews/{doomed}"), &token).await?;
    assert_eq!(view.data()["characterIds"], json!([c]));
    assert_eq!(view.data()["miscIds"], json!([m]));
    assert_eq!(view.data()["worldEventIds"], json!([e]));
    assert_eq!(view.data()["novelIds"], json!([n]));

    let res = app.delete(&format!("/worldviews/{doomed}"), &token).await?;
    assert_eq!(res.status, StatusCode::OK);

    for sql in [
        "SELECT COUNT(*) FROM world_views WHERE id = $1",
        "SELECT COUNT(*) FROM characters WHERE world_view_id = $1",
        "SELECT COUNT(*) FROM character_snapshots WHERE world_view_id = $1",
        "SELECT COUNT(*) FROM miscs WHERE world_view_id = $1",
        "SELECT COUNT(*) FROM world_events WHERE world_view_id = $1",
        "SELECT COUNT(*) FROM novels WHERE world_view_id = $1",
    ] {
        assert_eq!(count(&pool, sql, doomed).await?, 0, "{}", sql);
    }
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM chapters WHERE novel_id = $1", n).await?,
        0
    );
    assert_eq!(app.content_files().len(), 1);

    let survivor = app
        .get(&format!("/novels/{kept_novel}/chapters/{kept_chapter}"), &token)
        .await?;
    assert_eq!(survivor.data()["content"], "still here");
    Ok(())
}

#[tokio::test]
async fn snapshot_ids_follow_snapshot_writes() -> Result<()> {
    let Some((app, _pool)) = postgres_app().await? else {
        return Ok(());
    };
    let token = app.user(&unique("alice")).await?;
    let w1 = app.world_view(&token, "one").await?;
    let w2 = app.world_view(&token, "two").await?;
    let c = app.character(&token, w1, "Ayla").await?;
    app.character(&token, w2, "Bren").await?;

    let mut ids = Vec::new();
    for name in ["child", "adult", "elder"] {
        let s = app
            .post(
                "/character-snapshots",
                &token,
                json!({ "worldViewId": w1, "characterId": c, "name": name }),
            )
            .await?;
        assert_eq!(s.status, StatusCode::CREATED);
        ids.push(s.id());
    }
    let character = app.get(&format!("/characters/{c}"), &token).await?;
    assert_eq!(character.data()["snapshotIds"], json!(ids));

    app.delete(&format!("/character-snapshots/{}", ids[1]), &token).await?;
    let character = app.get(&format!("/characters/{c}"), &token).await?;
    assert_eq!(character.data()["snapshotIds"], json!([ids[0], ids[2]]));

    let misplaced = app
        .post(
            "/character-snapshots",
            &token,
            json!({ "worldViewId": w2, "characterId": c, "name": "misplaced" }),
        )
        .await?;
    assert_eq!(misplaced.status, StatusCode::BAD_REQUEST);

    let filtered = app.get(&format!("/characters?worldViewId={w1}"), &token).await?;
    assert_eq!(filtered.data()["total"], 1);
    let unfiltered = app.get("/characters", &token).await?;
    assert_eq!(unfiltered.data()["total"], 2);
    Ok(())
}

#[tokio::test]
async fn second_page_is_ordered_by_recency() -> Result<()> {
    let Some((app, _pool)) = postgres_app().await? else {
        return Ok(());
    };
    let token = app.user(&unique("alice")).await?;
    for i in 0..25 {
        app.world_view(&token, &format!("w{i:02}")).await?;
    }

    let res = app.get("/worldviews?page=2&size=10", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total"], 25);
    let names: Vec<&str> = res.data()["list"]
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|w| w["name"].as_str())
        .collect();
    let expected: Vec<String> = (5..15).rev().map(|i| format!("w{i:02}")).collect();
    assert_eq!(names, expected);
    Ok(())
}
