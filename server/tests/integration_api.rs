use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use filmquery_core::index::TfidfConfig;
use filmquery_core::loader::LoaderConfig;
use filmquery_core::{Catalog, FilmRecord};
use filmquery_server::{build_app, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;
use time::macros::date;
use tower::ServiceExt;

fn toy_catalog() -> Catalog {
    Catalog::build(
        vec![
            FilmRecord::new("Toy Story", Some(date!(1995 - 11 - 22)), 8.3),
            FilmRecord::new("Toy Story 2", Some(date!(1999 - 11 - 24)), 7.9),
            FilmRecord::new("Cars", Some(date!(2006 - 06 - 09)), 7.2),
        ],
        &TfidfConfig::default(),
    )
}

fn app() -> Router {
    build_app(AppState::new(toy_catalog(), 5))
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

async fn call_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = call(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = call(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn counts_films_per_month() {
    let (status, json) = call_json(app(), "/cantidad_filmaciones_mes/noviembre").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "mes": "noviembre", "cantidad_filmaciones": 2 }));

    let (status, json) = call_json(app(), "/cantidad_filmaciones_mes/Junio").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "mes": "Junio", "cantidad_filmaciones": 1 }));
}

#[tokio::test]
async fn unknown_month_is_bad_request() {
    let (status, json) = call_json(app(), "/cantidad_filmaciones_mes/november").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "detail": "Mes no válido" }));
}

#[tokio::test]
async fn scores_title_by_substring() {
    let (status, json) = call_json(app(), "/score_titulo/Cars").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "titulo": "Cars", "score": 7.2 }));

    // percent-encoded path, first match wins
    let (status, json) = call_json(app(), "/score_titulo/toy%20story").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "titulo": "toy story", "score": 8.3 }));
}

#[tokio::test]
async fn missing_title_is_not_found() {
    let (status, json) = call_json(app(), "/score_titulo/Ratatouille").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "detail": "Película no encontrada" }));

    let (status, _) = call_json(app(), "/recomendacion/Ratatouille").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recommends_similar_titles() {
    let (status, json) = call_json(app(), "/recomendacion/Toy%20Story").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "titulo": "Toy Story", "recomendaciones": ["Toy Story 2", "Cars"] }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_concurrent_recommendations() {
    let app = app();
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let app = app.clone();
            let uri = if i % 2 == 0 { "/recomendacion/Toy%20Story" } else { "/recomendacion/cars" };
            tokio::spawn(async move { call_json(app, uri).await })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let (status, json) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let first = if i % 2 == 0 { "Toy Story 2" } else { "Toy Story" };
        assert_eq!(json["recomendaciones"][0], first);
    }
}

#[tokio::test]
async fn recommendation_size_follows_top_k() {
    let titles = ["Alien", "Aliens", "Alien 3", "Alien Resurrection", "Alien vs Predator", "Predator", "Predator 2"];
    let records = titles.iter().map(|t| FilmRecord::new(*t, None, 6.0)).collect();
    let app = build_app(AppState::new(Catalog::build(records, &TfidfConfig::default()), 2));
    let (status, json) = call_json(app, "/recomendacion/Alien").await;
    assert_eq!(status, StatusCode::OK);
    let recs = json["recomendaciones"].as_array().unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0], "Alien 3");
}

#[tokio::test]
async fn serves_catalog_loaded_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("films.csv");
    fs::write(
        &path,
        "title,release_date,vote_average\nHeat,1995-12-15,7.7\nSabrina,1995-12-15,\nCasino,1995-11-22,7.8\n",
    )
    .unwrap();
    let catalog = Catalog::load(&path, &LoaderConfig::default(), &TfidfConfig::default()).unwrap();
    let app = build_app(AppState::new(catalog, 5));

    let (status, json) = call_json(app.clone(), "/cantidad_filmaciones_mes/diciembre").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cantidad_filmaciones"], 1);

    let (status, _) = call_json(app, "/score_titulo/sabrina").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
