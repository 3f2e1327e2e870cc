//! REST endpoint handlers for the export API.
//!
//! All handlers read a point-in-time snapshot of the store; nothing here
//! can observe a half-applied fold.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/series` | Full aligned snapshot (time + every series) |
//! | `GET` | `/api/species` | List of species names in the store |
//! | `GET` | `/api/species/:name` | One species' series plus the time axis |
//! | `GET` | `/api/pellets` | Pellet series plus the time axis |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the tracked run and store size.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    let folded = snapshot.len();
    let species_count = snapshot.species().len();
    let target = state.target.to_string();
    let started_at = state.started_at.to_rfc3339();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Bibite Census</title>
    <style>
        body {{ background: #0d1117; color: #c9d1d9; font-family: monospace; padding: 2rem; }}
        h1 {{ color: #58a6ff; }}
        a {{ color: #58a6ff; }}
        li::before {{ content: "GET "; color: #7ee787; font-weight: bold; }}
        ul {{ list-style: none; padding: 0; }}
    </style>
</head>
<body>
    <h1>Bibite Census</h1>
    <p>Tracking run: <b>{target}</b></p>
    <p>Snapshots folded: <b>{folded}</b> &mdash; species seen: <b>{species_count}</b></p>
    <p>Up since {started_at}</p>
    <ul>
        <li><a href="/api/series">/api/series</a></li>
        <li><a href="/api/species">/api/species</a></li>
        <li><a href="/api/pellets">/api/pellets</a></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/series -- the full aligned snapshot
// ---------------------------------------------------------------------------

/// Return the entire aligned snapshot: time axis plus every series.
pub async fn get_series(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    Json(serde_json::json!({
        "target": state.target,
        "snapshots": snapshot.len(),
        "series": snapshot,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/species -- species names
// ---------------------------------------------------------------------------

/// List every species name the store has seen.
pub async fn list_species(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    let names = snapshot.species_names();
    Json(serde_json::json!({
        "count": names.len(),
        "species": names,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/species/:name -- one species' series
// ---------------------------------------------------------------------------

/// Return one species' series together with the time axis.
///
/// The species is an explicit request parameter; the store exposes all
/// species uniformly and holds no notion of a "selected" one.
pub async fn get_species(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.store.snapshot().await;
    let series = snapshot
        .species()
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("species {name:?}")))?;
    Ok(Json(serde_json::json!({
        "name": name,
        "time": snapshot.time(),
        "series": series,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/pellets -- pellet series
// ---------------------------------------------------------------------------

/// Return every material's pellet series together with the time axis.
pub async fn get_pellets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    Json(serde_json::json!({
        "time": snapshot.time(),
        "pellets": snapshot.pellets(),
    }))
}
