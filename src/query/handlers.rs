//! HTTP handlers for the catalog queries.
//!
//! Every endpoint answers 200. Missing or malformed arguments produce the
//! same empty payload as a lookup that found nothing.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, error};

use sfmovies::{LocationEntry, LocationService, MovieInfo, MovieLocation};

/// Application state shared across handlers
pub struct AppState {
    pub service: LocationService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/get_movie_info", get(movie_info_handler))
        .route("/get_by_key", get(by_key_handler))
        .route("/get_by_indexes", get(by_indexes_handler))
        .route("/get_indexes_by_loc", get(indexes_by_loc_handler))
        .with_state(state)
}

/// Run a lookup off the async runtime; the per-query reload source blocks on file reads.
async fn lookup<T, F>(state: &AppState, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&LocationService) -> T + Send + 'static,
{
    let service = state.service.clone();
    match tokio::task::spawn_blocking(move || f(&service)).await {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Lookup task failed: {}", e);
            None
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    movies: usize,
    locations: usize,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = lookup(&state, |s| s.stats()).await.flatten();

    Json(match stats {
        Some(stats) => HealthResponse {
            status: "ok",
            movies: stats.movies,
            locations: stats.locations,
        },
        None => HealthResponse {
            status: "degraded",
            movies: 0,
            locations: 0,
        },
    })
}

#[derive(Deserialize)]
pub struct MovieKeyParams {
    /// Movie key, e.g. "Vertigo (1958)"
    movie_key: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct MovieInfoResponse {
    movie_key: String,
    #[serde(serialize_with = "info_or_empty_list")]
    info: Option<MovieInfo>,
}

/// A missing movie is sent as `[]`, matching the empty-list convention of the other endpoints
fn info_or_empty_list<S: Serializer>(info: &Option<MovieInfo>, s: S) -> Result<S::Ok, S::Error> {
    match info {
        Some(info) => info.serialize(s),
        None => s.serialize_seq(Some(0))?.end(),
    }
}

/// Movie metadata for a movie key
pub async fn movie_info_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MovieKeyParams>,
) -> Json<MovieInfoResponse> {
    let Some(movie_key) = params.movie_key.filter(|k| !k.is_empty()) else {
        return Json(MovieInfoResponse::default());
    };
    debug!("get_movie_info({})", movie_key);

    let key = movie_key.clone();
    let info = lookup(&state, move |s| s.get_movie_info(&key)).await.flatten();

    Json(MovieInfoResponse { movie_key, info })
}

#[derive(Debug, Default, Serialize)]
pub struct ByKeyResponse {
    movie_key: String,
    locs: Vec<MovieLocation>,
}

/// Locations for a movie key
pub async fn by_key_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MovieKeyParams>,
) -> Json<ByKeyResponse> {
    let Some(movie_key) = params.movie_key.filter(|k| !k.is_empty()) else {
        return Json(ByKeyResponse::default());
    };
    debug!("get_by_key({})", movie_key);

    let key = movie_key.clone();
    let locs = lookup(&state, move |s| s.get_locations_by_key(&key))
        .await
        .unwrap_or_default();

    Json(ByKeyResponse { movie_key, locs })
}

#[derive(Deserialize)]
pub struct IndexesParams {
    /// JSON list of positions, e.g. "[5, 18, 25]"
    indexes: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ByIndexesResponse {
    locs: Vec<LocationEntry>,
}

/// Location records at positions of the latitude-sorted array
pub async fn by_indexes_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IndexesParams>,
) -> Json<ByIndexesResponse> {
    let Some(positions) = params.indexes.as_deref().and_then(parse_indexes) else {
        return Json(ByIndexesResponse::default());
    };
    if positions.is_empty() {
        return Json(ByIndexesResponse::default());
    }
    debug!("get_by_indexes({:?})", positions);

    let locs = lookup(&state, move |s| s.get_locations_by_positions(&positions))
        .await
        .unwrap_or_default();

    Json(ByIndexesResponse { locs })
}

/// Parse a JSON list whose elements are integers or integer strings.
///
/// Any other element rejects the whole list.
fn parse_indexes(raw: &str) -> Option<Vec<i64>> {
    let values: Vec<Value> = serde_json::from_str(raw).ok()?;
    values.iter().map(index_value).collect()
}

fn index_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Deserialize)]
pub struct LocParams {
    lat: Option<String>,
    lng: Option<String>,
    /// Radius in feet
    radius: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct IndexesByLocResponse {
    lat: f64,
    lng: f64,
    radius: f64,
    indexes: Vec<usize>,
}

/// Positions of all locations within `radius` feet of `lat`,`lng`
pub async fn indexes_by_loc_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocParams>,
) -> Json<IndexesByLocResponse> {
    let parsed = (
        parse_coordinate(&params.lat),
        parse_coordinate(&params.lng),
        parse_coordinate(&params.radius),
    );
    let (Some(lat), Some(lng), Some(radius)) = parsed else {
        return Json(IndexesByLocResponse::default());
    };
    if radius < 0.0 {
        return Json(IndexesByLocResponse::default());
    }
    debug!("get_indexes_by_loc({}, {}, {})", lat, lng, radius);

    let indexes = lookup(&state, move |s| s.query_radius(lat, lng, radius))
        .await
        .unwrap_or_default();

    Json(IndexesByLocResponse {
        lat,
        lng,
        radius,
        indexes,
    })
}

fn parse_coordinate(value: &Option<String>) -> Option<f64> {
    value
        .as_ref()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
