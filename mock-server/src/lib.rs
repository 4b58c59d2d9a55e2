//! In-memory JSON tree server speaking the Firebase-style REST dialect.
//!
//! Every resource is addressed as `/<path>.json`; the path segments walk the
//! tree from the root. `null` children and empty objects are never stored.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub type Db = Arc<RwLock<Value>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    secret: Option<Arc<str>>,
}

type Params = Query<HashMap<String, String>>;

pub fn app() -> Router {
    app_with_secret(None)
}

/// Router that rejects requests whose `auth` parameter differs from `secret`.
pub fn app_with_secret(secret: Option<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Value::Null)),
        secret: secret.map(Arc::from),
    };
    Router::new()
        .route(
            "/{*path}",
            get(read_node)
                .put(write_node)
                .post(push_node)
                .patch(update_node)
                .delete(remove_node),
        )
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_secret(
    listener: TcpListener,
    secret: Option<String>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_secret(secret)).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Split `a/b/c.json` into `["a", "b", "c"]`. `None` without the suffix.
pub fn node_path(raw: &str) -> Option<Vec<String>> {
    let path = raw.strip_suffix(".json")?;
    Some(
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Resolve the path and check the `auth` parameter.
fn authorize(
    state: &AppState,
    raw: &str,
    params: &HashMap<String, String>,
) -> Result<Vec<String>, Response> {
    let path = node_path(raw).ok_or_else(|| error(StatusCode::NOT_FOUND, "Not Found"))?;
    if let Some(secret) = &state.secret {
        if params.get("auth").map(String::as_str) != Some(&**secret) {
            return Err(error(StatusCode::UNAUTHORIZED, "Permission denied"));
        }
    }
    Ok(path)
}

fn parse_body(body: &str) -> Result<Value, Response> {
    serde_json::from_str(body).map_err(|_| {
        error(
            StatusCode::BAD_REQUEST,
            "Invalid data; couldn't parse JSON object, array, or value.",
        )
    })
}

pub fn get_node<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(key))
}

/// Replace the node at `path` with `value`, creating parents as needed.
/// Storing `null` removes the node; parents left empty are removed too.
pub fn set_node(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = prune(value);
        return;
    };
    let mut node = &mut *root;
    for key in parents {
        node = child_object(node).entry(key.clone()).or_insert(Value::Null);
    }
    let value = prune(value);
    if value.is_null() {
        if let Value::Object(map) = node {
            map.remove(last);
        }
    } else {
        child_object(node).insert(last.clone(), value);
    }
    *root = prune(root.take());
}

fn child_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced by an object"),
    }
}

/// Drop `null` children and empty objects, recursively.
pub fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, prune(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if map.is_empty() {
                Value::Null
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}

async fn read_node(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Params,
) -> Result<Response, Response> {
    let path = authorize(&state, &raw, &params)?;
    let db = state.db.read().await;
    let node = get_node(&db, &path).cloned().unwrap_or(Value::Null);
    Ok(Json(node).into_response())
}

async fn write_node(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Params,
    body: String,
) -> Result<Response, Response> {
    let path = authorize(&state, &raw, &params)?;
    let value = parse_body(&body)?;
    debug!(path = %raw, "put");
    let mut db = state.db.write().await;
    set_node(&mut db, &path, value.clone());
    Ok(Json(value).into_response())
}

async fn push_node(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Params,
    body: String,
) -> Result<Response, Response> {
    let mut path = authorize(&state, &raw, &params)?;
    let value = parse_body(&body)?;
    let name = format!("-{}", Uuid::new_v4().simple());
    debug!(path = %raw, %name, "push");
    path.push(name.clone());
    let mut db = state.db.write().await;
    set_node(&mut db, &path, value);
    Ok(Json(json!({ "name": name })).into_response())
}

async fn update_node(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Params,
    body: String,
) -> Result<Response, Response> {
    let path = authorize(&state, &raw, &params)?;
    let value = parse_body(&body)?;
    let Value::Object(children) = &value else {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Invalid data; PATCH requires a JSON object.",
        ));
    };
    debug!(path = %raw, children = children.len(), "patch");
    let mut db = state.db.write().await;
    for (key, child) in children {
        let mut child_path = path.clone();
        child_path.extend(key.split('/').filter(|s| !s.is_empty()).map(str::to_string));
        set_node(&mut db, &child_path, child.clone());
    }
    Ok(Json(value).into_response())
}

async fn remove_node(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Params,
) -> Result<Response, Response> {
    let path = authorize(&state, &raw, &params)?;
    debug!(path = %raw, "delete");
    let mut db = state.db.write().await;
    set_node(&mut db, &path, Value::Null);
    Ok(StatusCode::NO_CONTENT.into_response())
}
