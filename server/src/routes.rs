//! HTTP handlers for `/v1/todos`.
//!
//! # Design
//! One path, four methods. Identifiers arrive either in the query string
//! (`GET`, `DELETE`) or in the JSON body (`PUT`) and are normalized to
//! `TodoId` before the store is touched. Bodies go through `JsonBody`: a
//! missing body or a body that is not a JSON object is a 400, an oversized
//! one a 413, and only text that is not JSON at all ends up as a 500.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, FromRequest, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{
    Result, TodoError, BODY_INVALID, BODY_REQUIRED, BODY_TOO_LARGE, ID_INVALID, ID_REQUIRED,
};
use crate::store::{TodoId, TodoItem, TodoStore};

pub const TODOS_PATH: &str = "/v1/todos";

pub type SharedStore = Arc<TodoStore>;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "only_true")]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub id: Option<IdParam>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "only_true")]
    pub completed: Option<bool>,
}

/// The `id` of an update body: a JSON number or a numeric string. Anything
/// else is kept so it can be reported as an invalid id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdParam {
    Number(u64),
    Text(String),
    Other(Value),
}

impl IdParam {
    pub fn to_id(&self) -> Result<TodoId> {
        match self {
            IdParam::Number(n) => Ok(TodoId(*n)),
            IdParam::Text(s) if s.is_empty() => Err(TodoError::validation(ID_REQUIRED)),
            IdParam::Text(s) => TodoId::parse(s),
            IdParam::Other(_) => Err(TodoError::validation(ID_INVALID)),
        }
    }
}

/// A present `completed` is `true` only when it is the JSON literal `true`.
fn only_true<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(value == Value::Bool(true)))
}

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// `application/json` or any `application/*+json`, ignoring case and
/// parameters.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

/// JSON object body extractor that insists a body is actually present.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = TodoError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_json = is_json_content_type(req.headers());

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                TodoError::TooLarge(BODY_TOO_LARGE.to_string())
            } else {
                TodoError::Internal(format!("reading request body: {}", e.body_text()))
            }
        })?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(TodoError::validation(BODY_REQUIRED));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| TodoError::Internal(format!("decoding request body: {e}")))?;
        if !value.is_object() {
            return Err(TodoError::validation(BODY_INVALID));
        }

        serde_json::from_value(value).map(JsonBody).map_err(|e| {
            log::debug!("rejecting request body: {e}");
            TodoError::validation(BODY_INVALID)
        })
    }
}

/// Normalize the `id` query parameter; an empty value counts as absent.
fn id_from_query(query: &IdQuery) -> Result<Option<TodoId>> {
    query
        .id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(str::parse::<TodoId>)
        .transpose()
}

/// A query string axum cannot decode (e.g. a repeated `id`) is an invalid id.
fn query_id(query: std::result::Result<Query<IdQuery>, QueryRejection>) -> Result<Option<TodoId>> {
    match query {
        Ok(Query(query)) => id_from_query(&query),
        Err(rejection) => {
            log::debug!("rejecting query string: {}", rejection.body_text());
            Err(TodoError::validation(ID_INVALID))
        }
    }
}

/// Method table for the todos collection path.
pub fn todo_routes() -> MethodRouter<SharedStore> {
    get(retrieve_todos)
        .post(create_todo)
        .put(update_todo)
        .delete(delete_todo)
        .fallback(not_found)
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn create_todo(
    State(store): State<SharedStore>,
    JsonBody(input): JsonBody<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoItem>)> {
    let item = store
        .add_todo(input.title.as_deref(), input.completed)
        .await?;
    log::info!("created todo {}", item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

async fn retrieve_todos(
    State(store): State<SharedStore>,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> Result<Response> {
    match query_id(query)? {
        Some(id) => Ok(Json(store.get_todo(id).await?).into_response()),
        None => Ok(Json(store.get_todo_list().await).into_response()),
    }
}

async fn update_todo(
    State(store): State<SharedStore>,
    JsonBody(input): JsonBody<UpdateTodoRequest>,
) -> Result<Json<TodoItem>> {
    let id = input
        .id
        .ok_or_else(|| TodoError::validation(ID_REQUIRED))?
        .to_id()?;
    let item = store
        .update_todo(id, input.title.as_deref(), input.completed)
        .await?;
    log::info!("updated todo {id}");
    Ok(Json(item))
}

async fn delete_todo(
    State(store): State<SharedStore>,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> Result<StatusCode> {
    let id = query_id(query)?.ok_or_else(|| TodoError::validation(ID_REQUIRED))?;
    store.delete_todo(id).await?;
    log::info!("deleted todo {id}");
    Ok(StatusCode::NO_CONTENT)
}
