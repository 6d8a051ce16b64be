//! `/events` handlers and their wire types.
//!
//! Object kinematic fields use camelCase on the wire (`velocityLab`,
//! `x0Lab`, `t0Lab`) to match the client; event scalars stay snake_case.
//! The object `kind` travels as `"type"`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use worldline_core::ObjectKind;
use worldline_store::sqlite::row_types::ObjectRow;
use worldline_store::{CreateEventOptions, EventDetail, ObjectEntry, UpdateEventOptions};

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::server::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// One object in a request payload.
///
/// All fields are optional at the deserialization layer; required-field
/// checks happen in the store's batch validation so that one error report
/// covers the whole submission.
#[derive(Debug, Deserialize)]
pub struct ObjectBody {
    /// Persisted object ID; present means "update this object".
    pub id: Option<String>,
    /// Object kind (`box`, `clock`, `flash`).
    #[serde(rename = "type")]
    pub kind: Option<ObjectKind>,
    /// Client-assigned display number.
    pub object_id: Option<i64>,
    /// Velocity in the lab frame, as a fraction of c.
    #[serde(rename = "velocityLab")]
    pub velocity_lab: Option<f64>,
    /// Position in the lab frame at `t0Lab`.
    #[serde(rename = "x0Lab")]
    pub x0_lab: Option<f64>,
    /// Reference time in the lab frame.
    #[serde(rename = "t0Lab")]
    pub t0_lab: Option<f64>,
}

impl From<ObjectBody> for ObjectEntry {
    fn from(body: ObjectBody) -> Self {
        Self {
            id: body.id,
            object_id: body.object_id,
            kind: body.kind,
            velocity_lab: body.velocity_lab,
            x0_lab: body.x0_lab,
            t0_lab: body.t0_lab,
        }
    }
}

/// `POST /events` payload.
#[derive(Debug, Deserialize)]
pub struct CreateEventBody {
    /// Event label.
    pub name: String,
    /// Global simulation time; defaults to 0.
    #[serde(default)]
    pub current_time: f64,
    /// Global reference-frame parameter; defaults to 0.
    #[serde(default)]
    pub current_reference_frame: f64,
    /// Initial object list; defaults to empty.
    #[serde(default)]
    pub objects: Vec<ObjectBody>,
}

/// `PUT`/`PATCH /events/{id}` payload.
///
/// Scalars are partial. `objects` is the complete desired set; omitting
/// it (or sending `[]`) deletes every persisted object.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventBody {
    /// New label, if submitted.
    pub name: Option<String>,
    /// New simulation time, if submitted.
    pub current_time: Option<f64>,
    /// New reference-frame parameter, if submitted.
    pub current_reference_frame: Option<f64>,
    /// Desired object set.
    #[serde(default)]
    pub objects: Vec<ObjectBody>,
}

/// One object in a response.
#[derive(Debug, Serialize)]
pub struct ObjectRepr {
    /// Persisted object ID.
    pub id: String,
    /// Object kind.
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Client-assigned display number.
    pub object_id: Option<i64>,
    /// Velocity in the lab frame.
    #[serde(rename = "velocityLab")]
    pub velocity_lab: f64,
    /// Position in the lab frame at `t0Lab`.
    #[serde(rename = "x0Lab")]
    pub x0_lab: f64,
    /// Reference time in the lab frame.
    #[serde(rename = "t0Lab")]
    pub t0_lab: f64,
}

impl From<ObjectRow> for ObjectRepr {
    fn from(row: ObjectRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            object_id: row.object_id,
            velocity_lab: row.velocity_lab,
            x0_lab: row.x0_lab,
            t0_lab: row.t0_lab,
        }
    }
}

/// A full event in a response.
#[derive(Debug, Serialize)]
pub struct EventRepr {
    /// Event ID.
    pub id: String,
    /// Owner's username (read-only).
    pub user: String,
    /// Event label.
    pub name: String,
    /// Global simulation time.
    pub current_time: f64,
    /// Global reference-frame parameter.
    pub current_reference_frame: f64,
    /// Objects in creation order.
    pub objects: Vec<ObjectRepr>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last-modified timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<EventDetail> for EventRepr {
    fn from(detail: EventDetail) -> Self {
        Self {
            id: detail.event.id,
            user: detail.username,
            name: detail.event.name,
            current_time: detail.event.current_time,
            current_reference_frame: detail.event.current_reference_frame,
            objects: detail.objects.into_iter().map(ObjectRepr::from).collect(),
            created_at: detail.event.created_at,
            updated_at: detail.event.updated_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::Validation {
            field: None,
            message: rejection.body_text(),
        }),
    }
}

fn to_entries(objects: Vec<ObjectBody>) -> Vec<ObjectEntry> {
    objects.into_iter().map(ObjectEntry::from).collect()
}

/// `GET /events` — list the caller's events, newest first.
#[instrument(skip(state), fields(user = %user.id))]
pub async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<EventRepr>>, ApiError> {
    let details = state.store.list_events(&user.id)?;
    Ok(Json(details.into_iter().map(EventRepr::from).collect()))
}

/// `POST /events` — create an event with its embedded objects.
#[instrument(skip(state, body), fields(user = %user.id))]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<CreateEventBody>, JsonRejection>,
) -> Result<(StatusCode, Json<EventRepr>), ApiError> {
    let body = parse_body(body)?;
    let objects = to_entries(body.objects);

    let detail = state.store.create_event(
        &user.id,
        &CreateEventOptions {
            name: &body.name,
            current_time: body.current_time,
            current_reference_frame: body.current_reference_frame,
            objects: &objects,
        },
    )?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// `GET /events/{id}` — fetch one event, scoped to the caller.
#[instrument(skip(state), fields(user = %user.id, event = %event_id))]
pub async fn get_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<EventRepr>, ApiError> {
    let detail = state.store.get_event(&user.id, &event_id)?;
    Ok(Json(detail.into()))
}

/// `PUT`/`PATCH /events/{id}` — update scalars and reconcile objects.
#[instrument(skip(state, body), fields(user = %user.id, event = %event_id))]
pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<String>,
    body: Result<Json<UpdateEventBody>, JsonRejection>,
) -> Result<Json<EventRepr>, ApiError> {
    let body = parse_body(body)?;
    let objects = to_entries(body.objects);

    let detail = state.store.update_event(
        &user.id,
        &event_id,
        &UpdateEventOptions {
            name: body.name.as_deref(),
            current_time: body.current_time,
            current_reference_frame: body.current_reference_frame,
            objects: &objects,
        },
    )?;
    Ok(Json(detail.into()))
}

/// `DELETE /events/{id}` — delete an event and its objects.
#[instrument(skip(state), fields(user = %user.id, event = %event_id))]
pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_event(&user.id, &event_id)?;
    Ok(StatusCode::NO_CONTENT)
}
