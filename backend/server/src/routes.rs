use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use bank::{
    ConfigReplacement, RegistrationQuery, Section, SectionUpdate, SiteConfig, Status, Submission,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{auth::AdminIdentity, error::AppError, services, state::State as AppState};

type Shared = State<Arc<AppState>>;

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|e| AppError::MalformedPayload(e.body_text()))
}

fn registration_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    id.map(|Path(id)| id).map_err(|_| AppError::NotFound)
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn config_handler(State(state): Shared) -> Result<Json<SiteConfig>, AppError> {
    Ok(Json(state.config_store.load_config().await?))
}

pub async fn replace_config_handler(
    State(state): Shared,
    _admin: AdminIdentity,
    body: Result<Json<ConfigReplacement>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let config = services::replace_config(&state, payload(body)?).await?;

    Ok(Json(json!({
        "message": "Configuration updated successfully",
        "config": config,
    })))
}

/// Pulls `{ "<sectionKey>": ... }` out of a request body.
fn section_update(section: Section, mut body: Value) -> Result<SectionUpdate, AppError> {
    let value = body
        .get_mut(section.key())
        .map(Value::take)
        .ok_or_else(|| AppError::MalformedPayload(format!("Missing {}", section.key())))?;

    let update = match section {
        Section::FormFields => serde_json::from_value(value).map(SectionUpdate::FormFields),
        Section::Schedule => serde_json::from_value(value).map(SectionUpdate::Schedule),
        Section::Curriculum => serde_json::from_value(value).map(SectionUpdate::Curriculum),
        Section::SiteInfo => serde_json::from_value(value).map(SectionUpdate::SiteInfo),
        Section::BonusBenefits => serde_json::from_value(value).map(SectionUpdate::BonusBenefits),
        Section::ContactInfo => serde_json::from_value(value).map(SectionUpdate::ContactInfo),
    };

    update.map_err(|e| AppError::MalformedPayload(format!("Invalid {}: {e}", section.key())))
}

async fn update_section(
    state: &AppState,
    section: Section,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let update = section_update(section, payload(body)?)?;
    let value = services::update_section(state, update).await?;

    let mut response = serde_json::Map::new();
    response.insert(
        "message".to_string(),
        json!(format!("{} updated successfully", section.key())),
    );
    response.insert(section.key().to_string(), value);

    Ok(Json(Value::Object(response)))
}

macro_rules! section_handler {
    ($handler:ident, $section:expr) => {
        pub async fn $handler(
            State(state): Shared,
            _admin: AdminIdentity,
            body: Result<Json<Value>, JsonRejection>,
        ) -> Result<Json<Value>, AppError> {
            update_section(&state, $section, body).await
        }
    };
}

section_handler!(form_fields_handler, Section::FormFields);
section_handler!(schedule_handler, Section::Schedule);
section_handler!(curriculum_handler, Section::Curriculum);
section_handler!(site_info_handler, Section::SiteInfo);
section_handler!(bonus_benefits_handler, Section::BonusBenefits);
section_handler!(contact_info_handler, Section::ContactInfo);

pub async fn register_handler(
    State(state): Shared,
    body: Result<Json<Submission>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let registration = services::register(&state, payload(body)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful",
            "data": registration,
        })),
    ))
}

pub async fn registrations_handler(
    State(state): Shared,
    _admin: AdminIdentity,
    query: Result<Query<RegistrationQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

    Ok(Json(services::list_registrations(&state, &query).await?))
}

pub async fn stats_handler(
    State(state): Shared,
    _admin: AdminIdentity,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(services::registration_stats(&state).await?))
}

pub async fn registration_handler(
    State(state): Shared,
    _admin: AdminIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = registration_id(id)?;

    Ok(Json(state.registrations.get(id).await?))
}

#[derive(Deserialize)]
pub struct StatusChange {
    status: Status,
}

pub async fn status_handler(
    State(state): Shared,
    _admin: AdminIdentity,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<StatusChange>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = registration_id(id)?;
    let StatusChange { status } = payload(body)?;

    Ok(Json(services::set_status(&state, id, status).await?))
}

pub async fn delete_registration_handler(
    State(state): Shared,
    _admin: AdminIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    services::delete_registration(&state, registration_id(id)?).await?;

    Ok(StatusCode::NO_CONTENT)
}
