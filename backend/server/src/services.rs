//! Operations behind the routes. Handlers stay thin; everything that touches
//! both the config document and the registrations happens here.
use bank::{
    ConfigReplacement, Registration, RegistrationQuery, SectionUpdate, SiteConfig, Stats, Status,
    Submission, ValidationError, registration::Page, validate,
};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{error::AppError, state::State};

/// Validates against the live schema, then inserts. Nothing is stored unless every check passes.
pub async fn register(state: &State, submission: Submission) -> Result<Registration, AppError> {
    let config = state.config_store.load_config().await?;

    let registered = state.registrations.count().await?;
    if !config.site_info.accepts_registration(registered) {
        debug!("Submission refused, registration closed at {registered}");
        return Err(AppError::RegistrationClosed);
    }

    let errors = validate(&submission, config.form_fields.as_slice());
    if !errors.is_empty() {
        debug!("Submission failed {} schema checks", errors.len());
        return Err(ValidationError(errors).into());
    }

    let registration =
        Registration::from_submission(&submission, Utc::now()).map_err(ValidationError)?;

    state.registrations.insert(&registration).await?;
    info!("Registration {} created", registration.id);

    Ok(registration)
}

pub async fn list_registrations(state: &State, query: &RegistrationQuery) -> Result<Page, AppError> {
    let registrations = state.registrations.all().await?;

    Ok(query.run(registrations))
}

pub async fn registration_stats(state: &State) -> Result<Stats, AppError> {
    let registrations = state.registrations.all().await?;

    Ok(Stats::collect(&registrations))
}

pub async fn set_status(state: &State, id: Uuid, status: Status) -> Result<Registration, AppError> {
    let registration = state.registrations.update_status(id, status).await?;
    info!("Registration {id} marked {status:?}");

    Ok(registration)
}

pub async fn delete_registration(state: &State, id: Uuid) -> Result<(), AppError> {
    state.registrations.delete(id).await?;
    info!("Registration {id} deleted");

    Ok(())
}

/// Applies one section write and returns the stored value of that section.
pub async fn update_section(state: &State, update: SectionUpdate) -> Result<Value, AppError> {
    let mut config = state.config_store.load_config().await?;

    let section = config.apply(update, Utc::now())?;
    state.config_store.save_section(section, &config).await?;
    info!("Section {} updated", section.key());

    config
        .section_value(section)
        .map_err(|e| AppError::Store(e.into()))
}

pub async fn replace_config(
    state: &State,
    incoming: ConfigReplacement,
) -> Result<SiteConfig, AppError> {
    let mut config = state.config_store.load_config().await?;

    config.replace(incoming, Utc::now())?;
    state.config_store.save_config(&config).await?;
    info!("Site config replaced");

    Ok(config)
}
