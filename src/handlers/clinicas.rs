// src/handlers/clinicas.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{RolUsuario, User},
        clinica::{CambiarEstadoClinicaPayload, Clinica, CrearClinicaPayload},
    },
};

// El onboarding de clínicas es cosa de la plataforma, no de una clínica.
fn exigir_admin_plataforma(user: &User) -> Result<(), AppError> {
    if user.clinica_id.is_none() && user.rol == RolUsuario::Admin {
        Ok(())
    } else {
        Err(AppError::AccesoDenegado)
    }
}

// POST /api/clinicas
#[utoipa::path(
    post,
    path = "/api/clinicas",
    tag = "Clinicas",
    request_body = CrearClinicaPayload,
    responses(
        (status = 201, description = "Clínica creada", body = Clinica),
        (status = 403, description = "Solo para administradores de plataforma")
    ),
    security(("api_jwt" = []))
)]
pub async fn crear_clinica(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CrearClinicaPayload>,
) -> Result<impl IntoResponse, AppError> {
    exigir_admin_plataforma(&user)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let clinica = app_state.clinica_repo
        .crear(&app_state.db_pool, &payload.slug, &payload.nombre)
        .await?;

    tracing::info!(clinica = %clinica.id, slug = %clinica.slug, "Clínica creada");

    Ok((StatusCode::CREATED, Json(clinica)))
}

// PATCH /api/clinicas/{id}/estado
#[utoipa::path(
    patch,
    path = "/api/clinicas/{id}/estado",
    tag = "Clinicas",
    request_body = CambiarEstadoClinicaPayload,
    params(("id" = Uuid, Path, description = "ID de la clínica")),
    responses(
        (status = 200, description = "Estado actualizado", body = Clinica),
        (status = 404, description = "Clínica inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn cambiar_estado(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(clinica_id): Path<Uuid>,
    Json(payload): Json<CambiarEstadoClinicaPayload>,
) -> Result<Json<Clinica>, AppError> {
    exigir_admin_plataforma(&user)?;

    let clinica = app_state.clinica_repo
        .cambiar_estado(clinica_id, payload.estado)
        .await?;

    tracing::info!(clinica = %clinica.id, estado = ?clinica.estado, "Estado de clínica actualizado");

    Ok(Json(clinica))
}
