// src/handlers/turnos.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::ClinicaActual,
    models::turnos::{
        CrearTurnoPayload, OverrideEstadoPayload, RegistrarVentaPayload,
        ReprogramarTurnoPayload, TransicionEstadoPayload, Turno, TurnoConVenta, Venta,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListarTurnosQuery {
    // Rango [desde, hasta] inclusive, YYYY-MM-DD.
    pub desde: String,
    pub hasta: String,
}

// POST /api/turnos
#[utoipa::path(
    post,
    path = "/api/turnos",
    tag = "Turnos",
    request_body = CrearTurnoPayload,
    params(("x-clinica-id" = Uuid, Header, description = "ID de la clínica")),
    responses(
        (status = 201, description = "Turno agendado", body = Turno),
        (status = 400, description = "Fecha u hora mal formadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn crear_turno(
    State(app_state): State<AppState>,
    clinica: ClinicaActual,
    Json(payload): Json<CrearTurnoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let turno = app_state.turnos_service.crear_turno(clinica.0, payload).await?;

    Ok((StatusCode::CREATED, Json(turno)))
}

// PUT /api/turnos/{id}/reprogramar
#[utoipa::path(
    put,
    path = "/api/turnos/{id}/reprogramar",
    tag = "Turnos",
    request_body = ReprogramarTurnoPayload,
    params(
        ("id" = Uuid, Path, description = "ID del turno"),
        ("x-clinica-id" = Uuid, Header, description = "ID de la clínica")
    ),
    responses(
        (status = 200, description = "Turno reprogramado", body = Turno),
        (status = 400, description = "Fecha u hora mal formadas"),
        (status = 404, description = "Turno inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn reprogramar_turno(
    State(app_state): State<AppState>,
    clinica: ClinicaActual,
    Path(turno_id): Path<Uuid>,
    Json(payload): Json<ReprogramarTurnoPayload>,
) -> Result<Json<Turno>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let turno = app_state.turnos_service
        .reprogramar(clinica.0, turno_id, payload)
        .await?;

    Ok(Json(turno))
}

// GET /api/turnos
#[utoipa::path(
    get,
    path = "/api/turnos",
    tag = "Turnos",
    params(
        ListarTurnosQuery,
        ("x-clinica-id" = Uuid, Header, description = "ID de la clínica")
    ),
    responses(
        (status = 200, description = "Turnos del rango con su venta", body = [TurnoConVenta]),
        (status = 400, description = "Rango inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_turnos(
    State(app_state): State<AppState>,
    clinica: ClinicaActual,
    Query(query): Query<ListarTurnosQuery>,
) -> Result<Json<Vec<TurnoConVenta>>, AppError> {
    let filas = app_state.turnos_service
        .listar_para_periodo(clinica.0, &query.desde, &query.hasta)
        .await?;

    Ok(Json(filas))
}

// POST /api/ventas
#[utoipa::path(
    post,
    path = "/api/ventas",
    tag = "Ventas",
    request_body = RegistrarVentaPayload,
    params(("x-clinica-id" = Uuid, Header, description = "ID de la clínica")),
    responses(
        (status = 201, description = "Venta registrada", body = Venta),
        (status = 400, description = "Monto negativo"),
        (status = 404, description = "Turno asociado inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar_venta(
    State(app_state): State<AppState>,
    clinica: ClinicaActual,
    Json(payload): Json<RegistrarVentaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let venta = app_state.turnos_service.registrar_venta(clinica.0, payload).await?;

    Ok((StatusCode::CREATED, Json(venta)))
}

// PUT /api/ventas/{id}/estado
#[utoipa::path(
    put,
    path = "/api/ventas/{id}/estado",
    tag = "Ventas",
    request_body = TransicionEstadoPayload,
    params(
        ("id" = Uuid, Path, description = "ID de la venta"),
        ("x-clinica-id" = Uuid, Header, description = "ID de la clínica")
    ),
    responses(
        (status = 200, description = "Estado avanzado", body = Venta),
        (status = 409, description = "La transición retrocede o repite estado"),
        (status = 404, description = "Venta inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn transicionar_estado(
    State(app_state): State<AppState>,
    clinica: ClinicaActual,
    Path(venta_id): Path<Uuid>,
    Json(payload): Json<TransicionEstadoPayload>,
) -> Result<Json<Venta>, AppError> {
    let venta = app_state.turnos_service
        .transicionar_estado(clinica.0, venta_id, payload.estado)
        .await?;

    Ok(Json(venta))
}

// PUT /api/ventas/{id}/estado/override
#[utoipa::path(
    put,
    path = "/api/ventas/{id}/estado/override",
    tag = "Ventas",
    request_body = OverrideEstadoPayload,
    params(
        ("id" = Uuid, Path, description = "ID de la venta"),
        ("x-clinica-id" = Uuid, Header, description = "ID de la clínica")
    ),
    responses(
        (status = 200, description = "Estado pisado por override administrativo", body = Venta),
        (status = 404, description = "Venta inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn override_estado(
    State(app_state): State<AppState>,
    clinica: ClinicaActual,
    Path(venta_id): Path<Uuid>,
    Json(payload): Json<OverrideEstadoPayload>,
) -> Result<Json<Venta>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let venta = app_state.turnos_service
        .override_estado(clinica.0, venta_id, payload.estado, &payload.motivo)
        .await?;

    Ok(Json(venta))
}
