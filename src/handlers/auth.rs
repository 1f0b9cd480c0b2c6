// src/handlers/auth.rs

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
    middleware::auth::{AuthenticatedUser, ClinicaActual},
    models::auth::{
        AuthResponse, LoginPayload, Permisos, RegistroPayload, RolUsuario, User,
    },
};

// POST /api/auth/registro
#[utoipa::path(
    post,
    path = "/api/auth/registro",
    tag = "Auth",
    request_body = RegistroPayload,
    responses(
        (status = 201, description = "Usuario creado", body = AuthResponse),
        (status = 409, description = "El e-mail ya existe en esa clínica"),
        (status = 404, description = "Clínica inexistente")
    )
)]
pub async fn registro(
    State(app_state): State<AppState>,
    Json(payload): Json<RegistroPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (_, token) = app_state.auth_service
        .registrar(
            &payload.clinica,
            &payload.email,
            &payload.password,
            payload.rol,
            payload.permisos,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 401, description = "Credenciales inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state.auth_service
        .login(payload.clinica.as_deref(), &payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Usuarios",
    responses(
        (status = 200, description = "El usuario autenticado", body = User),
        (status = 401, description = "No autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// PUT /api/usuarios/{id}/permisos
#[utoipa::path(
    put,
    path = "/api/usuarios/{id}/permisos",
    tag = "Usuarios",
    request_body = Permisos,
    params(
        ("id" = Uuid, Path, description = "ID del usuario"),
        ("x-clinica-id" = Uuid, Header, description = "ID de la clínica")
    ),
    responses(
        (status = 200, description = "Permisos actualizados", body = User),
        (status = 400, description = "Clave de permiso desconocida"),
        (status = 404, description = "Usuario inexistente en la clínica")
    ),
    security(("api_jwt" = []))
)]
pub async fn actualizar_permisos(
    State(app_state): State<AppState>,
    AuthenticatedUser(quien): AuthenticatedUser,
    clinica: ClinicaActual,
    Path(user_id): Path<Uuid>,
    // Clave desconocida => rechazo en la deserialización, antes de llegar acá.
    Json(permisos): Json<Permisos>,
) -> Result<Json<User>, AppError> {
    if quien.rol != RolUsuario::Admin && !quien.permisos.manage_users {
        return Err(AppError::AccesoDenegado);
    }

    let user = app_state.auth_service
        .actualizar_permisos(clinica.0, user_id, permisos)
        .await?;

    Ok(Json(user))
}
