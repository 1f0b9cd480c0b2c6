// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::{RolUsuario, User}, clinica::EstadoClinica},
};

// El nombre de nuestro encabezado HTTP para elegir clínica.
const CLINICA_ID_HEADER: &str = "x-clinica-id";

// Guard de autenticación: valida el Bearer token y deja el usuario en las
// extensions de la request.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::TokenInvalido)?;

    let user = app_state.auth_service.validar_token(bearer.token()).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

// Guard de clínica: autentica Y resuelve la clínica del encabezado
// X-Clinica-Id. El tenant viaja explícito en cada request; acá no hay
// ningún contexto global.
pub async fn clinica_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::TokenInvalido)?;
    let user = app_state.auth_service.validar_token(bearer.token()).await?;

    let header_value = request
        .headers()
        .get(CLINICA_ID_HEADER)
        .ok_or_else(|| {
            AppError::EncabezadoInvalido("El encabezado X-Clinica-Id es obligatorio.".to_string())
        })?;

    let value_str = header_value.to_str().map_err(|_| {
        AppError::EncabezadoInvalido(
            "El encabezado X-Clinica-Id contiene caracteres inválidos.".to_string(),
        )
    })?;

    let clinica_id = Uuid::parse_str(value_str).map_err(|_| {
        AppError::EncabezadoInvalido(
            "El encabezado X-Clinica-Id no es un UUID.".to_string(),
        )
    })?;

    // Un usuario solo entra a SU clínica; el admin de plataforma
    // (sin clínica propia) entra a cualquiera.
    let es_admin_plataforma = user.clinica_id.is_none() && user.rol == RolUsuario::Admin;
    if user.clinica_id != Some(clinica_id) && !es_admin_plataforma {
        return Err(AppError::AccesoDenegado);
    }

    // Una clínica suspendida no opera.
    let clinica = app_state.clinica_repo
        .buscar_por_id(clinica_id)
        .await?
        .ok_or(AppError::ClinicaNoEncontrada)?;
    if clinica.estado == EstadoClinica::Suspendida {
        return Err(AppError::ClinicaSuspendida);
    }

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(ClinicaActual(clinica_id));

    Ok(next.run(request).await)
}

// Extractor para obtener el usuario autenticado directamente en los handlers
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::TokenInvalido)
    }
}

// Extractor con la clínica que el guard dejó en la request.
#[derive(Debug, Clone, Copy)]
pub struct ClinicaActual(pub Uuid);

impl<S> FromRequestParts<S> for ClinicaActual
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClinicaActual>()
            .copied()
            .ok_or_else(|| {
                AppError::EncabezadoInvalido(
                    "El encabezado X-Clinica-Id es obligatorio.".to_string(),
                )
            })
    }
}
