// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::turnos::EstadoPago;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    // (email, clinica) ya existe. Nunca se fusiona en silencio.
    #[error("Ya existe un usuario con ese e-mail en la clínica")]
    UsuarioYaExiste,

    #[error("Credenciales inválidas")]
    CredencialesInvalidas,

    // El identificador resuelve a más de un usuario en el login de
    // plataforma. Hacia afuera responde igual que CredencialesInvalidas.
    #[error("El identificador resuelve a más de una cuenta")]
    IdentidadAmbigua,

    #[error("Token inválido")]
    TokenInvalido,

    #[error("Encabezado inválido: {0}")]
    EncabezadoInvalido(String),

    #[error("Acceso denegado")]
    AccesoDenegado,

    #[error("Usuario no encontrado")]
    UsuarioNoEncontrado,

    #[error("Clínica no encontrada")]
    ClinicaNoEncontrada,

    #[error("La clínica está suspendida")]
    ClinicaSuspendida,

    #[error("Turno no encontrado")]
    TurnoNoEncontrado,

    #[error("Venta no encontrada")]
    VentaNoEncontrada,

    #[error("El turno ya tiene una venta asociada")]
    TurnoYaFacturado,

    // Fecha u hora mal formadas; `campo` nombra cuál de los dos falló.
    #[error("Horario inválido en el campo '{campo}'")]
    HorarioInvalido { campo: &'static str },

    #[error("Período inválido: {0}")]
    PeriodoInvalido(String),

    #[error("El monto no puede ser negativo")]
    MontoInvalido,

    #[error("Transición de estado no permitida: {de:?} -> {a:?}")]
    TransicionEstadoInvalida { de: EstadoPago, a: EstadoPago },

    // Transitorio: la única condición que el llamador debe reintentar.
    #[error("Almacenamiento no disponible")]
    AlmacenamientoNoDisponible,

    // Variante para errores de base de datos. Sin `#[from]`: la conversión
    // manual de abajo separa los fallos transitorios de pool.
    #[error("Error de base de datos")]
    DatabaseError(sqlx::Error),

    // Variante genérica para cualquier otro error inesperado.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Los timeouts de pool y los cortes de conexión son reintentables; el resto
// de los errores de sqlx son fatales y terminan en el arm de 500.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::AlmacenamientoNoDisponible
            }
            other => AppError::DatabaseError(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolvemos todos los detalles de la validación.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::UsuarioYaExiste => {
                (StatusCode::CONFLICT, "Este e-mail ya está en uso en la clínica.".to_string())
            }
            AppError::CredencialesInvalidas => {
                (StatusCode::UNAUTHORIZED, "E-mail o contraseña inválidos.".to_string())
            }
            // Mismo cuerpo que CredencialesInvalidas: no filtramos hacia el
            // cliente si el identificador existe o no. El log sí distingue.
            AppError::IdentidadAmbigua => {
                tracing::warn!("Login de plataforma con identificador ambiguo");
                (StatusCode::UNAUTHORIZED, "E-mail o contraseña inválidos.".to_string())
            }
            AppError::TokenInvalido => {
                (StatusCode::UNAUTHORIZED, "Token de autenticación inválido o ausente.".to_string())
            }
            AppError::EncabezadoInvalido(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AccesoDenegado => {
                (StatusCode::FORBIDDEN, "No tenés acceso a esta clínica.".to_string())
            }
            AppError::UsuarioNoEncontrado => {
                (StatusCode::NOT_FOUND, "Usuario no encontrado.".to_string())
            }
            AppError::ClinicaNoEncontrada => {
                (StatusCode::NOT_FOUND, "Clínica no encontrada.".to_string())
            }
            AppError::ClinicaSuspendida => {
                (StatusCode::FORBIDDEN, "La clínica está suspendida.".to_string())
            }
            AppError::TurnoNoEncontrado => {
                (StatusCode::NOT_FOUND, "Turno no encontrado.".to_string())
            }
            AppError::VentaNoEncontrada => {
                (StatusCode::NOT_FOUND, "Venta no encontrada.".to_string())
            }
            AppError::TurnoYaFacturado => {
                (StatusCode::CONFLICT, "El turno ya tiene una venta asociada.".to_string())
            }
            AppError::HorarioInvalido { campo } => {
                let body = Json(json!({
                    "error": "Fecha u hora inválidas.",
                    "campo": campo,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::PeriodoInvalido(msg) => {
                (StatusCode::BAD_REQUEST, format!("Período inválido: {}.", msg))
            }
            AppError::MontoInvalido => {
                (StatusCode::BAD_REQUEST, "El monto no puede ser negativo.".to_string())
            }
            AppError::TransicionEstadoInvalida { de, a } => {
                tracing::warn!("Transición de estado rechazada: {:?} -> {:?}", de, a);
                (StatusCode::CONFLICT, "La transición de estado de pago no está permitida.".to_string())
            }
            AppError::AlmacenamientoNoDisponible => {
                tracing::warn!("Almacenamiento no disponible; el cliente puede reintentar");
                (StatusCode::SERVICE_UNAVAILABLE, "Servicio temporalmente no disponible. Reintente.".to_string())
            }

            // Todos los demás (DatabaseError, InternalServerError...) son 500.
            // El `tracing` registra el detalle que `thiserror` nos dio.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocurrió un error inesperado.".to_string())
            }
        };

        // Respuesta estándar para errores simples con un solo mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_de_pool_es_reintentable() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::AlmacenamientoNoDisponible));
    }

    #[test]
    fn error_de_fila_no_es_reintentable() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
