// src/models/clinica.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Una clínica nunca se borra físicamente; solo transiciona de estado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estado_clinica", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstadoClinica {
    Activa,
    Suspendida,
}

// ---
// Clinica (el "Tenant")
// ---
// La cuenta aislada: todos los usuarios, turnos y ventas pertenecen a
// exactamente una clínica.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Clinica {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    // Único a nivel global; se usa para ruteo.
    #[schema(example = "clinica-demo")]
    pub slug: String,

    #[schema(example = "Clínica Demo")]
    pub nombre: String,

    pub estado: EstadoClinica,

    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

// Datos para el alta de una clínica (flujo de onboarding)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearClinicaPayload {
    #[validate(length(min = 3, max = 60, message = "El slug debe tener entre 3 y 60 caracteres."))]
    #[schema(example = "clinica-demo")]
    pub slug: String,

    #[validate(length(min = 1, message = "El nombre no puede estar vacío."))]
    #[schema(example = "Clínica Demo")]
    pub nombre: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CambiarEstadoClinicaPayload {
    pub estado: EstadoClinica,
}
