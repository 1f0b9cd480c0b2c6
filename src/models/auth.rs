// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rol_usuario", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RolUsuario {
    Admin,
    Profesional,
    Paciente,
    Secretaria,
}

// ---
// Permisos
// ---
// Conjunto CERRADO de capacidades. En el sistema original esto era un mapa
// abierto de strings a booleanos; acá cualquier clave desconocida se rechaza
// en la deserialización y las ausentes quedan en `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct Permisos {
    pub manage_appointments: bool,
    pub manage_patients: bool,
    pub manage_users: bool,
    pub manage_professionals: bool,
    pub manage_sales: bool,
    pub manage_reports: bool,
    pub manage_specialties: bool,
    pub manage_treatments: bool,
    pub manage_branches: bool,
    pub manage_messaging: bool,
    pub manage_ai: bool,
    pub manage_medical_records: bool,
}

// Representa un usuario que viene de la base de datos
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    // NULL solamente para administradores de plataforma.
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub clinica_id: Option<Uuid>,

    #[schema(example = "ana@clinica-demo.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para seguridad
    pub password_hash: String,

    pub rol: RolUsuario,

    #[schema(value_type = Permisos)]
    pub permisos: Json<Permisos>,

    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

// Datos para el registro de un nuevo usuario
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegistroPayload {
    // Slug de la clínica donde se registra la cuenta.
    #[validate(length(min = 1, message = "La clínica es obligatoria."))]
    #[schema(example = "clinica-demo")]
    pub clinica: String,

    #[validate(email(message = "El e-mail provisto es inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,

    pub rol: RolUsuario,

    // Si no viene, arranca con todas las capacidades en false.
    pub permisos: Option<Permisos>,
}

// Datos para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    // Ausente = login de plataforma: el e-mail tiene que resolver a una
    // única cuenta entre todas las clínicas.
    #[schema(example = "clinica-demo")]
    pub clinica: Option<String>,

    #[validate(email(message = "El e-mail provisto es inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
}

// Respuesta de autenticación con el token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estructura de datos ("claims") dentro del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,                // ID del usuario
    pub clinica: Option<Uuid>,    // None para admins de plataforma
    pub rol: RolUsuario,
    pub exp: usize,               // Cuándo expira el token
    pub iat: usize,               // Cuándo fue emitido
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permisos_ausentes_quedan_en_false() {
        let permisos: Permisos =
            serde_json::from_str(r#"{ "manage-appointments": true }"#).unwrap();
        assert!(permisos.manage_appointments);
        assert!(!permisos.manage_patients);
        assert!(!permisos.manage_medical_records);
    }

    #[test]
    fn permisos_vacios_son_todo_false() {
        let permisos: Permisos = serde_json::from_str("{}").unwrap();
        assert_eq!(permisos, Permisos::default());
    }

    #[test]
    fn clave_desconocida_se_rechaza() {
        let resultado = serde_json::from_str::<Permisos>(
            r#"{ "manage-sales": true, "manage-rockets": true }"#,
        );
        assert!(resultado.is_err());
    }

    #[test]
    fn las_claves_usan_kebab_case() {
        let permisos = Permisos { manage_medical_records: true, ..Permisos::default() };
        let json = serde_json::to_value(&permisos).unwrap();
        assert_eq!(json["manage-medical-records"], true);
        assert_eq!(json["manage-appointments"], false);
    }
}
