// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::registro,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::actualizar_permisos,

        // --- Clinicas ---
        handlers::clinicas::crear_clinica,
        handlers::clinicas::cambiar_estado,

        // --- Turnos y Ventas ---
        handlers::turnos::crear_turno,
        handlers::turnos::reprogramar_turno,
        handlers::turnos::listar_turnos,
        handlers::turnos::registrar_venta,
        handlers::turnos::transicionar_estado,
        handlers::turnos::override_estado,

        // --- Estadisticas ---
        handlers::estadisticas::obtener_estadisticas,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::RolUsuario,
            models::auth::Permisos,
            models::auth::User,
            models::auth::RegistroPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Clinicas ---
            models::clinica::EstadoClinica,
            models::clinica::Clinica,
            models::clinica::CrearClinicaPayload,
            models::clinica::CambiarEstadoClinicaPayload,

            // --- Turnos y Ventas ---
            models::turnos::EstadoPago,
            models::turnos::MedioPago,
            models::turnos::OrigenVenta,
            models::turnos::Turno,
            models::turnos::Venta,
            models::turnos::TurnoConVenta,
            models::turnos::CrearTurnoPayload,
            models::turnos::ReprogramarTurnoPayload,
            models::turnos::RegistrarVentaPayload,
            models::turnos::TransicionEstadoPayload,
            models::turnos::OverrideEstadoPayload,

            // --- Estadisticas ---
            models::estadisticas::PeriodoSeleccion,
            models::estadisticas::Periodo,
            models::estadisticas::EstadisticasTurnos,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación y registro"),
        (name = "Usuarios", description = "Permisos y datos del usuario"),
        (name = "Clinicas", description = "Onboarding y estado de clínicas"),
        (name = "Turnos", description = "Agenda de turnos"),
        (name = "Ventas", description = "Libro de ventas y estados de pago"),
        (name = "Estadisticas", description = "Indicadores del dashboard")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
