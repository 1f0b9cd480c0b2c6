pub mod auth;
pub mod estadisticas_service;
pub mod turnos_service;
