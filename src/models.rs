pub mod auth;
pub mod clinica;
pub mod estadisticas;
pub mod turnos;
