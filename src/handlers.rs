pub mod auth;
pub mod clinicas;
pub mod estadisticas;
pub mod turnos;
