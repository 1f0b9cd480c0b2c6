pub mod clinica_repo;
pub use clinica_repo::ClinicaRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod turnos_repo;
pub use turnos_repo::TurnosRepository;
