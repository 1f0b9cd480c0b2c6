// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{ClinicaRepository, TurnosRepository, UserRepository},
    services::{
        auth::AuthService, estadisticas_service::EstadisticasService,
        turnos_service::TurnosService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub clinica_repo: ClinicaRepository,
    pub auth_service: AuthService,
    pub turnos_service: TurnosService,
    pub estadisticas_service: EstadisticasService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL debe estar definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET debe estar definido");

        // Conecta a la base de datos, con '?' para propagar errores. El
        // acquire_timeout acotado es lo que después se traduce en un 503
        // reintentable en vez de colgar la request.
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida!");

        // --- Arma el grafo de dependencias ---
        let user_repo = UserRepository::new(db_pool.clone());
        let clinica_repo = ClinicaRepository::new(db_pool.clone());
        let turnos_repo = TurnosRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo,
            clinica_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let turnos_service = TurnosService::new(turnos_repo.clone());
        let estadisticas_service = EstadisticasService::new(turnos_repo);

        Ok(Self {
            db_pool,
            clinica_repo,
            auth_service,
            turnos_service,
            estadisticas_service,
        })
    }
}
