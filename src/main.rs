//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::{auth_guard, clinica_guard};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() está bien acá: si la configuración falla, la aplicación no
    // debe arrancar.
    let app_state = AppState::new()
        .await
        .expect("Falló la inicialización del estado de la aplicación.");

    // Corre las migraciones de SQLx al arrancar. El esquema ya nace con la
    // constraint compuesta (clinica_id, email); nunca hubo una global.
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Fallaron las migraciones de la base de datos.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas!");

    // Rutas de autenticación (públicas)
    let auth_routes = Router::new()
        .route("/registro", post(handlers::auth::registro))
        .route("/login", post(handlers::auth::login));

    // Rutas de usuario (protegidas por el guard de autenticación)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Onboarding de clínicas (solo admins de plataforma)
    let clinica_routes = Router::new()
        .route("/", post(handlers::clinicas::crear_clinica))
        .route("/{id}/estado", patch(handlers::clinicas::cambiar_estado))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Todo lo que opera ADENTRO de una clínica exige el guard de tenant:
    // el id de la clínica viaja explícito en cada request.
    let operacion_routes = Router::new()
        .route("/usuarios/{id}/permisos", put(handlers::auth::actualizar_permisos))
        .route("/turnos"
               , post(handlers::turnos::crear_turno)
               .get(handlers::turnos::listar_turnos)
        )
        .route("/turnos/{id}/reprogramar", put(handlers::turnos::reprogramar_turno))
        .route("/ventas", post(handlers::turnos::registrar_venta))
        .route("/ventas/{id}/estado", put(handlers::turnos::transicionar_estado))
        .route("/ventas/{id}/estado/override", put(handlers::turnos::override_estado))
        .route("/estadisticas", get(handlers::estadisticas::obtener_estadisticas))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            clinica_guard,
        ));

    // Combina todo en el router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/clinicas", clinica_routes)
        .nest("/api", operacion_routes)
        .with_state(app_state);

    // Arranca el servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falló el arranque del listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Error en el servidor Axum");
}
