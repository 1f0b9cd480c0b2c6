// src/handlers/estadisticas.rs

use axum::{
    extract::{Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::ClinicaActual,
    models::estadisticas::{EstadisticasQuery, EstadisticasTurnos, FiltrosEstadisticas},
};

// GET /api/estadisticas
#[utoipa::path(
    get,
    path = "/api/estadisticas",
    tag = "Estadisticas",
    params(
        EstadisticasQuery,
        ("x-clinica-id" = Uuid, Header, description = "ID de la clínica")
    ),
    responses(
        (status = 200, description = "Foto del dashboard para el período", body = EstadisticasTurnos),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn obtener_estadisticas(
    State(app_state): State<AppState>,
    clinica: ClinicaActual,
    Query(query): Query<EstadisticasQuery>,
) -> Result<Json<EstadisticasTurnos>, AppError> {
    // El reloj vive en el borde: el agregador recibe el "hoy" ya resuelto.
    let hoy = chrono::Utc::now().date_naive();

    let filtros = FiltrosEstadisticas {
        estado_pago: query.estado_pago,
        profesional_id: query.profesional_id,
        sucursal_id: query.sucursal_id,
    };

    let stats = app_state.estadisticas_service
        .calcular(
            clinica.0,
            query.periodo,
            hoy,
            query.desde.as_deref(),
            query.hasta.as_deref(),
            filtros,
        )
        .await?;

    Ok(Json(stats))
}
