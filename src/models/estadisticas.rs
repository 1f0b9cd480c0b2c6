// src/models/estadisticas.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::turnos::{EstadoPago, MedioPago, OrigenVenta};

// Selector de período del dashboard. Los períodos con nombre se resuelven
// contra el "hoy" que aporta el llamador; `personalizado` exige desde/hasta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PeriodoSeleccion {
    Hoy,
    Semana,
    Mes,
    #[serde(rename = "año", alias = "anio")]
    Anio,
    Personalizado,
}

// El rango exacto aplicado, ambos extremos inclusive. Se devuelve tal cual
// en la respuesta para que el llamador pueda verificar el borde usado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Periodo {
    #[schema(value_type = String, format = Date, example = "2025-01-01")]
    pub inicio: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2025-01-31")]
    pub fin: NaiveDate,
}

// Filtros opcionales que achican el escaneo antes de agregar.
// Sin setear significa "todos".
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct FiltrosEstadisticas {
    pub estado_pago: Option<EstadoPago>,
    pub profesional_id: Option<Uuid>,
    pub sucursal_id: Option<Uuid>,
}

// Query string del endpoint de estadísticas.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasQuery {
    pub periodo: PeriodoSeleccion,

    // Solo para `personalizado` (YYYY-MM-DD, inclusive).
    pub desde: Option<String>,
    pub hasta: Option<String>,

    pub estado_pago: Option<EstadoPago>,
    pub profesional_id: Option<Uuid>,
    pub sucursal_id: Option<Uuid>,
}

// La foto del dashboard para un período. Los mapas siempre traen TODAS las
// claves del enum, con 0 cuando no hubo ventas; BTreeMap para que la
// serialización sea determinista llamada a llamada.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasTurnos {
    pub total_turnos: i64,

    // Cantidad y monto de ventas cobradas (pagado + parcial). Las ventas
    // pendientes y sin_cargo suman 0 a todo total monetario.
    pub cantidad_ventas: i64,
    #[schema(example = "12500.00")]
    pub total_ventas: Decimal,

    // Cardinalidad de pacientes distintos vistos en el rango.
    pub total_pacientes: i64,

    // total_ventas / total_turnos; 0 cuando no hay turnos (nunca NaN).
    #[schema(example = "625.00")]
    pub promedio_venta_por_turno: Decimal,

    pub turnos_pagados: i64,
    pub turnos_pendientes: i64,
    pub turnos_parciales: i64,
    pub turnos_sin_cargo: i64,

    pub ventas_por_estado: BTreeMap<EstadoPago, Decimal>,
    pub ventas_por_medio_pago: BTreeMap<MedioPago, Decimal>,
    pub ventas_por_origen: BTreeMap<OrigenVenta, Decimal>,

    pub periodo: Periodo,
}
