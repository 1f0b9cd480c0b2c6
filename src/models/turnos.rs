// src/models/turnos.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (mapeando los tipos de Postgres) ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "estado_pago", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstadoPago {
    Pagado,
    Parcial,
    Pendiente,
    SinCargo,
}

impl EstadoPago {
    pub const TODOS: [EstadoPago; 4] = [
        EstadoPago::Pagado,
        EstadoPago::Parcial,
        EstadoPago::Pendiente,
        EstadoPago::SinCargo,
    ];

    // Ciclo de vida normal: pendiente -> parcial -> pagado, o bien
    // pendiente -> sin_cargo. Nunca hacia atrás por este camino; para eso
    // existe el override administrativo.
    pub fn transicion_permitida(self, hacia: EstadoPago) -> bool {
        matches!(
            (self, hacia),
            (EstadoPago::Pendiente, EstadoPago::Parcial)
                | (EstadoPago::Pendiente, EstadoPago::Pagado)
                | (EstadoPago::Parcial, EstadoPago::Pagado)
                | (EstadoPago::Pendiente, EstadoPago::SinCargo)
        )
    }

    // Estados desde los que se puede llegar a `hacia` por el camino normal.
    // El UPDATE del repositorio usa esta lista en su WHERE.
    pub fn predecesores(hacia: EstadoPago) -> Vec<EstadoPago> {
        EstadoPago::TODOS
            .into_iter()
            .filter(|de| de.transicion_permitida(hacia))
            .collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "medio_pago", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MedioPago {
    Efectivo,
    Tarjeta,
    Transferencia,
    Mercadopago,
    Paypal,
    Otro,
}

impl MedioPago {
    pub const TODOS: [MedioPago; 6] = [
        MedioPago::Efectivo,
        MedioPago::Tarjeta,
        MedioPago::Transferencia,
        MedioPago::Mercadopago,
        MedioPago::Paypal,
        MedioPago::Otro,
    ];
}

// Canal de adquisición atribuido a la venta.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "origen_venta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrigenVenta {
    Instagram,
    Organico,
    #[serde(rename = "google-ads")]
    GoogleAds,
    Whatsapp,
}

impl OrigenVenta {
    pub const TODOS: [OrigenVenta; 4] = [
        OrigenVenta::Instagram,
        OrigenVenta::Organico,
        OrigenVenta::GoogleAds,
        OrigenVenta::Whatsapp,
    ];
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Turno {
    pub id: Uuid,

    #[schema(ignore)]
    pub clinica_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-03-15")]
    pub fecha: NaiveDate,

    #[schema(value_type = String, example = "14:30")]
    pub hora: NaiveTime,

    pub profesional_id: Uuid,
    pub paciente_id: Uuid,
    pub sucursal_id: Uuid,

    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Venta {
    pub id: Uuid,

    #[schema(ignore)]
    pub clinica_id: Uuid,

    #[schema(example = "1500.00")]
    pub monto: Decimal,

    pub estado_pago: EstadoPago,
    pub medio_pago: MedioPago,
    pub origen: OrigenVenta,

    // NULL = venta suelta, sin turno asociado.
    pub turno_id: Option<Uuid>,
    pub paciente_id: Uuid,

    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

// Una fila del camino de lectura del agregador: el turno con su venta
// asociada (si la tiene), tal como sale del LEFT JOIN.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnoConVenta {
    pub id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-03-15")]
    pub fecha: NaiveDate,

    #[schema(value_type = String, example = "14:30")]
    pub hora: NaiveTime,

    pub profesional_id: Uuid,
    pub paciente_id: Uuid,
    pub sucursal_id: Uuid,

    // Campos de la venta; todos NULL cuando el turno no tiene cargo.
    pub venta_id: Option<Uuid>,

    #[schema(example = "1500.00")]
    pub monto: Option<Decimal>,

    pub estado_pago: Option<EstadoPago>,
    pub medio_pago: Option<MedioPago>,
    pub origen: Option<OrigenVenta>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrearTurnoPayload {
    // Fecha y hora llegan como texto y se validan ANTES de tocar la base.
    #[schema(example = "2025-03-15")]
    pub fecha: String,

    #[schema(example = "14:30")]
    pub hora: String,

    pub profesional_id: Uuid,
    pub paciente_id: Uuid,
    pub sucursal_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReprogramarTurnoPayload {
    #[schema(example = "2025-03-22")]
    pub fecha: String,

    #[schema(example = "09:00")]
    pub hora: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarVentaPayload {
    #[schema(example = "1500.00")]
    pub monto: Decimal,

    // Si no viene, la venta nace pendiente.
    pub estado_pago: Option<EstadoPago>,

    pub medio_pago: MedioPago,
    pub origen: OrigenVenta,

    pub turno_id: Option<Uuid>,
    pub paciente_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransicionEstadoPayload {
    pub estado: EstadoPago,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OverrideEstadoPayload {
    pub estado: EstadoPago,

    // Queda en el log de auditoría.
    #[validate(length(min = 1, message = "El motivo es obligatorio."))]
    pub motivo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn el_ciclo_de_vida_avanza_hacia_adelante() {
        assert!(EstadoPago::Pendiente.transicion_permitida(EstadoPago::Parcial));
        assert!(EstadoPago::Pendiente.transicion_permitida(EstadoPago::Pagado));
        assert!(EstadoPago::Parcial.transicion_permitida(EstadoPago::Pagado));
        assert!(EstadoPago::Pendiente.transicion_permitida(EstadoPago::SinCargo));
    }

    #[test]
    fn nunca_retrocede_por_el_camino_normal() {
        assert!(!EstadoPago::Pagado.transicion_permitida(EstadoPago::Pendiente));
        assert!(!EstadoPago::Pagado.transicion_permitida(EstadoPago::Parcial));
        assert!(!EstadoPago::Parcial.transicion_permitida(EstadoPago::Pendiente));
        assert!(!EstadoPago::SinCargo.transicion_permitida(EstadoPago::Pendiente));
        assert!(!EstadoPago::SinCargo.transicion_permitida(EstadoPago::Pagado));
    }

    #[test]
    fn predecesores_de_cada_destino() {
        assert_eq!(
            EstadoPago::predecesores(EstadoPago::Pagado),
            vec![EstadoPago::Parcial, EstadoPago::Pendiente]
        );
        assert_eq!(
            EstadoPago::predecesores(EstadoPago::Parcial),
            vec![EstadoPago::Pendiente]
        );
        assert_eq!(
            EstadoPago::predecesores(EstadoPago::SinCargo),
            vec![EstadoPago::Pendiente]
        );
        // `pendiente` no es destino de ninguna transición normal.
        assert!(EstadoPago::predecesores(EstadoPago::Pendiente).is_empty());
    }

    #[test]
    fn google_ads_serializa_con_guion() {
        let json = serde_json::to_string(&OrigenVenta::GoogleAds).unwrap();
        assert_eq!(json, r#""google-ads""#);
        let origen: OrigenVenta = serde_json::from_str(r#""google-ads""#).unwrap();
        assert_eq!(origen, OrigenVenta::GoogleAds);
    }

    #[test]
    fn valor_fuera_del_conjunto_se_rechaza() {
        assert!(serde_json::from_str::<EstadoPago>(r#""facturado""#).is_err());
        assert!(serde_json::from_str::<MedioPago>(r#""cripto""#).is_err());
        assert!(serde_json::from_str::<OrigenVenta>(r#""tiktok""#).is_err());
    }
}
