// src/services/turnos_service.rs

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TurnosRepository,
    models::{
        estadisticas::FiltrosEstadisticas,
        turnos::{
            CrearTurnoPayload, EstadoPago, RegistrarVentaPayload, ReprogramarTurnoPayload,
            Turno, TurnoConVenta, Venta,
        },
    },
};

#[derive(Clone)]
pub struct TurnosService {
    repo: TurnosRepository,
}

// Fecha de calendario bien formada, o el nombre del campo que falló.
fn validar_fecha(valor: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(valor, "%Y-%m-%d")
        .map_err(|_| AppError::HorarioInvalido { campo: "fecha" })
}

// Hora de reloj de 24 horas en formato HH:MM.
fn validar_hora(valor: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(valor, "%H:%M")
        .map_err(|_| AppError::HorarioInvalido { campo: "hora" })
}

impl TurnosService {
    pub fn new(repo: TurnosRepository) -> Self {
        Self { repo }
    }

    pub async fn crear_turno(
        &self,
        clinica_id: Uuid,
        payload: CrearTurnoPayload,
    ) -> Result<Turno, AppError> {
        // La validación corre ANTES de cualquier llamada al almacenamiento.
        let fecha = validar_fecha(&payload.fecha)?;
        let hora = validar_hora(&payload.hora)?;

        self.repo
            .crear_turno(
                clinica_id,
                fecha,
                hora,
                payload.profesional_id,
                payload.paciente_id,
                payload.sucursal_id,
            )
            .await
    }

    pub async fn reprogramar(
        &self,
        clinica_id: Uuid,
        turno_id: Uuid,
        payload: ReprogramarTurnoPayload,
    ) -> Result<Turno, AppError> {
        let fecha = validar_fecha(&payload.fecha)?;
        let hora = validar_hora(&payload.hora)?;

        self.repo.reprogramar(clinica_id, turno_id, fecha, hora).await
    }

    pub async fn registrar_venta(
        &self,
        clinica_id: Uuid,
        payload: RegistrarVentaPayload,
    ) -> Result<Venta, AppError> {
        if payload.monto < Decimal::ZERO {
            return Err(AppError::MontoInvalido);
        }

        let estado = payload.estado_pago.unwrap_or(EstadoPago::Pendiente);

        let venta = self.repo
            .registrar_venta(
                clinica_id,
                payload.monto,
                estado,
                payload.medio_pago,
                payload.origen,
                payload.turno_id,
                payload.paciente_id,
            )
            .await?;

        tracing::info!(
            venta = %venta.id,
            estado = ?venta.estado_pago,
            "Venta registrada"
        );

        Ok(venta)
    }

    pub async fn transicionar_estado(
        &self,
        clinica_id: Uuid,
        venta_id: Uuid,
        hacia: EstadoPago,
    ) -> Result<Venta, AppError> {
        self.repo.transicionar_estado(clinica_id, venta_id, hacia).await
    }

    // Camino separado de la transición normal: queda en el log con motivo
    // para que la auditoría pueda reconstruir qué pasó.
    pub async fn override_estado(
        &self,
        clinica_id: Uuid,
        venta_id: Uuid,
        hacia: EstadoPago,
        motivo: &str,
    ) -> Result<Venta, AppError> {
        let venta = self.repo.override_estado(clinica_id, venta_id, hacia).await?;

        tracing::warn!(
            venta = %venta_id,
            nuevo_estado = ?hacia,
            motivo = %motivo,
            "Override administrativo de estado de pago"
        );

        Ok(venta)
    }

    // Listado crudo del libro para un rango de fechas, el mismo camino de
    // lectura que usa el agregador de estadísticas.
    pub async fn listar_para_periodo(
        &self,
        clinica_id: Uuid,
        desde: &str,
        hasta: &str,
    ) -> Result<Vec<TurnoConVenta>, AppError> {
        let desde = NaiveDate::parse_from_str(desde, "%Y-%m-%d")
            .map_err(|_| AppError::PeriodoInvalido(format!("fecha mal formada '{}'", desde)))?;
        let hasta = NaiveDate::parse_from_str(hasta, "%Y-%m-%d")
            .map_err(|_| AppError::PeriodoInvalido(format!("fecha mal formada '{}'", hasta)))?;

        if desde > hasta {
            return Err(AppError::PeriodoInvalido(
                "'desde' es posterior a 'hasta'".to_string(),
            ));
        }

        self.repo
            .listar_para_periodo(clinica_id, desde, hasta, FiltrosEstadisticas::default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fecha_bien_formada_pasa() {
        assert!(validar_fecha("2025-03-15").is_ok());
        assert!(validar_fecha("2024-02-29").is_ok()); // bisiesto
    }

    #[test]
    fn fecha_inexistente_nombra_el_campo() {
        let err = validar_fecha("2025-02-30").unwrap_err();
        assert!(matches!(err, AppError::HorarioInvalido { campo: "fecha" }));

        let err = validar_fecha("15/03/2025").unwrap_err();
        assert!(matches!(err, AppError::HorarioInvalido { campo: "fecha" }));
    }

    #[test]
    fn hora_de_24_horas_pasa() {
        assert!(validar_hora("00:00").is_ok());
        assert!(validar_hora("14:30").is_ok());
        assert!(validar_hora("23:59").is_ok());
    }

    #[test]
    fn hora_invalida_nombra_el_campo() {
        for caso in ["24:00", "14:60", "2:30 PM", "14.30", ""] {
            let err = validar_hora(caso).unwrap_err();
            assert!(
                matches!(err, AppError::HorarioInvalido { campo: "hora" }),
                "caso: {:?}",
                caso
            );
        }
    }
}
