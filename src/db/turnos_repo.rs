// src/db/turnos_repo.rs

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        estadisticas::FiltrosEstadisticas,
        turnos::{EstadoPago, MedioPago, OrigenVenta, Turno, TurnoConVenta, Venta},
    },
};

const COLUMNAS_TURNO: &str =
    "id, clinica_id, fecha, hora, profesional_id, paciente_id, sucursal_id, creado_en, actualizado_en";

const COLUMNAS_VENTA: &str =
    "id, clinica_id, monto, estado_pago, medio_pago, origen, turno_id, paciente_id, creado_en, actualizado_en";

// Repositorio del libro de turnos y ventas.
#[derive(Clone)]
pub struct TurnosRepository {
    pool: PgPool,
}

impl TurnosRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TURNOS
    // =========================================================================

    pub async fn crear_turno(
        &self,
        clinica_id: Uuid,
        fecha: NaiveDate,
        hora: NaiveTime,
        profesional_id: Uuid,
        paciente_id: Uuid,
        sucursal_id: Uuid,
    ) -> Result<Turno, AppError> {
        let turno = sqlx::query_as::<_, Turno>(&format!(
            r#"
            INSERT INTO turnos (clinica_id, fecha, hora, profesional_id, paciente_id, sucursal_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNAS_TURNO}
            "#,
        ))
        .bind(clinica_id)
        .bind(fecha)
        .bind(hora)
        .bind(profesional_id)
        .bind(paciente_id)
        .bind(sucursal_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(turno)
    }

    pub async fn reprogramar(
        &self,
        clinica_id: Uuid,
        turno_id: Uuid,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> Result<Turno, AppError> {
        let turno = sqlx::query_as::<_, Turno>(&format!(
            r#"
            UPDATE turnos
            SET fecha = $3, hora = $4, actualizado_en = now()
            WHERE id = $1 AND clinica_id = $2
            RETURNING {COLUMNAS_TURNO}
            "#,
        ))
        .bind(turno_id)
        .bind(clinica_id)
        .bind(fecha)
        .bind(hora)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::TurnoNoEncontrado)?;

        Ok(turno)
    }

    // =========================================================================
    //  VENTAS
    // =========================================================================

    pub async fn registrar_venta(
        &self,
        clinica_id: Uuid,
        monto: Decimal,
        estado: EstadoPago,
        medio: MedioPago,
        origen: OrigenVenta,
        turno_id: Option<Uuid>,
        paciente_id: Uuid,
    ) -> Result<Venta, AppError> {
        let venta = sqlx::query_as::<_, Venta>(&format!(
            r#"
            INSERT INTO ventas (clinica_id, monto, estado_pago, medio_pago, origen, turno_id, paciente_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNAS_VENTA}
            "#,
        ))
        .bind(clinica_id)
        .bind(monto)
        .bind(estado)
        .bind(medio)
        .bind(origen)
        .bind(turno_id)
        .bind(paciente_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return match db_err.constraint() {
                        Some("ventas_turno_id_fkey") => AppError::TurnoNoEncontrado,
                        Some("ventas_clinica_id_fkey") => AppError::ClinicaNoEncontrada,
                        _ => e.into(),
                    };
                }
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("uq_ventas_turno")
                {
                    return AppError::TurnoYaFacturado;
                }
            }
            e.into()
        })?;

        Ok(venta)
    }

    // Transición normal del estado de pago: UN solo UPDATE atómico cuyo
    // WHERE solo acepta los estados desde los que se puede avanzar. Si otra
    // request ganó la carrera, acá simplemente no matcheamos ninguna fila.
    pub async fn transicionar_estado(
        &self,
        clinica_id: Uuid,
        venta_id: Uuid,
        hacia: EstadoPago,
    ) -> Result<Venta, AppError> {
        let actualizada = sqlx::query_as::<_, Venta>(&format!(
            r#"
            UPDATE ventas
            SET estado_pago = $3, actualizado_en = now()
            WHERE id = $1 AND clinica_id = $2 AND estado_pago = ANY($4)
            RETURNING {COLUMNAS_VENTA}
            "#,
        ))
        .bind(venta_id)
        .bind(clinica_id)
        .bind(hacia)
        .bind(EstadoPago::predecesores(hacia))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(venta) = actualizada {
            return Ok(venta);
        }

        // No se tocó ninguna fila: o la venta no existe, o su estado actual
        // no permite esta transición. Distinguimos para el llamador.
        let actual = sqlx::query(
            "SELECT estado_pago FROM ventas WHERE id = $1 AND clinica_id = $2",
        )
        .bind(venta_id)
        .bind(clinica_id)
        .fetch_optional(&self.pool)
        .await?;

        match actual {
            Some(row) => {
                let de: EstadoPago = row.try_get("estado_pago").map_err(AppError::from)?;
                Err(AppError::TransicionEstadoInvalida { de, a: hacia })
            }
            None => Err(AppError::VentaNoEncontrada),
        }
    }

    // Override administrativo: pisa el estado sin mirar el anterior. Es una
    // operación separada a propósito, para que la auditoría pueda
    // distinguirla de una progresión normal.
    pub async fn override_estado(
        &self,
        clinica_id: Uuid,
        venta_id: Uuid,
        hacia: EstadoPago,
    ) -> Result<Venta, AppError> {
        let venta = sqlx::query_as::<_, Venta>(&format!(
            r#"
            UPDATE ventas
            SET estado_pago = $3, actualizado_en = now()
            WHERE id = $1 AND clinica_id = $2
            RETURNING {COLUMNAS_VENTA}
            "#,
        ))
        .bind(venta_id)
        .bind(clinica_id)
        .bind(hacia)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::VentaNoEncontrada)?;

        Ok(venta)
    }

    // =========================================================================
    //  CAMINO DE LECTURA DEL AGREGADOR
    // =========================================================================

    // Turnos del rango [desde, hasta] con su venta (si la tienen), ordenados
    // por fecha ascendente y desempatados por id. Lectura pura: ningún lock
    // se sostiene durante el escaneo.
    pub async fn listar_para_periodo(
        &self,
        clinica_id: Uuid,
        desde: NaiveDate,
        hasta: NaiveDate,
        filtros: FiltrosEstadisticas,
    ) -> Result<Vec<TurnoConVenta>, AppError> {
        let filas = sqlx::query_as::<_, TurnoConVenta>(
            r#"
            SELECT
                t.id, t.fecha, t.hora, t.profesional_id, t.paciente_id, t.sucursal_id,
                v.id AS venta_id, v.monto, v.estado_pago, v.medio_pago, v.origen
            FROM turnos t
            LEFT JOIN ventas v ON v.turno_id = t.id
            WHERE t.clinica_id = $1
              AND t.fecha BETWEEN $2 AND $3
              AND ($4::estado_pago IS NULL OR v.estado_pago = $4)
              AND ($5::uuid IS NULL OR t.profesional_id = $5)
              AND ($6::uuid IS NULL OR t.sucursal_id = $6)
            ORDER BY t.fecha ASC, t.id ASC
            "#,
        )
        .bind(clinica_id)
        .bind(desde)
        .bind(hasta)
        .bind(filtros.estado_pago)
        .bind(filtros.profesional_id)
        .bind(filtros.sucursal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(filas)
    }
}
