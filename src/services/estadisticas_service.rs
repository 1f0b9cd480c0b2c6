// src/services/estadisticas_service.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TurnosRepository,
    models::{
        estadisticas::{EstadisticasTurnos, FiltrosEstadisticas, Periodo, PeriodoSeleccion},
        turnos::{EstadoPago, MedioPago, OrigenVenta, TurnoConVenta},
    },
};

#[derive(Clone)]
pub struct EstadisticasService {
    repo: TurnosRepository,
}

// Resuelve el selector de período a un rango concreto [inicio, fin],
// ambos inclusive. Los períodos con nombre se calculan contra el `hoy`
// que aporta el llamador (la zona horaria de la clínica es problema de
// otro colaborador); `personalizado` exige desde/hasta explícitos.
// Siempre falla ANTES de tocar el almacenamiento.
pub fn resolver_periodo(
    seleccion: PeriodoSeleccion,
    hoy: NaiveDate,
    desde: Option<&str>,
    hasta: Option<&str>,
) -> Result<Periodo, AppError> {
    let (inicio, fin) = match seleccion {
        PeriodoSeleccion::Hoy => (hoy, hoy),
        PeriodoSeleccion::Semana => (hoy.week(Weekday::Mon).first_day(), hoy),
        PeriodoSeleccion::Mes => (hoy - Days::new(u64::from(hoy.day0())), hoy),
        PeriodoSeleccion::Anio => (hoy - Days::new(u64::from(hoy.ordinal0())), hoy),
        PeriodoSeleccion::Personalizado => {
            let desde = desde.ok_or_else(|| {
                AppError::PeriodoInvalido("falta el parámetro 'desde'".to_string())
            })?;
            let hasta = hasta.ok_or_else(|| {
                AppError::PeriodoInvalido("falta el parámetro 'hasta'".to_string())
            })?;

            let inicio = NaiveDate::parse_from_str(desde, "%Y-%m-%d").map_err(|_| {
                AppError::PeriodoInvalido(format!("fecha mal formada '{}'", desde))
            })?;
            let fin = NaiveDate::parse_from_str(hasta, "%Y-%m-%d").map_err(|_| {
                AppError::PeriodoInvalido(format!("fecha mal formada '{}'", hasta))
            })?;

            (inicio, fin)
        }
    };

    if inicio > fin {
        return Err(AppError::PeriodoInvalido(
            "'desde' es posterior a 'hasta'".to_string(),
        ));
    }

    Ok(Periodo { inicio, fin })
}

// Una sola pasada sobre las filas del libro, acumuladores nuevos por
// llamada, sin ningún estado compartido ni caché. Función pura: las mismas
// filas producen byte a byte la misma foto.
//
// Regla monetaria: solo pagado y parcial aportan su monto; pendiente y
// sin_cargo suman 0 a TODOS los totales de plata, pero sus turnos igual
// cuentan para total_turnos y para los contadores por estado.
pub fn acumular(filas: &[TurnoConVenta], periodo: Periodo) -> EstadisticasTurnos {
    let mut ventas_por_estado: BTreeMap<EstadoPago, Decimal> =
        EstadoPago::TODOS.iter().map(|e| (*e, Decimal::ZERO)).collect();
    let mut ventas_por_medio_pago: BTreeMap<MedioPago, Decimal> =
        MedioPago::TODOS.iter().map(|m| (*m, Decimal::ZERO)).collect();
    let mut ventas_por_origen: BTreeMap<OrigenVenta, Decimal> =
        OrigenVenta::TODOS.iter().map(|o| (*o, Decimal::ZERO)).collect();

    let mut pacientes: BTreeSet<Uuid> = BTreeSet::new();

    let mut cantidad_ventas = 0i64;
    let mut total_ventas = Decimal::ZERO;
    let mut turnos_pagados = 0i64;
    let mut turnos_pendientes = 0i64;
    let mut turnos_parciales = 0i64;
    let mut turnos_sin_cargo = 0i64;

    for fila in filas {
        // Un paciente sin_cargo también cuenta: igual fue atendido.
        pacientes.insert(fila.paciente_id);

        // Un turno sin venta suma a total_turnos y nada más.
        let Some(estado) = fila.estado_pago else {
            continue;
        };

        match estado {
            EstadoPago::Pagado => turnos_pagados += 1,
            EstadoPago::Parcial => turnos_parciales += 1,
            EstadoPago::Pendiente => turnos_pendientes += 1,
            EstadoPago::SinCargo => turnos_sin_cargo += 1,
        }

        if matches!(estado, EstadoPago::Pagado | EstadoPago::Parcial) {
            let monto = fila.monto.unwrap_or(Decimal::ZERO);

            cantidad_ventas += 1;
            total_ventas += monto;

            *ventas_por_estado.entry(estado).or_insert(Decimal::ZERO) += monto;
            if let Some(medio) = fila.medio_pago {
                *ventas_por_medio_pago.entry(medio).or_insert(Decimal::ZERO) += monto;
            }
            if let Some(origen) = fila.origen {
                *ventas_por_origen.entry(origen).or_insert(Decimal::ZERO) += monto;
            }
        }
    }

    let total_turnos = filas.len() as i64;

    // 0 cuando no hay turnos; nunca NaN ni error.
    let promedio_venta_por_turno = if total_turnos == 0 {
        Decimal::ZERO
    } else {
        total_ventas / Decimal::from(total_turnos)
    };

    EstadisticasTurnos {
        total_turnos,
        cantidad_ventas,
        total_ventas,
        total_pacientes: pacientes.len() as i64,
        promedio_venta_por_turno,
        turnos_pagados,
        turnos_pendientes,
        turnos_parciales,
        turnos_sin_cargo,
        ventas_por_estado,
        ventas_por_medio_pago,
        ventas_por_origen,
        periodo,
    }
}

impl EstadisticasService {
    pub fn new(repo: TurnosRepository) -> Self {
        Self { repo }
    }

    // La foto del dashboard: resuelve el período, escanea el camino de
    // lectura del libro y pliega. Solo lectura; no muta nada y tolera que
    // el libro cambie apenas devuelve (la foto es consistente con algún
    // punto de serialización durante la llamada).
    pub async fn calcular(
        &self,
        clinica_id: Uuid,
        seleccion: PeriodoSeleccion,
        hoy: NaiveDate,
        desde: Option<&str>,
        hasta: Option<&str>,
        filtros: FiltrosEstadisticas,
    ) -> Result<EstadisticasTurnos, AppError> {
        let periodo = resolver_periodo(seleccion, hoy, desde, hasta)?;

        let filas = self.repo
            .listar_para_periodo(clinica_id, periodo.inicio, periodo.fin, filtros)
            .await?;

        Ok(acumular(&filas, periodo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn fecha(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn periodo_enero() -> Periodo {
        Periodo { inicio: fecha("2025-01-01"), fin: fecha("2025-01-31") }
    }

    fn turno_sin_venta(paciente_id: Uuid) -> TurnoConVenta {
        TurnoConVenta {
            id: Uuid::new_v4(),
            fecha: fecha("2025-01-10"),
            hora: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            profesional_id: Uuid::new_v4(),
            paciente_id,
            sucursal_id: Uuid::new_v4(),
            venta_id: None,
            monto: None,
            estado_pago: None,
            medio_pago: None,
            origen: None,
        }
    }

    fn turno_con_venta(
        paciente_id: Uuid,
        monto: i64,
        estado: EstadoPago,
        medio: MedioPago,
        origen: OrigenVenta,
    ) -> TurnoConVenta {
        TurnoConVenta {
            venta_id: Some(Uuid::new_v4()),
            monto: Some(Decimal::from(monto)),
            estado_pago: Some(estado),
            medio_pago: Some(medio),
            origen: Some(origen),
            ..turno_sin_venta(paciente_id)
        }
    }

    // --- resolución de período ---

    #[test]
    fn hoy_es_un_rango_de_un_dia() {
        let p = resolver_periodo(PeriodoSeleccion::Hoy, fecha("2025-01-15"), None, None).unwrap();
        assert_eq!(p, Periodo { inicio: fecha("2025-01-15"), fin: fecha("2025-01-15") });
    }

    #[test]
    fn semana_arranca_el_lunes() {
        // 2025-01-15 es miércoles; el lunes de esa semana es el 13.
        let p = resolver_periodo(PeriodoSeleccion::Semana, fecha("2025-01-15"), None, None).unwrap();
        assert_eq!(p, Periodo { inicio: fecha("2025-01-13"), fin: fecha("2025-01-15") });
    }

    #[test]
    fn mes_arranca_el_primero() {
        let p = resolver_periodo(PeriodoSeleccion::Mes, fecha("2025-01-15"), None, None).unwrap();
        assert_eq!(p.inicio, fecha("2025-01-01"));
        assert_eq!(p.fin, fecha("2025-01-15"));
    }

    #[test]
    fn anio_arranca_el_primero_de_enero() {
        let p = resolver_periodo(PeriodoSeleccion::Anio, fecha("2025-06-20"), None, None).unwrap();
        assert_eq!(p.inicio, fecha("2025-01-01"));
        assert_eq!(p.fin, fecha("2025-06-20"));
    }

    #[test]
    fn personalizado_usa_los_extremos_dados() {
        let p = resolver_periodo(
            PeriodoSeleccion::Personalizado,
            fecha("2025-06-20"),
            Some("2025-01-01"),
            Some("2025-01-31"),
        )
        .unwrap();
        assert_eq!(p, periodo_enero());
    }

    #[test]
    fn personalizado_sin_extremos_falla() {
        let err = resolver_periodo(PeriodoSeleccion::Personalizado, fecha("2025-06-20"), None, None)
            .unwrap_err();
        assert!(matches!(err, AppError::PeriodoInvalido(_)));
    }

    #[test]
    fn personalizado_mal_formado_falla() {
        let err = resolver_periodo(
            PeriodoSeleccion::Personalizado,
            fecha("2025-06-20"),
            Some("01/01/2025"),
            Some("2025-01-31"),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::PeriodoInvalido(_)));
    }

    #[test]
    fn personalizado_invertido_falla() {
        let err = resolver_periodo(
            PeriodoSeleccion::Personalizado,
            fecha("2025-06-20"),
            Some("2025-02-01"),
            Some("2025-01-01"),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::PeriodoInvalido(_)));
    }

    // --- agregación ---

    #[test]
    fn sin_turnos_todo_en_cero_y_mapas_completos() {
        let stats = acumular(&[], periodo_enero());

        assert_eq!(stats.total_turnos, 0);
        assert_eq!(stats.total_ventas, Decimal::ZERO);
        assert_eq!(stats.total_pacientes, 0);
        assert_eq!(stats.promedio_venta_por_turno, Decimal::ZERO);

        // Los mapas traen TODAS las claves, con 0, no claves ausentes.
        assert_eq!(stats.ventas_por_estado.len(), 4);
        assert_eq!(stats.ventas_por_medio_pago.len(), 6);
        assert_eq!(stats.ventas_por_origen.len(), 4);
        assert!(stats.ventas_por_medio_pago.values().all(|v| *v == Decimal::ZERO));

        // El rango aplicado se devuelve tal cual.
        assert_eq!(stats.periodo, periodo_enero());
    }

    #[test]
    fn escenario_pagado_y_pendiente() {
        // Un turno cobrado (100, efectivo, orgánico) y uno pendiente (50).
        let filas = vec![
            turno_con_venta(
                Uuid::new_v4(), 100,
                EstadoPago::Pagado, MedioPago::Efectivo, OrigenVenta::Organico,
            ),
            turno_con_venta(
                Uuid::new_v4(), 50,
                EstadoPago::Pendiente, MedioPago::Tarjeta, OrigenVenta::Whatsapp,
            ),
        ];
        let stats = acumular(&filas, periodo_enero());

        assert_eq!(stats.total_turnos, 2);
        assert_eq!(stats.total_ventas, Decimal::from(100));
        assert_eq!(stats.cantidad_ventas, 1);
        assert_eq!(stats.turnos_pagados, 1);
        assert_eq!(stats.turnos_pendientes, 1);

        // El pendiente suma 0 a todos los totales monetarios.
        assert_eq!(stats.ventas_por_medio_pago[&MedioPago::Efectivo], Decimal::from(100));
        assert_eq!(stats.ventas_por_medio_pago[&MedioPago::Tarjeta], Decimal::ZERO);
        assert_eq!(stats.ventas_por_estado[&EstadoPago::Pagado], Decimal::from(100));
        assert_eq!(stats.ventas_por_estado[&EstadoPago::Pendiente], Decimal::ZERO);
        assert_eq!(stats.ventas_por_origen[&OrigenVenta::Organico], Decimal::from(100));
        assert_eq!(stats.ventas_por_origen[&OrigenVenta::Whatsapp], Decimal::ZERO);
    }

    #[test]
    fn la_suma_por_estado_iguala_el_total() {
        let filas = vec![
            turno_con_venta(Uuid::new_v4(), 100, EstadoPago::Pagado, MedioPago::Efectivo, OrigenVenta::Instagram),
            turno_con_venta(Uuid::new_v4(), 40, EstadoPago::Parcial, MedioPago::Mercadopago, OrigenVenta::GoogleAds),
            turno_con_venta(Uuid::new_v4(), 999, EstadoPago::Pendiente, MedioPago::Otro, OrigenVenta::Organico),
            turno_con_venta(Uuid::new_v4(), 999, EstadoPago::SinCargo, MedioPago::Otro, OrigenVenta::Organico),
        ];
        let stats = acumular(&filas, periodo_enero());

        let suma: Decimal = stats.ventas_por_estado.values().copied().sum();
        assert_eq!(suma, stats.total_ventas);
        assert_eq!(stats.total_ventas, Decimal::from(140));
        assert_eq!(stats.cantidad_ventas, 2);
    }

    #[test]
    fn promedio_sobre_todos_los_turnos() {
        let filas = vec![
            turno_con_venta(Uuid::new_v4(), 100, EstadoPago::Pagado, MedioPago::Efectivo, OrigenVenta::Organico),
            turno_con_venta(Uuid::new_v4(), 50, EstadoPago::Parcial, MedioPago::Efectivo, OrigenVenta::Organico),
            turno_sin_venta(Uuid::new_v4()),
        ];
        let stats = acumular(&filas, periodo_enero());

        // 150 cobrados sobre 3 turnos, incluido el que no tiene venta.
        assert_eq!(stats.promedio_venta_por_turno, Decimal::from(50));
    }

    #[test]
    fn pacientes_distintos_no_se_cuentan_dos_veces() {
        let repetido = Uuid::new_v4();
        let filas = vec![
            turno_con_venta(repetido, 100, EstadoPago::Pagado, MedioPago::Efectivo, OrigenVenta::Organico),
            turno_con_venta(repetido, 80, EstadoPago::Pagado, MedioPago::Efectivo, OrigenVenta::Organico),
            turno_con_venta(Uuid::new_v4(), 999, EstadoPago::SinCargo, MedioPago::Otro, OrigenVenta::Whatsapp),
        ];
        let stats = acumular(&filas, periodo_enero());

        // El sin_cargo también cuenta como paciente atendido.
        assert_eq!(stats.total_pacientes, 2);
        assert!(stats.total_pacientes <= stats.total_turnos);
        assert_eq!(stats.turnos_sin_cargo, 1);
    }

    #[test]
    fn turno_sin_venta_no_entra_en_ningun_balde() {
        let stats = acumular(&[turno_sin_venta(Uuid::new_v4())], periodo_enero());

        assert_eq!(stats.total_turnos, 1);
        assert_eq!(stats.turnos_pagados, 0);
        assert_eq!(stats.turnos_pendientes, 0);
        assert_eq!(stats.turnos_parciales, 0);
        assert_eq!(stats.turnos_sin_cargo, 0);
        assert_eq!(stats.total_ventas, Decimal::ZERO);
    }

    #[test]
    fn misma_entrada_produce_la_misma_foto() {
        let filas = vec![
            turno_con_venta(Uuid::new_v4(), 100, EstadoPago::Pagado, MedioPago::Paypal, OrigenVenta::Instagram),
            turno_con_venta(Uuid::new_v4(), 30, EstadoPago::Parcial, MedioPago::Transferencia, OrigenVenta::GoogleAds),
            turno_sin_venta(Uuid::new_v4()),
        ];

        let a = acumular(&filas, periodo_enero());
        let b = acumular(&filas, periodo_enero());

        assert_eq!(a, b);
        // Byte a byte, no solo igualdad estructural.
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
