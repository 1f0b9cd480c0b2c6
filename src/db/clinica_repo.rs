// src/db/clinica_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::clinica::{Clinica, EstadoClinica},
};

// Repositorio de clínicas, responsable de la tabla 'clinicas'.
#[derive(Clone)]
pub struct ClinicaRepository {
    pool: PgPool,
}

impl ClinicaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn crear<'e, E>(
        &self,
        executor: E,
        slug: &str,
        nombre: &str,
    ) -> Result<Clinica, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clinica = sqlx::query_as::<_, Clinica>(
            r#"
            INSERT INTO clinicas (slug, nombre)
            VALUES ($1, $2)
            RETURNING id, slug, nombre, estado, creado_en, actualizado_en
            "#,
        )
        .bind(slug)
        .bind(nombre)
        .fetch_one(executor)
        .await?;

        Ok(clinica)
    }

    pub async fn buscar_por_slug(&self, slug: &str) -> Result<Option<Clinica>, AppError> {
        let maybe_clinica = sqlx::query_as::<_, Clinica>(
            r#"
            SELECT id, slug, nombre, estado, creado_en, actualizado_en
            FROM clinicas
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_clinica)
    }

    pub async fn buscar_por_id(&self, id: Uuid) -> Result<Option<Clinica>, AppError> {
        let maybe_clinica = sqlx::query_as::<_, Clinica>(
            r#"
            SELECT id, slug, nombre, estado, creado_en, actualizado_en
            FROM clinicas
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_clinica)
    }

    // Las clínicas nunca se borran; solo cambian de estado.
    pub async fn cambiar_estado(
        &self,
        id: Uuid,
        estado: EstadoClinica,
    ) -> Result<Clinica, AppError> {
        let clinica = sqlx::query_as::<_, Clinica>(
            r#"
            UPDATE clinicas
            SET estado = $2, actualizado_en = now()
            WHERE id = $1
            RETURNING id, slug, nombre, estado, creado_en, actualizado_en
            "#,
        )
        .bind(id)
        .bind(estado)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ClinicaNoEncontrada)?;

        Ok(clinica)
    }
}
