// src/db/user_repo.rs

use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Permisos, RolUsuario, User},
};

const COLUMNAS_USUARIO: &str =
    "id, clinica_id, email, password_hash, rol, permisos, creado_en, actualizado_en";

// Repositorio de usuarios, responsable de la tabla 'usuarios'.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Crea un nuevo usuario. La unicidad de (clinica_id, email) la hace
    // valer la constraint compuesta de la base: dos registros concurrentes
    // del mismo par no pueden pasar los dos, sin importar la carrera.
    pub async fn crear<'e, E>(
        &self,
        executor: E,
        clinica_id: Option<Uuid>,
        email: &str,
        password_hash: &str,
        rol: RolUsuario,
        permisos: Permisos,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO usuarios (clinica_id, email, password_hash, rol, permisos)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNAS_USUARIO}
            "#,
        ))
        .bind(clinica_id)
        .bind(email)
        .bind(password_hash)
        .bind(rol)
        .bind(Json(permisos))
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    if let Some(constraint) = db_err.constraint() {
                        return match constraint {
                            // La constraint compuesta (clinica_id, email)
                            "uq_usuarios_clinica_email" => AppError::UsuarioYaExiste,

                            // El índice parcial de admins de plataforma
                            "uq_usuarios_email_global" => AppError::UsuarioYaExiste,

                            _ => e.into(),
                        };
                    }
                }
            }
            e.into()
        })?;

        Ok(user)
    }

    // Busca un usuario por e-mail DENTRO de una clínica. El mismo e-mail
    // puede existir en otra clínica; eso acá no nos importa.
    pub async fn buscar_por_email_en_clinica(
        &self,
        clinica_id: Uuid,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNAS_USUARIO}
            FROM usuarios
            WHERE clinica_id = $1 AND email = $2
            "#,
        ))
        .bind(clinica_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }

    // Camino del login de plataforma (sin clínica): el e-mail tiene que
    // resolver a UNA sola cuenta entre todas las clínicas.
    pub async fn buscar_global_por_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut usuarios = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNAS_USUARIO}
            FROM usuarios
            WHERE email = $1
            "#,
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        if usuarios.len() > 1 {
            return Err(AppError::IdentidadAmbigua);
        }

        Ok(usuarios.pop())
    }

    pub async fn buscar_por_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNAS_USUARIO}
            FROM usuarios
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }

    pub async fn actualizar_permisos(
        &self,
        id: Uuid,
        permisos: Permisos,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE usuarios
            SET permisos = $2, actualizado_en = now()
            WHERE id = $1
            RETURNING {COLUMNAS_USUARIO}
            "#,
        ))
        .bind(id)
        .bind(Json(permisos))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::UsuarioNoEncontrado)?;

        Ok(user)
    }
}
