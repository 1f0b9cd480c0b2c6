// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClinicaRepository, UserRepository},
    models::{
        auth::{Claims, Permisos, RolUsuario, User},
        clinica::{Clinica, EstadoClinica},
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    clinica_repo: ClinicaRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        clinica_repo: ClinicaRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, clinica_repo, jwt_secret, pool }
    }

    // Registra un usuario dentro de una clínica. La unicidad de
    // (email, clinica) NO se chequea acá con un read previo: la hace valer
    // la constraint compuesta al insertar, que es lo único libre de carreras.
    pub async fn registrar(
        &self,
        clinica_slug: &str,
        email: &str,
        password: &str,
        rol: RolUsuario,
        permisos: Option<Permisos>,
    ) -> Result<(User, String), AppError> {
        let clinica = self.clinica_activa(clinica_slug).await?;

        // El hashing va fuera de la transacción; no toca la base.
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falló la task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let nuevo_usuario = self.user_repo
            .crear(
                &mut *tx,
                Some(clinica.id),
                email,
                &hashed_password,
                rol,
                permisos.unwrap_or_default(),
            )
            .await?;

        tx.commit().await?;

        let token = self.crear_token(&nuevo_usuario)?;
        Ok((nuevo_usuario, token))
    }

    // Login. Con clínica: el e-mail se busca solo adentro de esa clínica.
    // Sin clínica (login de plataforma): el e-mail tiene que resolver a una
    // única cuenta; si es ambiguo, la respuesta no lo revela.
    pub async fn login(
        &self,
        clinica_slug: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let user = match clinica_slug {
            Some(slug) => {
                let clinica = self.clinica_activa(slug).await?;
                self.user_repo
                    .buscar_por_email_en_clinica(clinica.id, email)
                    .await?
            }
            None => self.user_repo.buscar_global_por_email(email).await?,
        }
        .ok_or(AppError::CredencialesInvalidas)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // La verificación corre en un thread aparte.
        let password_valido = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falló la task de verificación: {}", e))??;

        if !password_valido {
            return Err(AppError::CredencialesInvalidas);
        }

        self.crear_token(&user)
    }

    pub async fn validar_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::TokenInvalido)?;

        self.user_repo
            .buscar_por_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UsuarioNoEncontrado)
    }

    // Los permisos son un conjunto cerrado: las claves desconocidas ya
    // fueron rechazadas al deserializar el payload.
    pub async fn actualizar_permisos(
        &self,
        clinica_id: Uuid,
        user_id: Uuid,
        permisos: Permisos,
    ) -> Result<User, AppError> {
        let user = self.user_repo
            .buscar_por_id(user_id)
            .await?
            .ok_or(AppError::UsuarioNoEncontrado)?;

        // Un usuario de otra clínica es invisible, no "prohibido".
        if user.clinica_id != Some(clinica_id) {
            return Err(AppError::UsuarioNoEncontrado);
        }

        self.user_repo.actualizar_permisos(user_id, permisos).await
    }

    async fn clinica_activa(&self, slug: &str) -> Result<Clinica, AppError> {
        let clinica = self.clinica_repo
            .buscar_por_slug(slug)
            .await?
            .ok_or(AppError::ClinicaNoEncontrada)?;

        if clinica.estado == EstadoClinica::Suspendida {
            return Err(AppError::ClinicaSuspendida);
        }

        Ok(clinica)
    }

    fn crear_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user.id,
            clinica: user.clinica_id,
            rol: user.rol,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
