use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::{
    db::now_millis,
    error::{Error, Result},
    users::repo_types::{User, UserLogin, UserRegistration},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Validates and inserts a new user, stamping `created_at` with the current time.
    async fn create(&self, params: &UserRegistration) -> Result<User>;
    /// Live user whose username and stored digest both match exactly.
    async fn login(&self, params: &UserLogin) -> Result<User>;
    async fn get_by_id(&self, id: &str) -> Result<User>;
    async fn get_by_username(&self, username: &str) -> Result<User>;
    async fn search_by_name(&self, first_name: &str, second_name: &str) -> Result<User>;
    async fn list(&self) -> Result<Vec<User>>;
    /// Soft delete: the row stays, but disappears from every lookup.
    async fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, params), fields(user_id = %params.id, username = %params.username))]
    async fn create(&self, params: &UserRegistration) -> Result<User> {
        const OP: &str = "create user";
        params.validate(OP)?;

        let p = &params.profile;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, hashed_password, first_name, second_name,
                               sex, birthdate, biography, city, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, username, first_name, second_name, sex, birthdate, biography, city, created_at
            "#,
        )
        .bind(&params.id)
        .bind(&params.username)
        .bind(&params.hashed_password)
        .bind(&p.first_name)
        .bind(&p.second_name)
        .bind(&p.sex)
        .bind(p.birthdate)
        .bind(&p.biography)
        .bind(&p.city)
        .bind(now_millis())
        .fetch_one(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?;

        debug!("user created");
        Ok(user)
    }

    #[instrument(skip(self, params), fields(username = %params.username))]
    async fn login(&self, params: &UserLogin) -> Result<User> {
        const OP: &str = "login user";
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, second_name, sex, birthdate, biography, city, created_at
            FROM users
            WHERE username = $1 AND hashed_password = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(&params.username)
        .bind(&params.hashed_password)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?
        .ok_or_else(|| Error::not_found(OP))
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<User> {
        const OP: &str = "get user by id";
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, second_name, sex, birthdate, biography, city, created_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?
        .ok_or_else(|| Error::not_found(OP))
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> Result<User> {
        const OP: &str = "get user by username";
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, second_name, sex, birthdate, biography, city, created_at
            FROM users
            WHERE username = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?
        .ok_or_else(|| Error::not_found(OP))
    }

    #[instrument(skip(self))]
    async fn search_by_name(&self, first_name: &str, second_name: &str) -> Result<User> {
        const OP: &str = "search user";
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, second_name, sex, birthdate, biography, city, created_at
            FROM users
            WHERE first_name = $1 AND second_name = $2 AND deleted_at IS NULL
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(first_name)
        .bind(second_name)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?
        .ok_or_else(|| Error::not_found(OP))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, second_name, sex, birthdate, biography, city, created_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| Error::from_sqlx("list users", e))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        const OP: &str = "delete user";
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now_millis())
        .execute(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(OP));
        }
        debug!("user deleted");
        Ok(())
    }
}
