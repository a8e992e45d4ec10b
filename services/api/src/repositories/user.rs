//! User repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use common::models::Role;
use sqlx::{Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{PgStore, UserStore};
use crate::models::{NewUser, User};

fn user_from_row(row: &PgRow) -> DatabaseResult<User> {
    let role: String = row.get("role");
    let role = role
        .parse::<Role>()
        .map_err(|e| DatabaseError::Corrupt(e.to_string()))?;

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
        role,
        external_id: row.get("external_id"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> DatabaseResult<User> {
        info!("Creating new {} account: {}", new_user.role, new_user.email);

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, role, external_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, name, role, external_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.name)
        .bind(new_user.role.as_str())
        .bind(&new_user.external_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        user_from_row(&row)
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, role, external_id, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_student(&self, student_id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, role, external_id, created_at
            FROM users
            WHERE role = 'student' AND external_id = $1
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn count_users(&self, role: Role) -> DatabaseResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(count.max(0) as u64)
    }
}
