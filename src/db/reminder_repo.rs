// src/db/reminder_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::reminder::Reminder};

#[derive(Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    /// "Tem lembrete em aberto" colapsa para "existe pelo menos um registro
    /// para a dupla (território, pessoa)".
    pub async fn has_reminder(&self, territory_id: Uuid, person_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reminders WHERE territory_id = $1 AND person_id = $2)",
        )
        .bind(territory_id)
        .bind(person_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn list_for_territory(&self, territory_id: Uuid) -> Result<Vec<Reminder>, AppError> {
        let reminders = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE territory_id = $1 ORDER BY created_at DESC",
        )
        .bind(territory_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reminders)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    /// Versão transacional do has_reminder, para a checagem de duplicidade
    /// dentro da mesma transação que insere.
    pub async fn exists<'e, E>(
        &self,
        executor: E,
        territory_id: Uuid,
        person_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reminders WHERE territory_id = $1 AND person_id = $2)",
        )
        .bind(territory_id)
        .bind(person_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        territory_id: Uuid,
        person_id: Uuid,
        issued_by_id: Uuid,
        note: Option<&str>,
    ) -> Result<Reminder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reminder = sqlx::query_as::<_, Reminder>(
            r#"
            INSERT INTO reminders (territory_id, person_id, issued_by_id, note)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(territory_id)
        .bind(person_id)
        .bind(issued_by_id)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(reminder)
    }
}
