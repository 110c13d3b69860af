// src/db/assignment_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::assignment::{Assignment, AssignmentHolder},
};

#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    /// Histórico completo do território: mais recente primeiro, empate
    /// resolvido pela ordem de inserção.
    pub async fn history(&self, territory_id: Uuid) -> Result<Vec<Assignment>, AppError> {
        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT * FROM assignments
            WHERE territory_id = $1
            ORDER BY assignment_date DESC, created_at DESC
            "#,
        )
        .bind(territory_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    /// A designação ativa do território (return_date nulo), se houver.
    pub async fn find_active<'e, E>(
        &self,
        executor: E,
        territory_id: Uuid,
    ) -> Result<Option<Assignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE territory_id = $1 AND return_date IS NULL",
        )
        .bind(territory_id)
        .fetch_optional(executor)
        .await?;
        Ok(assignment)
    }

    /// Insere uma entrada no livro-razão. Para materialização de campanha,
    /// return_date já vem preenchido (ocupação criada fechada).
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        territory_id: Uuid,
        holder: AssignmentHolder,
        assignment_date: NaiveDate,
        due_date: Option<NaiveDate>,
        return_date: Option<NaiveDate>,
    ) -> Result<Assignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (person_id, campaign_id) = holder.into_columns();

        sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments
                (territory_id, person_id, campaign_id, assignment_date, due_date, return_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(territory_id)
        .bind(person_id)
        .bind(campaign_id)
        .bind(assignment_date)
        .bind(due_date)
        .bind(return_date)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // O índice parcial 'assignments_active_per_territory' garante a
            // invariante de no máximo uma designação ativa por território.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(
                        "O território já possui uma designação ativa.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    /// Fecha a designação (devolução ou cancelamento).
    pub async fn close<'e, E>(
        &self,
        executor: E,
        assignment_id: Uuid,
        return_date: NaiveDate,
    ) -> Result<Assignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET return_date = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .bind(return_date)
        .fetch_one(executor)
        .await?;
        Ok(assignment)
    }

    /// Prorroga a designação ativa: troca só o dueDate, mesmo titular.
    pub async fn extend<'e, E>(
        &self,
        executor: E,
        assignment_id: Uuid,
        new_due_date: NaiveDate,
    ) -> Result<Assignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET due_date = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .bind(new_due_date)
        .fetch_one(executor)
        .await?;
        Ok(assignment)
    }
}
