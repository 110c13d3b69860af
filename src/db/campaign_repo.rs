// src/db/campaign_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::campaign::Campaign};

#[derive(Clone)]
pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get(&self, id: Uuid) -> Result<Option<Campaign>, AppError> {
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(campaign)
    }

    pub async fn list(&self) -> Result<Vec<Campaign>, AppError> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns ORDER BY start_date DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(campaigns)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---
    // Os conjuntos de territórios também são lidos via executor quando a
    // leitura precisa enxergar o estado da transação em curso (close,
    // setRemaining).

    /// Trava a linha da campanha: serializa setRemaining/close concorrentes,
    /// garantindo que o segundo close falhe com InvalidState em vez de
    /// materializar designações em dobro.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Campaign>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(campaign)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Campaign, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (name, description, start_date, end_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(executor)
        .await?;
        Ok(campaign)
    }

    /// Grava o conjunto reservado por valor (só ids), todos como 'remaining'.
    pub async fn insert_territories<'e, E>(
        &self,
        executor: E,
        campaign_id: Uuid,
        territory_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO campaign_territories (campaign_id, territory_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(campaign_id)
        .bind(territory_ids)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn territory_ids<'e, E>(
        &self,
        executor: E,
        campaign_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT territory_id FROM campaign_territories WHERE campaign_id = $1",
        )
        .bind(campaign_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn remaining_ids<'e, E>(
        &self,
        executor: E,
        campaign_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT territory_id FROM campaign_territories WHERE campaign_id = $1 AND remaining",
        )
        .bind(campaign_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    /// Substitui o subconjunto 'remaining': marca exatamente os ids passados.
    pub async fn update_remaining<'e, E>(
        &self,
        executor: E,
        campaign_id: Uuid,
        remaining_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE campaign_territories
            SET remaining = (territory_id = ANY($2::uuid[]))
            WHERE campaign_id = $1
            "#,
        )
        .bind(campaign_id)
        .bind(remaining_ids)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Transição de mão única: closed = true congela remainingTerritories.
    pub async fn mark_closed<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE campaigns SET closed = TRUE WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// A exclusão não desfaz designações já materializadas no livro-razão.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
