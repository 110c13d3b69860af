// src/db/territory_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::territory::{City, Territory, TerritoryOverview, TerritoryStatus},
};

// SELECT base das leituras: território + cidade + dados da designação ativa
// (titular e vencimento), que alimentam o classificador temporal.
const OVERVIEW_SELECT: &str = r#"
    SELECT t.id, t.city_id, c.name AS city_name, t.name, t.status,
           t.last_visited_on, t.note, t.geometry, t.active_assignment_id,
           a.person_id AS assigned_to, a.due_date,
           t.created_at, t.updated_at
    FROM territories t
    JOIN cities c ON c.id = t.city_id
    LEFT JOIN assignments a ON a.id = t.active_assignment_id
"#;

#[derive(Clone)]
pub struct TerritoryRepository {
    pool: PgPool,
}

impl TerritoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---
    // Leituras são simples e usam a pool principal direto.

    pub async fn list(&self, city_id: Option<Uuid>) -> Result<Vec<TerritoryOverview>, AppError> {
        let sql = format!(
            "{OVERVIEW_SELECT}
            WHERE ($1::uuid IS NULL OR t.city_id = $1)
            ORDER BY lower(c.name) ASC, lower(t.name) ASC"
        );
        let territories = sqlx::query_as::<_, TerritoryOverview>(&sql)
            .bind(city_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(territories)
    }

    pub async fn get_overview(&self, id: Uuid) -> Result<Option<TerritoryOverview>, AppError> {
        let sql = format!("{OVERVIEW_SELECT} WHERE t.id = $1");
        let territory = sqlx::query_as::<_, TerritoryOverview>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(territory)
    }

    /// Quais dos ids informados existem de fato no registro.
    pub async fn filter_existing(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        let found = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM territories WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(found)
    }

    pub async fn list_cities(&self) -> Result<Vec<City>, AppError> {
        let cities = sqlx::query_as::<_, City>(
            "SELECT * FROM cities ORDER BY lower(name) ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cities)
    }

    pub async fn get_city(&self, id: Uuid) -> Result<Option<City>, AppError> {
        let city = sqlx::query_as::<_, City>("SELECT * FROM cities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(city)
    }

    pub async fn count_territories_in_city(&self, city_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM territories WHERE city_id = $1",
        )
        .bind(city_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---
    // Usam o padrão genérico 'Executor' para rodar dentro de uma transação.

    /// Trava a linha do território (FOR UPDATE): serializa as mutações
    /// concorrentes sobre o mesmo território.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Territory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let territory = sqlx::query_as::<_, Territory>(
            "SELECT * FROM territories WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(territory)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        city_id: Uuid,
        name: &str,
    ) -> Result<Territory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let territory = sqlx::query_as::<_, Territory>(
            r#"
            INSERT INTO territories (city_id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(city_id)
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(territory)
    }

    /// Atualização pura de campos: nunca toca status nem last_visited_on.
    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        city_id: Option<Uuid>,
        note: Option<&str>,
        geometry: Option<serde_json::Value>,
    ) -> Result<Option<Territory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let territory = sqlx::query_as::<_, Territory>(
            r#"
            UPDATE territories
            SET name       = COALESCE($2, name),
                city_id    = COALESCE($3, city_id),
                note       = COALESCE($4, note),
                geometry   = COALESCE($5, geometry),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(city_id)
        .bind(note)
        .bind(geometry)
        .fetch_optional(executor)
        .await?;
        Ok(territory)
    }

    /// Transição para ASSIGNED, anotando a referência à designação ativa.
    pub async fn mark_assigned<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        assignment_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE territories
            SET status = 'ASSIGNED', active_assignment_id = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(assignment_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Fecha a ocupação do território: limpa a referência ativa e grava o
    /// novo status (PENDING na devolução, AVAILABLE no cancelamento).
    /// last_visited_on só muda quando a visita aconteceu (devolução).
    pub async fn release<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: TerritoryStatus,
        last_visited_on: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE territories
            SET status = $2,
                active_assignment_id = NULL,
                last_visited_on = COALESCE($3, last_visited_on),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(last_visited_on)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Gancho da varredura de verificação: PENDING -> AVAILABLE.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: TerritoryStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE territories SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM territories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // --- Cidades ---

    pub async fn insert_city<'e, E>(&self, executor: E, name: &str) -> Result<City, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, City>(
            r#"
            INSERT INTO cities (name)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("A cidade '{}' já existe.", name));
                }
            }
            e.into()
        })
    }

    pub async fn delete_city<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM cities WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
