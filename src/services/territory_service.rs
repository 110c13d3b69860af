// src/services/territory_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TerritoryRepository,
    models::territory::{City, TerritoryStatus, TerritoryView},
    services::classification,
};

// O Registro de territórios: CRUD + o gancho da varredura de verificação.
// O status NUNCA muda por aqui fora do reclassifyPending; as transições da
// máquina de estados passam todas pelo AssignmentService.
#[derive(Clone)]
pub struct TerritoryService {
    territory_repo: TerritoryRepository,
    pool: PgPool,
}

impl TerritoryService {
    pub fn new(territory_repo: TerritoryRepository, pool: PgPool) -> Self {
        Self { territory_repo, pool }
    }

    pub async fn list(&self, city_id: Option<Uuid>) -> Result<Vec<TerritoryView>, AppError> {
        let today = Utc::now().date_naive();
        let territories = self.territory_repo.list(city_id).await?;
        Ok(territories
            .into_iter()
            .map(|overview| classification::project(overview, today))
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<TerritoryView, AppError> {
        let today = Utc::now().date_naive();
        let overview = self
            .territory_repo
            .get_overview(id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;
        Ok(classification::project(overview, today))
    }

    pub async fn create(&self, name: &str, city_id: Uuid) -> Result<TerritoryView, AppError> {
        self.territory_repo
            .get_city(city_id)
            .await?
            .ok_or(AppError::NotFound("Cidade não encontrada."))?;

        let territory = self.territory_repo.insert(&self.pool, city_id, name).await?;
        self.get(territory.id).await
    }

    /// Atualização pura de campos (nome, cidade, observação, geometria).
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        city_id: Option<Uuid>,
        note: Option<&str>,
        geometry: Option<serde_json::Value>,
    ) -> Result<TerritoryView, AppError> {
        if let Some(city_id) = city_id {
            self.territory_repo
                .get_city(city_id)
                .await?
                .ok_or(AppError::NotFound("Cidade não encontrada."))?;
        }

        let territory = self
            .territory_repo
            .update_fields(&self.pool, id, name, city_id, note, geometry)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        self.get(territory.id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let territory = self
            .territory_repo
            .get_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        if territory.active_assignment_id.is_some() {
            return Err(AppError::Conflict(
                "O território possui uma designação ativa e não pode ser excluído.".to_string(),
            ));
        }

        self.territory_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Gancho da varredura de verificação: resolve PENDING -> AVAILABLE.
    pub async fn reclassify_pending(&self, id: Uuid) -> Result<TerritoryView, AppError> {
        let mut tx = self.pool.begin().await?;

        let territory = self
            .territory_repo
            .get_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        if territory.status != TerritoryStatus::Pending {
            return Err(AppError::InvalidTransition {
                status: territory.status,
                operation: "reclassifyPending",
            });
        }

        self.territory_repo
            .set_status(&mut *tx, id, TerritoryStatus::Available)
            .await?;
        tx.commit().await?;

        self.get(id).await
    }

    // --- Cidades ---

    pub async fn list_cities(&self) -> Result<Vec<City>, AppError> {
        self.territory_repo.list_cities().await
    }

    pub async fn create_city(&self, name: &str) -> Result<City, AppError> {
        self.territory_repo.insert_city(&self.pool, name).await
    }

    pub async fn delete_city(&self, id: Uuid) -> Result<(), AppError> {
        self.territory_repo
            .get_city(id)
            .await?
            .ok_or(AppError::NotFound("Cidade não encontrada."))?;

        let count = self.territory_repo.count_territories_in_city(id).await?;
        if count > 0 {
            return Err(AppError::Conflict(
                "A cidade possui territórios cadastrados e não pode ser excluída.".to_string(),
            ));
        }

        self.territory_repo.delete_city(&self.pool, id).await?;
        Ok(())
    }
}
