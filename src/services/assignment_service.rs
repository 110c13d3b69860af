// src/services/assignment_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, TerritoryRepository},
    models::{
        assignment::{Assignment, AssignmentHolder},
        territory::TerritoryStatus,
    },
};

// O Livro-Razão de designações. Cada operação muda o razão E o status do
// território na MESMA transação; a linha do território é travada primeiro
// (FOR UPDATE), então duas mutações concorrentes no mesmo território são
// serializadas e a segunda falha de forma determinística.
#[derive(Clone)]
pub struct AssignmentService {
    territory_repo: TerritoryRepository,
    assignment_repo: AssignmentRepository,
    pool: PgPool,
}

impl AssignmentService {
    pub fn new(
        territory_repo: TerritoryRepository,
        assignment_repo: AssignmentRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            territory_repo,
            assignment_repo,
            pool,
        }
    }

    /// AVAILABLE/PENDING --assign(pessoa)--> ASSIGNED
    pub async fn assign(
        &self,
        territory_id: Uuid,
        person_id: Uuid,
        due_date: Option<NaiveDate>,
    ) -> Result<Assignment, AppError> {
        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await?;

        let territory = self
            .territory_repo
            .get_for_update(&mut *tx, territory_id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        if !territory.status.accepts_assignment() {
            return Err(AppError::InvalidTransition {
                status: territory.status,
                operation: "assign",
            });
        }

        // Checagem explícita da invariante; o índice parcial no banco cobre
        // a janela entre transações.
        if self
            .assignment_repo
            .find_active(&mut *tx, territory_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "O território já possui uma designação ativa.".to_string(),
            ));
        }

        let assignment = self
            .assignment_repo
            .insert(
                &mut *tx,
                territory_id,
                AssignmentHolder::Person(person_id),
                today,
                due_date,
                None,
            )
            .await?;

        self.territory_repo
            .mark_assigned(&mut *tx, territory_id, assignment.id)
            .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    /// ASSIGNED/LATE --return()--> PENDING, com a visita registrada.
    pub async fn return_territory(&self, territory_id: Uuid) -> Result<Assignment, AppError> {
        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await?;

        self.territory_repo
            .get_for_update(&mut *tx, territory_id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        let active = self
            .assignment_repo
            .find_active(&mut *tx, territory_id)
            .await?
            .ok_or(AppError::NoActiveAssignment)?;

        let assignment = self.assignment_repo.close(&mut *tx, active.id, today).await?;

        let visited = today.format("%Y-%m-%d").to_string();
        self.territory_repo
            .release(&mut *tx, territory_id, TerritoryStatus::Pending, Some(&visited))
            .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    /// ASSIGNED/LATE --cancel()--> AVAILABLE. Desfaz sem registrar visita:
    /// lastVisitedOn fica como estava.
    pub async fn cancel(&self, territory_id: Uuid) -> Result<Assignment, AppError> {
        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await?;

        self.territory_repo
            .get_for_update(&mut *tx, territory_id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        let active = self
            .assignment_repo
            .find_active(&mut *tx, territory_id)
            .await?
            .ok_or(AppError::NoActiveAssignment)?;

        let assignment = self.assignment_repo.close(&mut *tx, active.id, today).await?;

        self.territory_repo
            .release(&mut *tx, territory_id, TerritoryStatus::Available, None)
            .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    /// ASSIGNED/LATE --extend(novo dueDate)--> ASSIGNED, mesmo titular.
    pub async fn extend(
        &self,
        territory_id: Uuid,
        new_due_date: NaiveDate,
    ) -> Result<Assignment, AppError> {
        let mut tx = self.pool.begin().await?;

        self.territory_repo
            .get_for_update(&mut *tx, territory_id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        let active = self
            .assignment_repo
            .find_active(&mut *tx, territory_id)
            .await?
            .ok_or(AppError::NoActiveAssignment)?;

        let assignment = self
            .assignment_repo
            .extend(&mut *tx, active.id, new_due_date)
            .await?;

        // Regrava ASSIGNED: cobre o caso de a varredura externa ter
        // persistido LATE antes da prorrogação.
        self.territory_repo
            .mark_assigned(&mut *tx, territory_id, assignment.id)
            .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    /// Histórico do território, mais recente primeiro.
    pub async fn history(&self, territory_id: Uuid) -> Result<Vec<Assignment>, AppError> {
        self.territory_repo
            .get_overview(territory_id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        self.assignment_repo.history(territory_id).await
    }
}

#[cfg(test)]
mod db_tests {
    //! Fluxos completos contra um Postgres local (DATABASE_URL com as
    //! migrações aplicáveis). Rode com: cargo test -- --ignored

    use super::*;
    use sqlx::postgres::PgPoolOptions;

    async fn setup() -> (AssignmentService, TerritoryRepository, Uuid) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Falha ao conectar ao banco de testes");
        sqlx::migrate!().run(&pool).await.expect("Falha nas migrações");

        let territory_repo = TerritoryRepository::new(pool.clone());
        let assignment_repo = AssignmentRepository::new(pool.clone());

        let city = territory_repo
            .insert_city(&pool, &format!("Cidade {}", Uuid::new_v4()))
            .await
            .unwrap();
        let territory = territory_repo.insert(&pool, city.id, "Quadra 1").await.unwrap();

        (
            AssignmentService::new(territory_repo.clone(), assignment_repo, pool),
            territory_repo,
            territory.id,
        )
    }

    #[tokio::test]
    #[ignore]
    async fn designar_e_devolver_deixa_pendente_com_visita_de_hoje() {
        let (service, territory_repo, territory_id) = setup().await;
        let today = Utc::now().date_naive();

        service.assign(territory_id, Uuid::new_v4(), None).await.unwrap();
        let devolvida = service.return_territory(territory_id).await.unwrap();
        assert_eq!(devolvida.return_date, Some(today));

        let overview = territory_repo.get_overview(territory_id).await.unwrap().unwrap();
        assert_eq!(overview.status, TerritoryStatus::Pending);
        assert_eq!(
            overview.last_visited_on.as_deref(),
            Some(today.format("%Y-%m-%d").to_string().as_str())
        );
    }

    #[tokio::test]
    #[ignore]
    async fn designar_e_cancelar_volta_para_disponivel_sem_visita() {
        let (service, territory_repo, territory_id) = setup().await;

        service.assign(territory_id, Uuid::new_v4(), None).await.unwrap();
        service.cancel(territory_id).await.unwrap();

        let overview = territory_repo.get_overview(territory_id).await.unwrap().unwrap();
        assert_eq!(overview.status, TerritoryStatus::Available);
        assert_eq!(overview.last_visited_on, None);
        assert_eq!(overview.active_assignment_id, None);
    }

    #[tokio::test]
    #[ignore]
    async fn segunda_designacao_sem_devolucao_falha() {
        let (service, _territory_repo, territory_id) = setup().await;

        service.assign(territory_id, Uuid::new_v4(), None).await.unwrap();
        let err = service.assign(territory_id, Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        // E o histórico continua com uma única entrada ativa.
        let history = service.history(territory_id).await.unwrap();
        assert_eq!(history.iter().filter(|a| a.is_active()).count(), 1);
    }

    #[tokio::test]
    #[ignore]
    async fn devolver_sem_designacao_ativa_falha() {
        let (service, _territory_repo, territory_id) = setup().await;
        let err = service.return_territory(territory_id).await.unwrap_err();
        assert!(matches!(err, AppError::NoActiveAssignment));
    }
}
