// src/services/reminder_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReminderRepository, TerritoryRepository},
    models::reminder::Reminder,
};

// Rastreador de lembretes: registra que uma pessoa foi lembrada de um
// território vencido. No máximo um lembrete em aberto por dupla
// (território, pessoa); a entrega da mensagem é do notificador externo.
#[derive(Clone)]
pub struct ReminderService {
    reminder_repo: ReminderRepository,
    territory_repo: TerritoryRepository,
    pool: PgPool,
}

impl ReminderService {
    pub fn new(
        reminder_repo: ReminderRepository,
        territory_repo: TerritoryRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            reminder_repo,
            territory_repo,
            pool,
        }
    }

    pub async fn has_open_reminder(
        &self,
        territory_id: Uuid,
        person_id: Uuid,
    ) -> Result<bool, AppError> {
        self.reminder_repo.has_reminder(territory_id, person_id).await
    }

    /// Registra o lembrete. Não importa quem emite: a deduplicação é pela
    /// dupla (território, pessoa).
    pub async fn create(
        &self,
        territory_id: Uuid,
        person_id: Uuid,
        issued_by_id: Uuid,
        note: Option<&str>,
    ) -> Result<Reminder, AppError> {
        let mut tx = self.pool.begin().await?;

        // A trava na linha do território serializa criações concorrentes
        // para a mesma dupla.
        self.territory_repo
            .get_for_update(&mut *tx, territory_id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        if self
            .reminder_repo
            .exists(&mut *tx, territory_id, person_id)
            .await?
        {
            return Err(AppError::AlreadyReminded);
        }

        let reminder = self
            .reminder_repo
            .insert(&mut *tx, territory_id, person_id, issued_by_id, note)
            .await?;
        tx.commit().await?;

        Ok(reminder)
    }

    pub async fn list_for_territory(&self, territory_id: Uuid) -> Result<Vec<Reminder>, AppError> {
        self.territory_repo
            .get_overview(territory_id)
            .await?
            .ok_or(AppError::NotFound("Território não encontrado."))?;

        self.reminder_repo.list_for_territory(territory_id).await
    }
}

#[cfg(test)]
mod db_tests {
    //! Rode com: cargo test -- --ignored (precisa de DATABASE_URL).

    use super::*;
    use crate::db::TerritoryRepository;
    use sqlx::postgres::PgPoolOptions;

    async fn setup() -> (ReminderService, Uuid) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Falha ao conectar ao banco de testes");
        sqlx::migrate!().run(&pool).await.expect("Falha nas migrações");

        let territory_repo = TerritoryRepository::new(pool.clone());
        let reminder_repo = ReminderRepository::new(pool.clone());

        let city = territory_repo
            .insert_city(&pool, &format!("Cidade {}", Uuid::new_v4()))
            .await
            .unwrap();
        let territory = territory_repo.insert(&pool, city.id, "Quadra 1").await.unwrap();

        (
            ReminderService::new(reminder_repo, territory_repo, pool),
            territory.id,
        )
    }

    #[tokio::test]
    #[ignore]
    async fn segundo_lembrete_para_a_mesma_dupla_falha_mesmo_com_outro_emissor() {
        let (service, territory_id) = setup().await;
        let person = Uuid::new_v4();

        service
            .create(territory_id, person, Uuid::new_v4(), None)
            .await
            .unwrap();
        assert!(service.has_open_reminder(territory_id, person).await.unwrap());

        let err = service
            .create(territory_id, person, Uuid::new_v4(), Some("de novo"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReminded));
        assert!(service.has_open_reminder(territory_id, person).await.unwrap());

        // Outra pessoa no mesmo território continua livre.
        assert!(
            !service
                .has_open_reminder(territory_id, Uuid::new_v4())
                .await
                .unwrap()
        );
    }
}
