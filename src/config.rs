// src/config.rs

use crate::{
    db::{AssignmentRepository, CampaignRepository, ReminderRepository, TerritoryRepository},
    services::{
        AssignmentService, CampaignService, ClassificationService, ReminderService,
        TerritoryService,
    },
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub territory_service: TerritoryService,
    pub assignment_service: AssignmentService,
    pub campaign_service: CampaignService,
    pub classification_service: ClassificationService,
    pub reminder_service: ReminderService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let territory_repo = TerritoryRepository::new(db_pool.clone());
        let assignment_repo = AssignmentRepository::new(db_pool.clone());
        let campaign_repo = CampaignRepository::new(db_pool.clone());
        let reminder_repo = ReminderRepository::new(db_pool.clone());

        let territory_service = TerritoryService::new(territory_repo.clone(), db_pool.clone());
        let assignment_service = AssignmentService::new(
            territory_repo.clone(),
            assignment_repo.clone(),
            db_pool.clone(),
        );
        let campaign_service = CampaignService::new(
            campaign_repo,
            territory_repo.clone(),
            assignment_repo,
            db_pool.clone(),
        );
        let classification_service = ClassificationService::new(territory_repo.clone());
        let reminder_service =
            ReminderService::new(reminder_repo, territory_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            territory_service,
            assignment_service,
            campaign_service,
            classification_service,
            reminder_service,
        })
    }
}
