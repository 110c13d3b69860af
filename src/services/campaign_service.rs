// src/services/campaign_service.rs

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, CampaignRepository, TerritoryRepository},
    models::{
        assignment::AssignmentHolder,
        campaign::{ids_outside_campaign, used_territories, Campaign, CampaignView},
    },
};

/// Intervalo da campanha: a data final nunca antes da inicial.
fn ensure_valid_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), AppError> {
    if end_date < start_date {
        return Err(AppError::InvalidArgument(
            "A data final da campanha não pode ser anterior à inicial.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CampaignService {
    campaign_repo: CampaignRepository,
    territory_repo: TerritoryRepository,
    assignment_repo: AssignmentRepository,
    pool: PgPool,
}

impl CampaignService {
    pub fn new(
        campaign_repo: CampaignRepository,
        territory_repo: TerritoryRepository,
        assignment_repo: AssignmentRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            campaign_repo,
            territory_repo,
            assignment_repo,
            pool,
        }
    }

    // Monta a visão (campanha + conjuntos de ids) fora de transação.
    async fn view(&self, campaign: Campaign) -> Result<CampaignView, AppError> {
        let territories = self.campaign_repo.territory_ids(&self.pool, campaign.id).await?;
        let remaining = self.campaign_repo.remaining_ids(&self.pool, campaign.id).await?;
        Ok(CampaignView::assemble(campaign, territories, remaining))
    }

    pub async fn get(&self, id: Uuid) -> Result<CampaignView, AppError> {
        let campaign = self
            .campaign_repo
            .get(id)
            .await?
            .ok_or(AppError::NotFound("Campanha não encontrada."))?;
        self.view(campaign).await
    }

    pub async fn list(&self) -> Result<Vec<CampaignView>, AppError> {
        let campaigns = self.campaign_repo.list().await?;
        let mut views = Vec::with_capacity(campaigns.len());
        for campaign in campaigns {
            views.push(self.view(campaign).await?);
        }
        Ok(views)
    }

    /// Cria a campanha com remainingTerritories = conjunto completo.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        territory_ids: Vec<Uuid>,
    ) -> Result<CampaignView, AppError> {
        ensure_valid_range(start_date, end_date)?;

        // Os ids são copiados por valor; valida contra o registro antes.
        let found: HashSet<Uuid> = self
            .territory_repo
            .filter_existing(&territory_ids)
            .await?
            .into_iter()
            .collect();
        let missing = territory_ids
            .iter()
            .filter(|id| !found.contains(*id))
            .count();
        if missing > 0 {
            return Err(AppError::InvalidArgument(format!(
                "{} território(s) informado(s) não existe(m) no registro.",
                missing
            )));
        }

        let mut tx = self.pool.begin().await?;
        let campaign = self
            .campaign_repo
            .insert(&mut *tx, name, description, start_date, end_date)
            .await?;
        self.campaign_repo
            .insert_territories(&mut *tx, campaign.id, &territory_ids)
            .await?;
        let territories = self.campaign_repo.territory_ids(&mut *tx, campaign.id).await?;
        tx.commit().await?;

        Ok(CampaignView::assemble(campaign, territories.clone(), territories))
    }

    /// Herda o conjunto da campanha anterior: o que SOBROU dela vira o
    /// conjunto completo da nova. Exige a anterior encerrada.
    pub async fn create_from_previous(
        &self,
        previous_id: Uuid,
        name: &str,
        description: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<CampaignView, AppError> {
        ensure_valid_range(start_date, end_date)?;

        let previous = self
            .campaign_repo
            .get(previous_id)
            .await?
            .ok_or(AppError::NotFound("Campanha não encontrada."))?;
        if !previous.closed {
            return Err(AppError::InvalidState(
                "A campanha anterior ainda está aberta; encerre-a antes de herdar os territórios."
                    .to_string(),
            ));
        }

        let inherited = self.campaign_repo.remaining_ids(&self.pool, previous_id).await?;

        let mut tx = self.pool.begin().await?;
        let campaign = self
            .campaign_repo
            .insert(&mut *tx, name, description, start_date, end_date)
            .await?;
        self.campaign_repo
            .insert_territories(&mut *tx, campaign.id, &inherited)
            .await?;
        tx.commit().await?;

        Ok(CampaignView::assemble(campaign, inherited.clone(), inherited))
    }

    /// Substitui remainingTerritories enquanto a campanha está aberta.
    pub async fn set_remaining(
        &self,
        id: Uuid,
        territory_ids: Vec<Uuid>,
    ) -> Result<CampaignView, AppError> {
        let mut tx = self.pool.begin().await?;

        let campaign = self
            .campaign_repo
            .get_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Campanha não encontrada."))?;
        if campaign.closed {
            return Err(AppError::InvalidState(
                "A campanha já foi encerrada; o conjunto restante está congelado.".to_string(),
            ));
        }

        let members = self.campaign_repo.territory_ids(&mut *tx, id).await?;
        let extras = ids_outside_campaign(&members, &territory_ids);
        if !extras.is_empty() {
            return Err(AppError::InvalidArgument(format!(
                "{} território(s) não pertence(m) ao conjunto reservado da campanha.",
                extras.len()
            )));
        }

        self.campaign_repo
            .update_remaining(&mut *tx, id, &territory_ids)
            .await?;
        let remaining = self.campaign_repo.remaining_ids(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(CampaignView::assemble(campaign, members, remaining))
    }

    /// Encerramento em duas fases, tudo-ou-nada:
    /// (a) materializa no livro-razão uma ocupação JÁ FECHADA
    ///     (assignmentDate = returnDate = hoje) para cada território usado;
    /// (b) congela a campanha (closed = true).
    /// Falha parcial = rollback: nenhuma designação e campanha ainda aberta.
    pub async fn close(&self, id: Uuid) -> Result<CampaignView, AppError> {
        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE: um segundo close concorrente espera aqui e recebe
        // InvalidState, nunca materializa em dobro.
        let mut campaign = self
            .campaign_repo
            .get_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Campanha não encontrada."))?;
        if campaign.closed {
            return Err(AppError::InvalidState(
                "A campanha já foi encerrada.".to_string(),
            ));
        }

        let members = self.campaign_repo.territory_ids(&mut *tx, id).await?;
        let remaining = self.campaign_repo.remaining_ids(&mut *tx, id).await?;
        let used = used_territories(&members, &remaining);

        for territory_id in &used {
            self.assignment_repo
                .insert(
                    &mut *tx,
                    *territory_id,
                    AssignmentHolder::Campaign(campaign.id),
                    today,
                    None,
                    Some(today),
                )
                .await?;
        }

        self.campaign_repo.mark_closed(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            "Campanha '{}' encerrada: {} território(s) usado(s), {} restante(s).",
            campaign.name,
            used.len(),
            remaining.len()
        );

        campaign.closed = true;
        Ok(CampaignView::assemble(campaign, members, remaining))
    }

    /// Permitida aberta ou encerrada; o livro-razão fica intacto.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let rows = self.campaign_repo.delete(&self.pool, id).await?;
        if rows == 0 {
            return Err(AppError::NotFound("Campanha não encontrada."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn intervalo_invertido_e_rejeitado() {
        let err = ensure_valid_range(date(2024, 3, 31), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn intervalo_de_um_dia_e_valido() {
        assert!(ensure_valid_range(date(2024, 3, 1), date(2024, 3, 1)).is_ok());
    }
}

#[cfg(test)]
mod db_tests {
    //! Fluxos completos contra um Postgres local (DATABASE_URL).
    //! Rode com: cargo test -- --ignored

    use super::*;
    use sqlx::postgres::PgPoolOptions;

    struct Ctx {
        service: CampaignService,
        assignment_repo: AssignmentRepository,
        territory_ids: Vec<Uuid>,
    }

    async fn setup(n_territories: usize) -> Ctx {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Falha ao conectar ao banco de testes");
        sqlx::migrate!().run(&pool).await.expect("Falha nas migrações");

        let territory_repo = TerritoryRepository::new(pool.clone());
        let assignment_repo = AssignmentRepository::new(pool.clone());
        let campaign_repo = CampaignRepository::new(pool.clone());

        let city = territory_repo
            .insert_city(&pool, &format!("Cidade {}", Uuid::new_v4()))
            .await
            .unwrap();
        let mut territory_ids = Vec::new();
        for i in 0..n_territories {
            let t = territory_repo
                .insert(&pool, city.id, &format!("Quadra {}", i + 1))
                .await
                .unwrap();
            territory_ids.push(t.id);
        }

        Ctx {
            service: CampaignService::new(
                campaign_repo,
                territory_repo,
                assignment_repo.clone(),
                pool,
            ),
            assignment_repo,
            territory_ids,
        }
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    #[tokio::test]
    #[ignore]
    async fn encerramento_materializa_somente_os_usados() {
        let ctx = setup(3).await;
        let (start, end) = range();

        // territories = {A, B, C}
        let campaign = ctx
            .service
            .create("Campanha Especial", None, start, end, ctx.territory_ids.clone())
            .await
            .unwrap();

        // remaining = {C}
        let c = ctx.territory_ids[2];
        ctx.service.set_remaining(campaign.id, vec![c]).await.unwrap();

        let closed = ctx.service.close(campaign.id).await.unwrap();
        assert!(closed.closed);
        assert_eq!(closed.remaining_territories, vec![c]);

        // Exatamente A e B ganham ocupações fechadas do titular campanha.
        for (i, territory_id) in ctx.territory_ids.iter().enumerate() {
            let history = ctx.assignment_repo.history(*territory_id).await.unwrap();
            if *territory_id == c {
                assert!(history.is_empty());
            } else {
                assert_eq!(history.len(), 1, "território {} sem ocupação", i);
                let entry = &history[0];
                assert_eq!(entry.holder, AssignmentHolder::Campaign(campaign.id));
                assert_eq!(entry.assignment_date, entry.return_date.unwrap());
                assert!(!entry.is_active());
            }
        }
    }

    #[tokio::test]
    #[ignore]
    async fn segundo_encerramento_falha_sem_duplicar_o_razao() {
        let ctx = setup(2).await;
        let (start, end) = range();

        let campaign = ctx
            .service
            .create("Campanha", None, start, end, ctx.territory_ids.clone())
            .await
            .unwrap();
        ctx.service.set_remaining(campaign.id, vec![]).await.unwrap();
        ctx.service.close(campaign.id).await.unwrap();

        let err = ctx.service.close(campaign.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        for territory_id in &ctx.territory_ids {
            let history = ctx.assignment_repo.history(*territory_id).await.unwrap();
            assert_eq!(history.len(), 1);
        }
    }

    #[tokio::test]
    #[ignore]
    async fn herdar_de_campanha_encerrada_copia_o_restante() {
        let ctx = setup(3).await;
        let (start, end) = range();

        let previous = ctx
            .service
            .create("Anterior", None, start, end, ctx.territory_ids.clone())
            .await
            .unwrap();
        let kept = vec![ctx.territory_ids[0], ctx.territory_ids[1]];
        ctx.service.set_remaining(previous.id, kept.clone()).await.unwrap();

        // Antes de encerrar, herdar é InvalidState.
        let err = ctx
            .service
            .create_from_previous(previous.id, "Nova", None, start, end)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        ctx.service.close(previous.id).await.unwrap();

        let next = ctx
            .service
            .create_from_previous(previous.id, "Nova", None, start, end)
            .await
            .unwrap();
        let territories: HashSet<Uuid> = next.territories.iter().copied().collect();
        let remaining: HashSet<Uuid> = next.remaining_territories.iter().copied().collect();
        let expected: HashSet<Uuid> = kept.into_iter().collect();
        assert_eq!(territories, expected);
        assert_eq!(remaining, expected);
    }
}
