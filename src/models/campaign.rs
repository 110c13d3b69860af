// src/models/campaign.rs

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Campanha (linha crua da tabela) ---
// Os conjuntos de territórios moram em campaign_territories, por valor
// (só ids), para não criar alias com o registro de territórios.
#[derive(Debug, Clone, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}

// --- Visão serializada (campanha + conjuntos de ids) ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    pub id: Uuid,
    #[schema(example = "Campanha Especial 2024")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "2024-03-01")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-03-31")]
    pub end_date: NaiveDate,
    pub closed: bool,
    // Conjunto completo reservado para a campanha.
    pub territories: Vec<Uuid>,
    // Subconjunto ainda disponível; congelado quando closed = true.
    pub remaining_territories: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl CampaignView {
    pub fn assemble(campaign: Campaign, territories: Vec<Uuid>, remaining: Vec<Uuid>) -> Self {
        CampaignView {
            id: campaign.id,
            name: campaign.name,
            description: campaign.description,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            closed: campaign.closed,
            territories,
            remaining_territories: remaining,
            created_at: campaign.created_at,
        }
    }
}

// --- Reconciliação de encerramento ---

/// Territórios USADOS na campanha: os reservados que não sobraram.
/// São estes que viram designações materializadas no encerramento.
pub fn used_territories(territories: &[Uuid], remaining: &[Uuid]) -> Vec<Uuid> {
    let rest: HashSet<Uuid> = remaining.iter().copied().collect();
    territories
        .iter()
        .copied()
        .filter(|id| !rest.contains(id))
        .collect()
}

/// Ids do candidato que NÃO pertencem ao conjunto reservado da campanha.
/// Lista vazia = candidato é subconjunto válido para setRemaining.
pub fn ids_outside_campaign(territories: &[Uuid], candidate: &[Uuid]) -> Vec<Uuid> {
    let members: HashSet<Uuid> = territories.iter().copied().collect();
    candidate
        .iter()
        .copied()
        .filter(|id| !members.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn usados_sao_os_reservados_menos_os_restantes() {
        // territories = {A, B, C}, remaining = {C} => usados = {A, B}
        let all = ids(3);
        let remaining = vec![all[2]];
        let used = used_territories(&all, &remaining);
        assert_eq!(used, vec![all[0], all[1]]);
    }

    #[test]
    fn sem_restantes_todos_foram_usados() {
        let all = ids(2);
        assert_eq!(used_territories(&all, &[]), all);
    }

    #[test]
    fn todos_restantes_nenhum_usado() {
        let all = ids(2);
        assert!(used_territories(&all, &all).is_empty());
    }

    #[test]
    fn subconjunto_valido_nao_acusa_ids_de_fora() {
        let all = ids(3);
        assert!(ids_outside_campaign(&all, &all[..2]).is_empty());
        assert!(ids_outside_campaign(&all, &[]).is_empty());
    }

    #[test]
    fn id_estranho_e_acusado() {
        let all = ids(2);
        let intruso = Uuid::new_v4();
        let extras = ids_outside_campaign(&all, &[all[0], intruso]);
        assert_eq!(extras, vec![intruso]);
    }
}
