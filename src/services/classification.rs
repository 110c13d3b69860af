// src/services/classification.rs

// O Classificador Temporal: funções puras sobre (status armazenado +
// designação ativa + data de referência). Nenhum estado próprio; as visões
// derivadas são recomputadas de forma síncrona a cada leitura.

use chrono::{Datelike, NaiveDate, Utc};

use crate::{
    common::error::AppError,
    db::TerritoryRepository,
    models::territory::{TerritoryOverview, TerritoryStatus, TerritoryView},
};

// ---
// Funções puras
// ---

/// Status efetivo para leitura.
///
/// LATE nunca é gravado pelo core: um território ASSIGNED com dueDate vencido
/// reporta LATE sem que a designação mude no banco. A derivação é a única
/// fonte de verdade: se a varredura externa tiver persistido LATE mas o
/// vencimento estiver em dia, reportamos ASSIGNED.
pub fn effective_status(
    stored: TerritoryStatus,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> TerritoryStatus {
    let overdue = due_date.is_some_and(|due| due < today);
    match stored {
        TerritoryStatus::Assigned | TerritoryStatus::Late if overdue => TerritoryStatus::Late,
        TerritoryStatus::Late => TerritoryStatus::Assigned,
        other => other,
    }
}

/// O "1º de setembro" mais recente que já completou um ciclo inteiro:
/// setembro do ano passado se já estamos em setembro, senão o de dois anos
/// atrás. Garante que sempre avaliamos uma temporada completa.
pub fn reference_date(today: NaiveDate) -> NaiveDate {
    let year = if today.month() >= 9 {
        today.year() - 1
    } else {
        today.year() - 2
    };
    NaiveDate::from_ymd_opt(year, 9, 1).expect("1º de setembro sempre é uma data válida")
}

/// Datas de visita vêm como texto ISO de importações antigas.
/// Ilegível = None (tratado como "nunca visitado", nunca como erro).
pub fn parse_visit_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Território "não visitado": livre (AVAILABLE/PENDING) e sem visita desde a
/// data de referência. A exclusão por status tem precedência: ASSIGNED/LATE
/// ficam de fora mesmo com a data ausente ou ilegível.
pub fn is_non_visited(
    status: TerritoryStatus,
    last_visited_on: Option<&str>,
    today: NaiveDate,
) -> bool {
    if !matches!(status, TerritoryStatus::Available | TerritoryStatus::Pending) {
        return false;
    }
    match last_visited_on.and_then(parse_visit_date) {
        None => true,
        Some(visited) => visited < reference_date(today),
    }
}

/// Monta a visão de leitura aplicando a derivação de atraso.
pub fn project(overview: TerritoryOverview, today: NaiveDate) -> TerritoryView {
    let status = effective_status(overview.status, overview.due_date, today);
    TerritoryView {
        id: overview.id,
        city_id: overview.city_id,
        city_name: overview.city_name,
        name: overview.name,
        status,
        last_visited_on: overview.last_visited_on,
        note: overview.note,
        geometry: overview.geometry,
        active_assignment_id: overview.active_assignment_id,
        assigned_to: overview.assigned_to,
        due_date: overview.due_date,
        created_at: overview.created_at,
        updated_at: overview.updated_at,
    }
}

// ---
// Service (leituras derivadas)
// ---

#[derive(Clone)]
pub struct ClassificationService {
    territory_repo: TerritoryRepository,
}

impl ClassificationService {
    pub fn new(territory_repo: TerritoryRepository) -> Self {
        Self { territory_repo }
    }

    /// Territórios atrasados: designação ativa com vencimento passado.
    pub async fn list_late(&self) -> Result<Vec<TerritoryView>, AppError> {
        let today = Utc::now().date_naive();
        let territories = self.territory_repo.list(None).await?;
        Ok(territories
            .into_iter()
            .map(|overview| project(overview, today))
            .filter(|view| view.status == TerritoryStatus::Late)
            .collect())
    }

    /// Territórios sem visita desde a data de referência da temporada.
    pub async fn list_non_visited(&self) -> Result<Vec<TerritoryView>, AppError> {
        let today = Utc::now().date_naive();
        let territories = self.territory_repo.list(None).await?;
        Ok(territories
            .into_iter()
            .map(|overview| project(overview, today))
            .filter(|view| is_non_visited(view.status, view.last_visited_on.as_deref(), today))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // --- Derivação de atraso ---

    #[test]
    fn designacao_vencida_reporta_late() {
        let status = effective_status(
            TerritoryStatus::Assigned,
            Some(date(2024, 1, 1)),
            date(2024, 2, 1),
        );
        assert_eq!(status, TerritoryStatus::Late);
    }

    #[test]
    fn sem_due_date_vale_o_status_armazenado() {
        let status = effective_status(TerritoryStatus::Assigned, None, date(2024, 2, 1));
        assert_eq!(status, TerritoryStatus::Assigned);
    }

    #[test]
    fn vencimento_hoje_ainda_nao_e_atraso() {
        // Atraso é dueDate < hoje, estrito.
        let today = date(2024, 2, 1);
        let status = effective_status(TerritoryStatus::Assigned, Some(today), today);
        assert_eq!(status, TerritoryStatus::Assigned);
    }

    #[test]
    fn late_persistido_mas_em_dia_reporta_assigned() {
        // A derivação é a fonte de verdade, não o campo gravado pela varredura.
        let status = effective_status(
            TerritoryStatus::Late,
            Some(date(2024, 3, 1)),
            date(2024, 2, 1),
        );
        assert_eq!(status, TerritoryStatus::Assigned);
    }

    #[test]
    fn disponivel_e_pendente_nao_sao_afetados() {
        let today = date(2024, 2, 1);
        assert_eq!(
            effective_status(TerritoryStatus::Available, None, today),
            TerritoryStatus::Available
        );
        assert_eq!(
            effective_status(TerritoryStatus::Pending, None, today),
            TerritoryStatus::Pending
        );
    }

    // --- Data de referência ---

    #[test]
    fn antes_de_setembro_volta_dois_anos() {
        assert_eq!(reference_date(date(2024, 3, 15)), date(2022, 9, 1));
        assert_eq!(reference_date(date(2024, 8, 31)), date(2022, 9, 1));
    }

    #[test]
    fn de_setembro_em_diante_volta_um_ano() {
        assert_eq!(reference_date(date(2024, 9, 1)), date(2023, 9, 1));
        assert_eq!(reference_date(date(2024, 12, 25)), date(2023, 9, 1));
    }

    // --- Não visitados ---

    #[test]
    fn visita_anterior_a_referencia_conta_como_nao_visitado() {
        // now = 2024-03-15 => referência = 2022-09-01
        let today = date(2024, 3, 15);
        assert!(is_non_visited(
            TerritoryStatus::Available,
            Some("2022-06-01"),
            today
        ));
    }

    #[test]
    fn visita_depois_da_referencia_nao_conta() {
        let today = date(2024, 3, 15);
        assert!(!is_non_visited(
            TerritoryStatus::Available,
            Some("2023-09-02"),
            today
        ));
    }

    #[test]
    fn sem_data_de_visita_conta_como_nunca_visitado() {
        let today = date(2024, 3, 15);
        assert!(is_non_visited(TerritoryStatus::Pending, None, today));
    }

    #[test]
    fn data_ilegivel_conta_como_nunca_visitado() {
        // Herança de planilhas: "31/12/2020" não é ISO.
        let today = date(2024, 3, 15);
        assert!(is_non_visited(
            TerritoryStatus::Available,
            Some("31/12/2020"),
            today
        ));
    }

    #[test]
    fn exclusao_por_status_vence_a_avaliacao_de_data() {
        // ASSIGNED/LATE ficam de fora mesmo com data ausente ou ilegível.
        let today = date(2024, 3, 15);
        assert!(!is_non_visited(TerritoryStatus::Assigned, None, today));
        assert!(!is_non_visited(
            TerritoryStatus::Late,
            Some("lixo"),
            today
        ));
    }

    #[test]
    fn parse_aceita_iso_e_rejeita_o_resto() {
        assert_eq!(parse_visit_date("2024-05-10"), Some(date(2024, 5, 10)));
        assert_eq!(parse_visit_date(" 2024-05-10 "), Some(date(2024, 5, 10)));
        assert_eq!(parse_visit_date("10/05/2024"), None);
        assert_eq!(parse_visit_date(""), None);
        assert_eq!(parse_visit_date("2024-13-40"), None);
    }
}
