// src/models/territory.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Cidades ---
// Partição geográfica dos territórios. Cadastro mínimo: só o nome.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: Uuid,
    #[schema(example = "Campinas")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// --- 2. Status do Território ---
// O core só GRAVA Available/Assigned/Pending. Late nunca é persistido por
// aqui: é derivado na leitura a partir do vencimento da designação ativa
// (ver services::classification). O tipo existe no banco e no JSON porque
// a varredura externa pode persisti-lo para relatórios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "territory_status", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum TerritoryStatus {
    Available, // Vira "AVAILABLE"
    Assigned,  // Vira "ASSIGNED"
    Pending,   // Recém-devolvido, aguardando a varredura de verificação
    Late,      // Derivado: designação ativa com dueDate vencido
}

impl TerritoryStatus {
    /// Somente territórios livres (ou recém-devolvidos) aceitam nova designação.
    pub fn accepts_assignment(self) -> bool {
        matches!(self, TerritoryStatus::Available | TerritoryStatus::Pending)
    }
}

impl std::fmt::Display for TerritoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TerritoryStatus::Available => "AVAILABLE",
            TerritoryStatus::Assigned => "ASSIGNED",
            TerritoryStatus::Pending => "PENDING",
            TerritoryStatus::Late => "LATE",
        })
    }
}

// --- 3. Território (linha crua da tabela) ---
// Usada dentro das transações (SELECT ... FOR UPDATE). O status aqui é o
// ARMAZENADO, sem a derivação de atraso.
#[derive(Debug, Clone, FromRow)]
pub struct Territory {
    pub id: Uuid,
    pub city_id: Uuid,
    pub name: String,
    pub status: TerritoryStatus,
    // Texto ISO (YYYY-MM-DD). Valores importados de planilhas antigas podem
    // estar malformados; o classificador trata isso como "nunca visitado".
    pub last_visited_on: Option<String>,
    pub note: Option<String>,
    pub geometry: Option<serde_json::Value>,
    // Referência não-proprietária à designação ativa no livro-razão.
    pub active_assignment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 4. Território + contexto (leitura) ---
// O JOIN do repo traz o nome da cidade e o vencimento/titular da designação
// ativa: os insumos do classificador temporal.
#[derive(Debug, Clone, FromRow)]
pub struct TerritoryOverview {
    pub id: Uuid,
    pub city_id: Uuid,
    pub city_name: String,
    pub name: String,
    pub status: TerritoryStatus,
    pub last_visited_on: Option<String>,
    pub note: Option<String>,
    pub geometry: Option<serde_json::Value>,
    pub active_assignment_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 5. Visão serializada ---
// O que o frontend recebe. Aqui o status JÁ passou pela derivação de atraso.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryView {
    pub id: Uuid,
    pub city_id: Uuid,
    #[schema(example = "Campinas")]
    pub city_name: String,
    #[schema(example = "Quadra 12 (Centro)")]
    pub name: String,
    pub status: TerritoryStatus,
    #[schema(example = "2024-05-10")]
    pub last_visited_on: Option<String>,
    pub note: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub geometry: Option<serde_json::Value>,
    pub active_assignment_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apenas_available_e_pending_aceitam_designacao() {
        assert!(TerritoryStatus::Available.accepts_assignment());
        assert!(TerritoryStatus::Pending.accepts_assignment());
        assert!(!TerritoryStatus::Assigned.accepts_assignment());
        assert!(!TerritoryStatus::Late.accepts_assignment());
    }

    #[test]
    fn status_serializa_com_os_literais_do_contrato() {
        let json = serde_json::to_string(&TerritoryStatus::Available).unwrap();
        assert_eq!(json, "\"AVAILABLE\"");
        let back: TerritoryStatus = serde_json::from_str("\"LATE\"").unwrap();
        assert_eq!(back, TerritoryStatus::Late);
    }
}
