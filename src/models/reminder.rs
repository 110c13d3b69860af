// src/models/reminder.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Lembrete de atraso ---
// Registra que alguém foi lembrado de um território vencido. O core só
// registra o fato; a entrega (mensagem, e-mail) é do notificador externo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub territory_id: Uuid,
    pub person_id: Uuid,
    // Quem emitiu o lembrete (dirigente), não quem recebe.
    pub issued_by_id: Uuid,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
