// src/models/assignment.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use utoipa::ToSchema;
use uuid::Uuid;

// --- Titular da designação ---
// Pessoa OU campanha, nunca ambos. No JSON: {"kind": "PERSON", "id": "..."}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentHolder {
    Person(Uuid),
    Campaign(Uuid),
}

impl AssignmentHolder {
    /// Decompõe o titular nas duas colunas do banco (person_id, campaign_id).
    pub fn into_columns(self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            AssignmentHolder::Person(id) => (Some(id), None),
            AssignmentHolder::Campaign(id) => (None, Some(id)),
        }
    }
}

// --- Designação (entrada do livro-razão) ---
// Append-only: fechada via return_date, nunca apagada.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub territory_id: Uuid,
    pub holder: AssignmentHolder,
    #[schema(example = "2024-03-01")]
    pub assignment_date: NaiveDate,
    // Nulo para ocupações de campanha.
    pub due_date: Option<NaiveDate>,
    // Nulo enquanto a designação está ativa.
    pub return_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }
}

// FromRow manual: as colunas person_id/campaign_id viram o enum
// AssignmentHolder. O CHECK 'assignments_one_holder' garante no banco que
// exatamente uma delas está preenchida.
impl<'r> FromRow<'r, PgRow> for Assignment {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let person_id: Option<Uuid> = row.try_get("person_id")?;
        let campaign_id: Option<Uuid> = row.try_get("campaign_id")?;

        let holder = match (person_id, campaign_id) {
            (Some(id), None) => AssignmentHolder::Person(id),
            (None, Some(id)) => AssignmentHolder::Campaign(id),
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "person_id".into(),
                    source: "designação sem titular único (person_id/campaign_id)".into(),
                });
            }
        };

        Ok(Assignment {
            id: row.try_get("id")?,
            territory_id: row.try_get("territory_id")?,
            holder,
            assignment_date: row.try_get("assignment_date")?,
            due_date: row.try_get("due_date")?,
            return_date: row.try_get("return_date")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titular_serializa_como_uniao_etiquetada() {
        let id = Uuid::nil();
        let json = serde_json::to_value(AssignmentHolder::Person(id)).unwrap();
        assert_eq!(json["kind"], "PERSON");
        assert_eq!(json["id"], id.to_string());

        let json = serde_json::to_value(AssignmentHolder::Campaign(id)).unwrap();
        assert_eq!(json["kind"], "CAMPAIGN");
    }

    #[test]
    fn titular_decompoe_em_exatamente_uma_coluna() {
        let id = Uuid::new_v4();
        assert_eq!(AssignmentHolder::Person(id).into_columns(), (Some(id), None));
        assert_eq!(AssignmentHolder::Campaign(id).into_columns(), (None, Some(id)));
    }

    #[test]
    fn designacao_ativa_e_a_sem_data_de_devolucao() {
        let a = Assignment {
            id: Uuid::new_v4(),
            territory_id: Uuid::new_v4(),
            holder: AssignmentHolder::Person(Uuid::new_v4()),
            assignment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_date: None,
            return_date: None,
            created_at: Utc::now(),
        };
        assert!(a.is_active());
        let devolvida = Assignment {
            return_date: Some(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()),
            ..a
        };
        assert!(!devolvida.is_active());
    }
}
