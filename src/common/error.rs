use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::territory::TerritoryStatus;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada variante corresponde a uma falha de negócio do core; o IntoResponse
// traduz para o status HTTP que o frontend espera.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Id desconhecido. A mensagem já vem pronta ("Território não encontrado." etc.)
    #[error("{0}")]
    NotFound(&'static str),

    // Violação da máquina de estados do território.
    #[error("O território em {status} não permite a operação '{operation}'.")]
    InvalidTransition {
        status: TerritoryStatus,
        operation: &'static str,
    },

    #[error("O território não possui designação ativa.")]
    NoActiveAssignment,

    // Dupla designação concorrente, exclusão com designação ativa, etc.
    #[error("{0}")]
    Conflict(String),

    // Operação não permitida pelo estado da campanha (aberta/encerrada).
    #[error("{0}")]
    InvalidState(String),

    // Intervalo de datas malformado, território fora do conjunto da campanha...
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Esta pessoa já possui um lembrete para este território.")]
    AlreadyReminded,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),

            AppError::InvalidTransition { status, operation } => (
                StatusCode::CONFLICT,
                format!("O território em {} não permite a operação '{}'.", status, operation),
            ),

            AppError::NoActiveAssignment => (
                StatusCode::CONFLICT,
                "O território não possui designação ativa.".to_string(),
            ),

            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidState(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),

            AppError::AlreadyReminded => (
                StatusCode::CONFLICT,
                "Esta pessoa já possui um lembrete para este território.".to_string(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // O contrato com o frontend: cada tipo de falha tem um status fixo.
    #[test]
    fn mapeia_erros_de_negocio_para_os_status_corretos() {
        let cases = [
            (AppError::NotFound("Território não encontrado."), StatusCode::NOT_FOUND),
            (
                AppError::InvalidTransition {
                    status: TerritoryStatus::Assigned,
                    operation: "assign",
                },
                StatusCode::CONFLICT,
            ),
            (AppError::NoActiveAssignment, StatusCode::CONFLICT),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::InvalidState("x".into()), StatusCode::CONFLICT),
            (AppError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (AppError::AlreadyReminded, StatusCode::CONFLICT),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
