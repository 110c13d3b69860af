//src/main.rs

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Cidades (cadastro mínimo que particiona os territórios)
    let city_routes = Router::new()
        .route(
            "/",
            post(handlers::territories::create_city).get(handlers::territories::list_cities),
        )
        .route("/{city_id}", delete(handlers::territories::delete_city));

    // Territórios: CRUD + máquina de estados + visões derivadas
    let territory_routes = Router::new()
        .route(
            "/",
            post(handlers::territories::create_territory)
                .get(handlers::territories::list_territories),
        )
        .route("/late", get(handlers::territories::list_late))
        .route("/non-visited", get(handlers::territories::list_non_visited))
        .route(
            "/{territory_id}",
            get(handlers::territories::get_territory)
                .put(handlers::territories::update_territory)
                .delete(handlers::territories::delete_territory),
        )
        .route(
            "/{territory_id}/assign",
            post(handlers::assignments::assign_territory),
        )
        .route(
            "/{territory_id}/return",
            post(handlers::assignments::return_territory),
        )
        .route(
            "/{territory_id}/cancel",
            post(handlers::assignments::cancel_assignment),
        )
        .route(
            "/{territory_id}/extend",
            post(handlers::assignments::extend_assignment),
        )
        .route(
            "/{territory_id}/reclassify",
            post(handlers::territories::reclassify_pending),
        )
        .route(
            "/{territory_id}/history",
            get(handlers::assignments::assignment_history),
        )
        .route(
            "/{territory_id}/reminders",
            get(handlers::reminders::list_territory_reminders),
        );

    // Campanhas (reserva em lote com encerramento reconciliado)
    let campaign_routes = Router::new()
        .route(
            "/",
            post(handlers::campaigns::create_campaign).get(handlers::campaigns::list_campaigns),
        )
        .route(
            "/from-previous",
            post(handlers::campaigns::create_from_previous),
        )
        .route(
            "/{campaign_id}",
            get(handlers::campaigns::get_campaign).delete(handlers::campaigns::delete_campaign),
        )
        .route(
            "/{campaign_id}/remaining",
            put(handlers::campaigns::set_remaining),
        )
        .route(
            "/{campaign_id}/close",
            post(handlers::campaigns::close_campaign),
        );

    // Lembretes de atraso
    let reminder_routes = Router::new()
        .route("/", post(handlers::reminders::create_reminder))
        .route("/check", get(handlers::reminders::check_reminder));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/cities", city_routes)
        .nest("/api/territories", territory_routes)
        .nest("/api/campaigns", campaign_routes)
        .nest("/api/reminders", reminder_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
