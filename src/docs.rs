// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Territories ---
        handlers::territories::create_city,
        handlers::territories::list_cities,
        handlers::territories::delete_city,
        handlers::territories::create_territory,
        handlers::territories::list_territories,
        handlers::territories::get_territory,
        handlers::territories::update_territory,
        handlers::territories::delete_territory,
        handlers::territories::list_late,
        handlers::territories::list_non_visited,
        handlers::territories::reclassify_pending,

        // --- Assignments ---
        handlers::assignments::assign_territory,
        handlers::assignments::return_territory,
        handlers::assignments::cancel_assignment,
        handlers::assignments::extend_assignment,
        handlers::assignments::assignment_history,

        // --- Campaigns ---
        handlers::campaigns::create_campaign,
        handlers::campaigns::create_from_previous,
        handlers::campaigns::list_campaigns,
        handlers::campaigns::get_campaign,
        handlers::campaigns::set_remaining,
        handlers::campaigns::close_campaign,
        handlers::campaigns::delete_campaign,

        // --- Reminders ---
        handlers::reminders::create_reminder,
        handlers::reminders::check_reminder,
        handlers::reminders::list_territory_reminders,
    ),
    components(
        schemas(
            // --- Territories ---
            models::territory::City,
            models::territory::TerritoryStatus,
            models::territory::TerritoryView,

            // --- Assignments ---
            models::assignment::Assignment,
            models::assignment::AssignmentHolder,

            // --- Campaigns ---
            models::campaign::CampaignView,

            // --- Reminders ---
            models::reminder::Reminder,

            // --- Payloads ---
            handlers::territories::CreateCityPayload,
            handlers::territories::CreateTerritoryPayload,
            handlers::territories::UpdateTerritoryPayload,
            handlers::assignments::AssignTerritoryPayload,
            handlers::assignments::ExtendAssignmentPayload,
            handlers::campaigns::CreateCampaignPayload,
            handlers::campaigns::CreateFromPreviousPayload,
            handlers::campaigns::SetRemainingPayload,
            handlers::reminders::CreateReminderPayload,
            handlers::reminders::ReminderCheck,
        )
    ),
    tags(
        (name = "Territories", description = "Registro de Territórios e Cidades"),
        (name = "Assignments", description = "Livro-Razão de Designações"),
        (name = "Campaigns", description = "Campanhas (reserva em lote)"),
        (name = "Reminders", description = "Lembretes de Atraso")
    )
)]
pub struct ApiDoc;
