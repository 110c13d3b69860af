pub mod assignment_service;
pub use assignment_service::AssignmentService;
pub mod campaign_service;
pub use campaign_service::CampaignService;
pub mod classification;
pub use classification::ClassificationService;
pub mod reminder_service;
pub use reminder_service::ReminderService;
pub mod territory_service;
pub use territory_service::TerritoryService;
