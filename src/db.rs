pub mod territory_repo;
pub use territory_repo::TerritoryRepository;
pub mod assignment_repo;
pub use assignment_repo::AssignmentRepository;
pub mod campaign_repo;
pub use campaign_repo::CampaignRepository;
pub mod reminder_repo;
pub use reminder_repo::ReminderRepository;
