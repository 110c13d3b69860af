pub mod assignments;
pub mod campaigns;
pub mod reminders;
pub mod territories;
