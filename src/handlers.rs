pub mod auth;
pub mod campaigns;
pub mod leads;
pub mod projects;
pub mod users;
