pub mod auth;
pub mod campaign;
pub mod lead;
pub mod project;
pub mod token;
pub mod user;
