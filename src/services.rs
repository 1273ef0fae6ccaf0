pub mod auth;
pub mod campaign_service;
pub mod email_service;
pub mod lead_service;
pub mod project_service;
pub mod token_service;
pub mod user_service;
