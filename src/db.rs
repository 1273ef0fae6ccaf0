pub mod campaign_repo;
pub use campaign_repo::CampaignRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod token_repo;
pub use token_repo::TokenRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
