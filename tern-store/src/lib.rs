pub mod app_config;
pub mod database;
pub mod travel_repo;

pub use database::DbClient;
pub use travel_repo::SqliteTravelStore;
