pub mod app;
pub mod auth_handlers;
pub mod config;
pub mod extract;
pub mod ids;
pub mod meal_plan_handlers;
pub mod metrics;
pub mod models;
pub mod store;
pub mod student_handlers;
pub mod user_handlers;

pub use app::{router, AppState};
