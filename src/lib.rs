pub mod config;
pub mod error;
pub mod format;
pub mod i18n;
pub mod models;
pub mod services;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::notifications::NotificationSystem;
