#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_service;
pub mod stats;

pub use progress_core::Clock;

pub use app_services::{AppServices, AppServicesError};
pub use error::ProgressServiceError;
pub use progress_service::ProgressService;
pub use stats::ProgressStats;
