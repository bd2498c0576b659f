//! Posturator: a posture-support eligibility questionnaire with its account
//! session and product catalog.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod questionnaire;
pub mod telemetry;

pub use error::AppError;
