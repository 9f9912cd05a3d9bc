//! HTTP request handlers
//!
//! One module per resource. Handlers stay thin: extract, validate, call into
//! `db`/`analytics`/`classifier`, map to a JSON response. Identity comes from
//! the [`crate::auth::UserId`] extractor; handlers without it are public.

pub mod analytics;
pub mod community;
pub mod dashboard;
pub mod feedback;
pub mod health;
pub mod pets;
pub mod predict;
pub mod preferences;
pub mod scans;
pub mod searches;
pub mod users;
pub mod vaccinations;
