//! Common utilities and shared types for shipreg-notify.
//!
//! This crate provides foundational components used across all
//! shipreg-notify crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Session context**: [`CurrentUser`] and [`UserRole`]
//!
//! # Example
//!
//! ```no_run
//! use shipreg_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {id}");
//!     let _ = config.notifications.page_limit;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod user;

pub use config::{Config, DatabaseConfig, NotificationConfig, RedisConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use user::{CurrentUser, UserRole};
