//! Learning-Platform Administration Library
//!
//! This library provides the building blocks of the `lmsadm` command-line
//! client: a generic entity manager that lists, searches, filters, edits and
//! deletes the records of a learning-management and e-commerce platform
//! (users, courses, exams, quizzes, news, coupons, products, orders and media
//! assets) against a remote REST collection or a local offline store.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local mock backend
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types shared by the gateway, forms and local store
//! - `management` - Query, gateway, form and selection controllers
//! - `remote` - Remote collection clients (HTTP and offline)
//! - `schema` - Per-entity schemas (fields, required fields, filters)
//! - `server` - Local HTTP server for the mock backend
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use lmsadm::{config, management::EntityManager, remote::LocalRemote, schema::EntityKind};
//!
//! #[tokio::main]
//! async fn main() -> lmsadm::Res<()> {
//!     config::load_env().await?;
//!     let remote = LocalRemote::open(config::data_dir());
//!     let mut courses = EntityManager::new(EntityKind::Course, remote, config::page_size());
//!     courses.refresh().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod remote;
pub mod schema;
pub mod server;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the command-line glue where errors of several modules meet and
/// only need to be reported. Library modules return their own error types
/// from [`error`].
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Loading {} courses...", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Used to confirm that a write against the remote collection was accepted.
///
/// # Example
///
/// ```
/// success!("Created course {}", id);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the command-line layer uses this macro. Library code returns errors
/// instead of terminating.
///
/// # Example
///
/// ```
/// error!("Cannot load environment. Err: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Delete of {} failed: {}", id, e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a dimmed diagnostic line to stderr when `LMSADM_DEBUG` is set.
///
/// Request lines of the gateway and the mock server go through this macro so
/// they stay out of regular command output.
///
/// # Example
///
/// ```
/// debug!("GET {}", url);
/// ```
#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => ({
    if $crate::config::debug_enabled() {
      use colored::Colorize;
      eprintln!("[{}] {}", "~".dimmed(), std::format!($($arg)*).dimmed());
    }
  })
}
