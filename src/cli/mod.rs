//! # CLI Module
//!
//! User-facing commands of `lmsadm`. Every entity command builds an
//! [`EntityManager`](crate::management::EntityManager) for the requested
//! entity type over the selected remote and drives it the way an admin
//! screen would: set the query, refresh, then act on the view, a form or
//! the selection.
//!
//! ```text
//! CLI (tables, spinners, messages)
//!     ↓
//! EntityManager (query, form, selection)
//!     ↓
//! DataGateway (cache)
//!     ↓
//! Remote (HTTP API or local store)
//! ```
//!
//! Failures end the process through [`error!`](crate::error) with a one-line
//! message. A partially failed bulk delete is reported per id and only
//! warned about.
//!
//! ## Usage
//!
//! ```bash
//! lmsadm list course --search rust --filter status=published --sort price:desc
//! lmsadm create course --set title="Rust 101" --set category=programming
//! lmsadm update user 42 --set name="Ada Lovelace" --upload avatar=./ada.png
//! lmsadm bulk-delete coupon 3 7 9
//! lmsadm --offline serve
//! ```

mod display;
mod entities;
mod serve;

pub use entities::{QueryOptions, bulk_delete, create, delete, list, show, update};
pub use serve::serve;

use crate::{
    config, debug,
    remote::{HttpRemote, LocalRemote, Remote},
};

/// Picks the remote for this run: the local store when offline mode is
/// requested or no API URL is configured, the HTTP API otherwise.
pub fn connect(offline: bool) -> Box<dyn Remote> {
    if !offline && !config::offline() {
        if let Some(remote) = HttpRemote::from_config() {
            debug!("using API at {}", remote.base_url());
            return Box::new(remote);
        }
    }
    let dir = config::data_dir();
    debug!("using local store at {}", dir.display());
    Box::new(LocalRemote::open(dir))
}
