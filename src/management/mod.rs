//! # Entity Management
//!
//! The reusable list/detail pattern behind every admin screen, split into
//! four controllers and composed by [`EntityManager`]:
//!
//! ```text
//! EntityManager
//!   ├── QueryController      search, filters, sort, page → view over the cache
//!   ├── DataGateway          list/fetch/create/update/delete + cache
//!   ├── FormController       draft, coercion, validation, wire mapping
//!   └── SelectionController  selected ids, bulk delete
//! ```
//!
//! [`LocalStore`] is the JSON-file collection store used in offline mode and
//! by the mock backend.

mod form;
mod gateway;
mod manager;
mod query;
mod selection;
mod store;

pub use form::{Draft, FieldValue, FormController};
pub use gateway::DataGateway;
pub use manager::{EntityManager, Paging};
pub use query::{ALL, QueryController, compare_entities, matches_filters, matches_search};
pub use selection::{BulkDeleteReport, SelectionController};
pub use store::LocalStore;
