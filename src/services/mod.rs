pub mod catalog;
pub mod metadata;
pub mod preference;
pub mod selector;
pub mod session;
pub mod session_manager;
pub mod session_store;
pub mod similarity;

pub use catalog::{Catalog, CatalogLoadError, CatalogOptions};
pub use metadata::MovieMetadata;
pub use session::{DegeneratePolicy, Session, SessionSettings};
pub use session_manager::SessionManager;
pub use session_store::{InMemorySessionStore, SessionStore};
