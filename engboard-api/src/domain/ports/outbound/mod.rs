mod auth_provider;
mod directory_store;
mod hour_entry_store;
mod task_store;

pub use auth_provider::*;
pub use directory_store::*;
pub use hour_entry_store::*;
pub use task_store::*;
