mod allocation;
mod client;
mod engineer;
mod filter;
mod hour_entry;
mod ids;
mod profile;
mod project;
mod task;
mod views;

pub use allocation::*;
pub use client::*;
pub use engineer::*;
pub use filter::*;
pub use hour_entry::*;
pub use ids::*;
pub use profile::*;
pub use project::*;
pub use task::*;
pub use views::*;
