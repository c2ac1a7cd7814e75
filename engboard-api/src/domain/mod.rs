pub mod aggregation;
pub mod board;
mod clock;
mod error;
pub mod models;
mod policy;
pub mod ports;
pub mod services;
mod session;

pub use clock::*;
pub use error::*;
pub use policy::*;
pub use session::*;
