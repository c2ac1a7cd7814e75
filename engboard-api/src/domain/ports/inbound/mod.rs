mod board;
mod dashboard;
mod directory;
mod session;
mod time_log;

pub use board::*;
pub use dashboard::*;
pub use directory::*;
pub use session::*;
pub use time_log::*;
