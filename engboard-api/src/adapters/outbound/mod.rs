pub mod memory;
pub mod restbase;
