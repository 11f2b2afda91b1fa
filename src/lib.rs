pub mod award;
pub mod catalog;
pub mod session;
pub mod settings;
pub mod station;
pub mod symbols;
pub mod trigger;
mod utils;

pub use utils::logging::init_logging;
