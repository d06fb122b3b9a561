pub mod allocator;
pub mod config;
pub mod enrich;
pub mod error;
pub mod import;
pub mod io;
pub mod lifecycle;
pub mod model;
pub mod paths;
pub mod recorder;
pub mod render;
pub mod report;
pub mod scheduler;
pub mod sender;
pub mod store;
pub mod types;

pub use error::{LeadgenError, Result};
