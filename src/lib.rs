pub mod cli;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod json_compare;
pub mod keymaps;
pub mod migration;
pub mod model;
pub mod schema;

pub use error::KeyMapperError;
