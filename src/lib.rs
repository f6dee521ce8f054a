pub mod auth;
pub mod backup;
pub mod bridge;
pub mod codes;
pub mod config;
pub mod csv_io;
pub mod db;
pub mod dialog;
pub mod error;
pub mod invoice;
pub mod models;
pub mod schema;

pub use bridge::App;
pub use error::{AppError, AppResult};
