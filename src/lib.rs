pub mod auth;
pub mod config;
pub mod csrf;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod validators;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};
