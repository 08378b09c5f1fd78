pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod page;
pub mod render;
pub mod view;

pub use error::{Error, Result};
