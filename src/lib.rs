#![doc = "The `classforge` library crate."]
#![doc = ""]
#![doc = "Domain models, JWT authentication with role gating, referential guards,"]
#![doc = "routing configuration and error handling for the ClassForge academic"]
#![doc = "project and task service. The binary (`main.rs`) wires these into an"]
#![doc = "`actix-web` server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod models;
pub mod routes;
pub mod validation;

pub use crate::error::AppError;
