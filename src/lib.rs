#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Credential management and token issuance, owner-scoped task persistence"]
#![doc = "with filtered queries, and the actix-web boundary exposing both. The"]
#![doc = "binary (`main.rs`) composes these pieces over a Postgres pool."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod tasks;

pub use crate::auth::AuthService;
pub use crate::error::{AppError, AppResult};
pub use crate::tasks::TaskService;
