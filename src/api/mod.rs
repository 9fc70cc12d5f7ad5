//! Personas físicas backend integration.
//!
//! Provides the REST client, the observable store, and the record model.

pub mod client;
pub mod error;
pub mod models;
pub mod store;

pub use client::PersonasClient;
pub use error::ApiError;
pub use models::{NewPersonaFisica, PersonaFisica};
pub use store::{PersonasBackend, PersonasStore};
