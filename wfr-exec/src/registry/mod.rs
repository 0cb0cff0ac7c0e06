mod client;
mod error;
mod hit;
mod provider;
mod version;

pub use client::RegistryClient;
pub use error::{HitRejection, RegistryError};
pub use provider::{Provider, ServiceTable};
