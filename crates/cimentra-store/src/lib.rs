//! Storage layer: the `ProjectStore` seam, a PostgREST-backed
//! implementation, and an in-memory store for tests.

mod error;
mod memory;
mod rest;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use cimentra_core::{Client, Locality, NewProject, Project};

/// External-store operations the pipeline needs: two full-table reads and a
/// single-row insert. The resolver scans client-side, so the reads return
/// whole tables by design.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError>;
    async fn list_localities(&self) -> Result<Vec<Locality>, StoreError>;
    /// Insert one project row and return it with its generated id.
    async fn insert_project(&self, new: &NewProject) -> Result<Project, StoreError>;
}
