//! In-memory [`ProjectStore`] for pipeline and adapter tests.

use std::sync::Mutex;

use async_trait::async_trait;
use cimentra_core::{Client, Locality, NewProject, Project};

use crate::{ProjectStore, StoreError};

/// Seedable store backed by plain vectors. Inserted projects get a
/// monotonically increasing id starting at 1.
#[derive(Default)]
pub struct MemoryStore {
    clients: Vec<Client>,
    localities: Vec<Locality>,
    projects: Mutex<Vec<Project>>,
}

impl MemoryStore {
    pub fn new(clients: Vec<Client>, localities: Vec<Locality>) -> Self {
        Self {
            clients,
            localities,
            projects: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything inserted so far.
    pub fn projects(&self) -> Vec<Project> {
        self.projects.lock().expect("store lock poisoned").clone()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        Ok(self.clients.clone())
    }

    async fn list_localities(&self) -> Result<Vec<Locality>, StoreError> {
        Ok(self.localities.clone())
    }

    async fn insert_project(&self, new: &NewProject) -> Result<Project, StoreError> {
        let mut projects = self.projects.lock().expect("store lock poisoned");
        let project = Project {
            id: projects.len() as i64 + 1,
            name: new.name.clone(),
            start_date: new.start_date,
            end_date: new.end_date,
            client_id: new.client_id,
            locality_id: new.locality_id,
            region_id: new.region_id,
            street: new.street.clone(),
            type_id: new.type_id,
            budget_id: new.budget_id,
            active: new.active,
            created_by: new.created_by.clone(),
        };
        projects.push(project.clone());
        Ok(project)
    }
}
