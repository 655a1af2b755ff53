//! PostgREST (Supabase-style) implementation of [`ProjectStore`].

use async_trait::async_trait;
use cimentra_core::{Client, Locality, NewProject, Project};
use tracing::info;

use crate::{ProjectStore, StoreError};

/// HTTP store speaking PostgREST conventions: `GET /rest/v1/{table}` for
/// reads, `POST` with `Prefer: return=representation` for the insert so the
/// created row (with generated id) comes back in the response body.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    /// `base_url` should be like `https://xyz.supabase.co` (no trailing
    /// slash). `service_key` is sent as both `apikey` and bearer token.
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    async fn fetch_table<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}?select={select}", self.table_url(table));

        info!(url = %url, "reading table");
        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<T> = resp.json().await?;
        info!(table = %table, count = rows.len(), "table read");
        Ok(rows)
    }
}

#[async_trait]
impl ProjectStore for RestStore {
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        self.fetch_table("cliente", "id,nombre,apellido").await
    }

    async fn list_localities(&self) -> Result<Vec<Locality>, StoreError> {
        self.fetch_table("localidades", "id,nombre,id_provincia").await
    }

    async fn insert_project(&self, new: &NewProject) -> Result<Project, StoreError> {
        let url = self.table_url("proyecto");

        info!(url = %url, name = %new.name, "inserting project");
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=representation")
            .json(&[new])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }

        // PostgREST returns the inserted rows as an array.
        let mut rows: Vec<Project> = resp.json().await?;
        if rows.is_empty() {
            return Err(StoreError::NoRows);
        }
        let project = rows.remove(0);
        info!(id = project.id, "project inserted");
        Ok(project)
    }
}
