//! Domain types shared across the intake pipeline.
//!
//! Wire names follow the Spanish column/key names of the backing store and
//! the extraction prompt (`nombre`, `fecha_inicio`, `id_provincia`, ...);
//! field names stay English via serde renames.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered client, read from the `cliente` table. Never written by the
/// intake pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
}

impl Client {
    /// Display string used for substring matching: `"first_name last_name"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A locality row from the `localidades` table, carrying its parent region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Locality {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "id_provincia")]
    pub region_id: i64,
}

/// A persisted project row from the `proyecto` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "fecha_inicio")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "fecha_fin")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "id_cliente")]
    pub client_id: Option<i64>,
    #[serde(rename = "id_localidad")]
    pub locality_id: Option<i64>,
    #[serde(rename = "id_provincia")]
    pub region_id: Option<i64>,
    #[serde(rename = "calle")]
    pub street: String,
    #[serde(rename = "id_tipo")]
    pub type_id: Option<i64>,
    #[serde(rename = "id_presupuesto")]
    pub budget_id: Option<i64>,
    #[serde(rename = "activo")]
    pub active: bool,
    pub created_by: String,
}

/// Insert payload for a new project. Same columns as [`Project`] minus the
/// generated `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "fecha_inicio")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "fecha_fin")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "id_cliente")]
    pub client_id: Option<i64>,
    #[serde(rename = "id_localidad")]
    pub locality_id: Option<i64>,
    #[serde(rename = "id_provincia")]
    pub region_id: Option<i64>,
    #[serde(rename = "calle")]
    pub street: String,
    #[serde(rename = "id_tipo")]
    pub type_id: Option<i64>,
    #[serde(rename = "id_presupuesto")]
    pub budget_id: Option<i64>,
    #[serde(rename = "activo")]
    pub active: bool,
    pub created_by: String,
}

/// Candidate fields extracted by the language model. Every key is optional:
/// the model omits whatever the message does not mention. Unknown keys are
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "localidad", skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(rename = "cliente", skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(rename = "fecha_inicio", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "fecha_fin", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// One inbound intake call, normalized from either the JSON or the webhook
/// adapter. Not persisted; discarded once the pipeline completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "created_by")]
    pub requested_by: String,
}
