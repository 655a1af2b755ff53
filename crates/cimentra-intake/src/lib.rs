//! The intake pipeline: one inbound message becomes one project row.
//!
//! Data flows strictly linearly: extraction → date normalization → entity
//! resolution → persistence. Nothing retries, nothing runs concurrently
//! within a run, and no state survives between runs. Every step returns an
//! explicit [`IntakeError`] variant so the outbound adapters can pick the
//! right user-facing message instead of collapsing everything into one
//! generic failure.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use cimentra_ai::{ExtractError, Extractor};
use cimentra_core::{
    match_client, match_locality, normalize_dates, parse_iso_date, ExtractedFields,
    ExtractionRequest, NewProject, Project, ReferencePeriod,
};
use cimentra_store::{ProjectStore, StoreError};

/// Name persisted when the model extracted none.
pub const PLACEHOLDER_NAME: &str = "Proyecto sin nombre";

#[derive(Debug, Error)]
pub enum IntakeError {
    /// A required inbound parameter is absent. Rejected before any model
    /// call.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Strict policy only: the model omitted a field the endpoint requires.
    #[error("extraction is missing required field: {0}")]
    MissingField(&'static str),

    /// Strict policy only: a model-produced date string is not ISO.
    #[error("invalid {field} date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    /// The model answered, but not with JSON.
    #[error("model output could not be parsed: {0}")]
    ExtractionParse(#[source] serde_json::Error),

    /// The model call itself failed (network, server error, empty reply).
    #[error("extraction failed: {0}")]
    Processing(#[source] ExtractError),

    /// The project insert failed. Atomic at the store, so no cleanup.
    #[error("failed to persist project: {0}")]
    Persistence(#[from] StoreError),
}

/// Validation policy and prompt anchoring for one pipeline instance.
///
/// The two endpoint variants of the original system (strict-required-fields
/// vs optional-fields) are a single flag here, not duplicated pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Strict policy: name, locality, client, and start date must all be
    /// extracted, and any date string must parse.
    pub require_all_fields: bool,
    /// Prompt anchor for relative dates. `None` derives the period from the
    /// clock at request time.
    pub reference_period: Option<ReferencePeriod>,
}

/// Extraction-only result for the `parse-intent` endpoint: extracted text
/// fields, normalized dates, and the original message echoed back.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedIntent {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "localidad")]
    pub locality: Option<String>,
    #[serde(rename = "cliente")]
    pub client_name: Option<String>,
    #[serde(rename = "fecha_inicio")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "fecha_fin")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "mensaje_original")]
    pub original_message: String,
}

/// The pipeline with its injected collaborators. One instance serves many
/// requests; each run is independent.
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn ProjectStore>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        store: Arc<dyn ProjectStore>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            extractor,
            store,
            options,
        }
    }

    fn period(&self) -> ReferencePeriod {
        self.options
            .reference_period
            .unwrap_or_else(|| ReferencePeriod::from_date(Utc::now().date_naive()))
    }

    async fn extract(&self, message: &str) -> Result<ExtractedFields, IntakeError> {
        let result = self.extractor.extract(message, self.period()).await;
        match result {
            Ok(fields) => Ok(fields),
            Err(ExtractError::Parse(err)) => {
                warn!(error = %err, "model output was not valid JSON");
                Err(IntakeError::ExtractionParse(err))
            }
            Err(err) => {
                warn!(error = %err, "model call failed");
                Err(IntakeError::Processing(err))
            }
        }
    }

    /// Parse one date field under the active policy: strict aborts on a bad
    /// string, lenient degrades it to "not mentioned".
    fn parse_date(
        &self,
        field: &'static str,
        value: Option<&str>,
    ) -> Result<Option<NaiveDate>, IntakeError> {
        let Some(raw) = value else { return Ok(None) };
        match parse_iso_date(raw) {
            Some(date) => Ok(Some(date)),
            None if self.options.require_all_fields => Err(IntakeError::InvalidDate {
                field,
                value: raw.to_string(),
            }),
            None => {
                warn!(field = %field, value = %raw, "unparseable date dropped");
                Ok(None)
            }
        }
    }

    fn check_required(&self, fields: &ExtractedFields) -> Result<(), IntakeError> {
        if !self.options.require_all_fields {
            return Ok(());
        }
        if fields.name.is_none() {
            return Err(IntakeError::MissingField("nombre"));
        }
        if fields.locality.is_none() {
            return Err(IntakeError::MissingField("localidad"));
        }
        if fields.client_name.is_none() {
            return Err(IntakeError::MissingField("cliente"));
        }
        if fields.start_date.is_none() {
            return Err(IntakeError::MissingField("fecha_inicio"));
        }
        Ok(())
    }

    /// Extraction and date normalization only; no store access. Backs the
    /// `parse-intent` endpoint.
    pub async fn parse_intent(&self, message: &str) -> Result<ParsedIntent, IntakeError> {
        if message.trim().is_empty() {
            return Err(IntakeError::MissingParameter("mensaje"));
        }

        let fields = self.extract(message).await?;
        let start = self.parse_date("fecha_inicio", fields.start_date.as_deref())?;
        let end = self.parse_date("fecha_fin", fields.end_date.as_deref())?;
        let (start, end) = normalize_dates(start, end);

        Ok(ParsedIntent {
            name: fields.name,
            locality: fields.locality,
            client_name: fields.client_name,
            start_date: start,
            end_date: end,
            original_message: message.to_string(),
        })
    }

    /// The full run: extract, normalize, resolve, persist. Returns the
    /// created row with its generated id.
    pub async fn create_project(&self, request: ExtractionRequest) -> Result<Project, IntakeError> {
        if request.message.trim().is_empty() {
            return Err(IntakeError::MissingParameter("mensaje"));
        }
        if request.requested_by.trim().is_empty() {
            return Err(IntakeError::MissingParameter("created_by"));
        }

        let fields = self.extract(&request.message).await?;
        self.check_required(&fields)?;

        let start = self.parse_date("fecha_inicio", fields.start_date.as_deref())?;
        let end = self.parse_date("fecha_fin", fields.end_date.as_deref())?;
        let (start, end) = normalize_dates(start, end);

        // Unresolved references are nulls, never errors: a project can be
        // created before its client is registered.
        let client_id = match fields.client_name.as_deref() {
            Some(query) => {
                let clients = self.store.list_clients().await?;
                match_client(&clients, query).map(|c| c.id)
            }
            None => None,
        };

        // Locality and region resolve together: region comes only from the
        // matched locality row.
        let (locality_id, region_id) = match fields.locality.as_deref() {
            Some(query) => {
                let localities = self.store.list_localities().await?;
                match match_locality(&localities, query) {
                    Some(l) => (Some(l.id), Some(l.region_id)),
                    None => (None, None),
                }
            }
            None => (None, None),
        };

        let new = NewProject {
            name: fields.name.unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
            start_date: start,
            end_date: end,
            client_id,
            locality_id,
            region_id,
            street: String::new(),
            type_id: None,
            budget_id: None,
            active: true,
            created_by: request.requested_by,
        };

        let project = self.store.insert_project(&new).await?;
        info!(
            id = project.id,
            name = %project.name,
            client_id = ?project.client_id,
            locality_id = ?project.locality_id,
            "project created from message"
        );
        Ok(project)
    }
}
