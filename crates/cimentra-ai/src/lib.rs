//! Language-model extraction: one chat completion per inbound message turns
//! free text into [`ExtractedFields`].

mod chat;
mod parse;
mod prompt;

pub use chat::{ChatClient, ExtractError};
pub use parse::{parse_fields, strip_code_fences};
pub use prompt::{system_prompt, user_message};

use async_trait::async_trait;
use cimentra_core::{ExtractedFields, ReferencePeriod};

/// Seam between the pipeline and the hosted model, so tests can inject a
/// fake that never touches the network.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract candidate project fields from one message, interpreting
    /// relative dates under `period`.
    async fn extract(
        &self,
        message: &str,
        period: ReferencePeriod,
    ) -> Result<ExtractedFields, ExtractError>;
}
