//! HTTP adapters for the intake pipeline.
//!
//! Two inbound shapes: direct JSON calls (`parse-intent`,
//! `proyecto-from-mensaje`) and the messaging-bot webhook
//! (`proyecto-from-mensaje-via-bot`, URL-encoded `Body`/`From`). The bot
//! transport expects an XML reply envelope and HTTP 200 even when project
//! creation failed; transport-level errors are reserved for true surprises.
//!
//! Errors are logged here with full detail and mapped to fixed,
//! non-sensitive messages for callers.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use cimentra_core::{ExtractionRequest, Project};
use cimentra_intake::{IntakeError, Pipeline};

pub struct AppState {
    pub pipeline: Pipeline,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/parse-intent", post(parse_intent))
        .route("/api/proyecto-from-mensaje", post(project_from_message))
        .route(
            "/api/proyecto-from-mensaje-via-bot",
            post(project_from_message_via_bot),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ParseIntentRequest {
    #[serde(default)]
    pub mensaje: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFromMessageRequest {
    #[serde(default)]
    pub mensaje: String,
    #[serde(default)]
    pub created_by: String,
}

/// URL-encoded webhook payload from the messaging transport.
#[derive(Debug, Deserialize)]
pub struct BotWebhook {
    /// Message text.
    #[serde(rename = "Body", default)]
    pub body: String,
    /// Sender identifier, e.g. `whatsapp:+5493511234567`.
    #[serde(rename = "From", default)]
    pub from: String,
}

#[derive(Serialize)]
struct CreatedResponse {
    mensaje: &'static str,
    proyecto: Project,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Map a pipeline error to the status and fixed caller-facing message for
/// the JSON endpoints. Diagnostic detail stays in the server log.
pub fn error_response(err: &IntakeError) -> (StatusCode, &'static str) {
    match err {
        IntakeError::MissingParameter(_) => (StatusCode::BAD_REQUEST, "Faltan datos obligatorios"),
        IntakeError::MissingField(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Faltan campos obligatorios en el mensaje",
        ),
        IntakeError::InvalidDate { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "Fecha inválida en el mensaje")
        }
        IntakeError::ExtractionParse(_) | IntakeError::Processing(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error al procesar el mensaje",
        ),
        IntakeError::Persistence(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "No se pudo crear el proyecto",
        ),
    }
}

/// Derive the audit identity for bot-originated requests: fixed `bot-`
/// prefix plus the sender with its channel prefix stripped.
pub fn bot_requested_by(from: &str) -> String {
    format!("bot-{}", from.replace("whatsapp:", ""))
}

/// Wrap one sentence in the reply envelope the messaging transport expects.
pub fn xml_reply(message: &str) -> String {
    format!(
        "<Response><Message>{}</Message></Response>",
        xml_escape(message)
    )
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn parse_intent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ParseIntentRequest>,
) -> Response {
    match state.pipeline.parse_intent(&request.mensaje).await {
        Ok(intent) => (StatusCode::OK, Json(intent)).into_response(),
        Err(err) => {
            error!(error = %err, "parse-intent failed");
            let (status, message) = error_response(&err);
            (status, Json(ErrorBody { error: message })).into_response()
        }
    }
}

async fn project_from_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateFromMessageRequest>,
) -> Response {
    let request = ExtractionRequest {
        message: request.mensaje,
        requested_by: request.created_by,
    };
    match state.pipeline.create_project(request).await {
        Ok(proyecto) => (
            StatusCode::OK,
            Json(CreatedResponse {
                mensaje: "Proyecto creado con éxito",
                proyecto,
            }),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "proyecto-from-mensaje failed");
            let (status, message) = error_response(&err);
            (status, Json(ErrorBody { error: message })).into_response()
        }
    }
}

async fn project_from_message_via_bot(
    State(state): State<Arc<AppState>>,
    Form(webhook): Form<BotWebhook>,
) -> Response {
    if webhook.body.trim().is_empty() || webhook.from.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing parameters").into_response();
    }

    let request = ExtractionRequest {
        message: webhook.body,
        requested_by: bot_requested_by(&webhook.from),
    };
    let sentence = match state.pipeline.create_project(request).await {
        Ok(proyecto) => format!("✅ Proyecto \"{}\" creado correctamente.", proyecto.name),
        Err(err) => {
            error!(error = %err, "bot intake failed");
            "⚠️ Hubo un error al crear el proyecto.".to_string()
        }
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        xml_reply(&sentence),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cimentra_ai::{ExtractError, Extractor};
    use cimentra_core::{Client, ExtractedFields, Locality, ReferencePeriod};
    use cimentra_intake::PipelineOptions;
    use cimentra_store::{MemoryStore, StoreError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeExtractor {
        json: &'static str,
        calls: AtomicUsize,
    }

    impl FakeExtractor {
        fn returning(json: &'static str) -> Arc<Self> {
            Arc::new(Self {
                json,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Extractor for FakeExtractor {
        async fn extract(
            &self,
            _message: &str,
            _period: ReferencePeriod,
        ) -> Result<ExtractedFields, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            serde_json::from_str(self.json).map_err(ExtractError::Parse)
        }
    }

    fn state(extractor: Arc<FakeExtractor>) -> Arc<AppState> {
        let store = Arc::new(MemoryStore::new(
            vec![Client {
                id: 7,
                first_name: "Arq.".into(),
                last_name: "Gómez".into(),
            }],
            vec![Locality {
                id: 11,
                name: "Córdoba".into(),
                region_id: 5,
            }],
        ));
        Arc::new(AppState {
            pipeline: Pipeline::new(extractor, store, PipelineOptions::default()),
        })
    }

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn project_from_message_returns_created_project() {
        let extractor = FakeExtractor::returning(
            r#"{"nombre": "Edificio Libertador", "localidad": "Córdoba", "cliente": "Gómez"}"#,
        );
        let response = project_from_message(
            State(state(extractor)),
            Json(CreateFromMessageRequest {
                mensaje: "Crear proyecto en Córdoba para el cliente Gómez".into(),
                created_by: "user-1".into(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_of(response).await).unwrap();
        assert_eq!(body["mensaje"], "Proyecto creado con éxito");
        assert_eq!(body["proyecto"]["nombre"], "Edificio Libertador");
        assert_eq!(body["proyecto"]["id_cliente"], 7);
        assert_eq!(body["proyecto"]["id_provincia"], 5);
        assert_eq!(body["proyecto"]["activo"], true);
    }

    #[tokio::test]
    async fn project_from_message_requires_both_parameters() {
        let extractor = FakeExtractor::returning("{}");
        let response = project_from_message(
            State(state(extractor.clone())),
            Json(CreateFromMessageRequest {
                mensaje: "obra".into(),
                created_by: String::new(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert!(body.contains("Faltan datos obligatorios"));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn parse_intent_echoes_original_message() {
        let extractor = FakeExtractor::returning(
            r#"{"nombre": "Obra Norte", "fecha_inicio": "2025-11-10", "fecha_fin": "2025-02-01"}"#,
        );
        let response = parse_intent(
            State(state(extractor)),
            Json(ParseIntentRequest {
                mensaje: "Obra de noviembre a febrero".into(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_of(response).await).unwrap();
        assert_eq!(body["nombre"], "Obra Norte");
        assert_eq!(body["fecha_inicio"], "2025-11-10");
        // Rolled over one year.
        assert_eq!(body["fecha_fin"], "2026-02-01");
        assert_eq!(body["mensaje_original"], "Obra de noviembre a febrero");
    }

    #[tokio::test]
    async fn bot_webhook_replies_with_xml_success() {
        let extractor = FakeExtractor::returning(r#"{"nombre": "Obra Sur"}"#);
        let response = project_from_message_via_bot(
            State(state(extractor)),
            Form(BotWebhook {
                body: "Crear proyecto Obra Sur".into(),
                from: "whatsapp:+5493511234567".into(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap(),
            "application/xml"
        );
        let body = body_of(response).await;
        assert_eq!(
            body,
            "<Response><Message>✅ Proyecto \"Obra Sur\" creado correctamente.</Message></Response>"
        );
    }

    #[tokio::test]
    async fn bot_webhook_rejects_empty_body_without_model_call() {
        let extractor = FakeExtractor::returning("{}");
        let response = project_from_message_via_bot(
            State(state(extractor.clone())),
            Form(BotWebhook {
                body: String::new(),
                from: "bot:+123".into(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await, "Missing parameters");
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bot_webhook_reports_failure_with_http_200() {
        // Extractor that returns prose: extraction parse failure inside the
        // pipeline, still a 200 + error sentence for the transport.
        let extractor = FakeExtractor::returning("no soy json");
        let response = project_from_message_via_bot(
            State(state(extractor)),
            Form(BotWebhook {
                body: "Crear proyecto".into(),
                from: "whatsapp:+123".into(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        assert!(body.contains("⚠️ Hubo un error al crear el proyecto."));
    }

    #[tokio::test]
    async fn webhook_field_names_match_transport() {
        let webhook: BotWebhook = serde_json::from_value(serde_json::json!({
            "Body": "Crear proyecto",
            "From": "whatsapp:+5493511234567"
        }))
        .unwrap();
        assert_eq!(webhook.body, "Crear proyecto");
        assert_eq!(webhook.from, "whatsapp:+5493511234567");

        let defaulted: BotWebhook = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(defaulted.body.is_empty());
        assert!(defaulted.from.is_empty());
    }

    #[test]
    fn requested_by_strips_channel_prefix() {
        assert_eq!(
            bot_requested_by("whatsapp:+5493511234567"),
            "bot-+5493511234567"
        );
        assert_eq!(bot_requested_by("+123"), "bot-+123");
    }

    #[test]
    fn xml_reply_escapes_markup() {
        assert_eq!(
            xml_reply("a < b & c"),
            "<Response><Message>a &lt; b &amp; c</Message></Response>"
        );
    }

    #[test]
    fn error_mapping_distinguishes_failure_kinds() {
        let missing = IntakeError::MissingParameter("mensaje");
        assert_eq!(
            error_response(&missing),
            (StatusCode::BAD_REQUEST, "Faltan datos obligatorios")
        );

        let parse_err = serde_json::from_str::<ExtractedFields>("x").unwrap_err();
        let extraction = IntakeError::ExtractionParse(parse_err);
        assert_eq!(
            error_response(&extraction),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al procesar el mensaje"
            )
        );

        let persistence = IntakeError::Persistence(StoreError::NoRows);
        assert_eq!(
            error_response(&persistence),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "No se pudo crear el proyecto"
            )
        );

        let field = IntakeError::MissingField("localidad");
        assert_eq!(error_response(&field).0, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
