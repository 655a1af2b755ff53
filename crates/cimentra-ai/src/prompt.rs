//! Prompt construction for the extraction call.

use cimentra_core::ReferencePeriod;

/// Fixed system instruction: the exact JSON keys the model may return, the
/// ISO date format, and the reference period relative dates resolve against.
/// The message text is the sole user turn.
pub fn system_prompt(period: &ReferencePeriod) -> String {
    format!(
        "Eres un asistente que extrae datos para creación de proyectos de construcción. \
Devuelve un JSON con posibles claves: \
{{\"nombre\": \"\", \"localidad\": \"\", \"cliente\": \"\", \"fecha_inicio\": \"\", \"fecha_fin\": \"\"}}. \
No todas son obligatorias. Si no se menciona alguna, simplemente omítela. \
Fechas en formato ISO (YYYY-MM-DD), asume {period} como contexto. \
No expliques nada, responde solo el JSON."
    )
}

pub fn user_message(message: &str) -> String {
    format!("Mensaje: \"{message}\"")
}
