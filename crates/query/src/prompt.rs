use crate::intent::QueryIntent;

pub fn system_prompt(intent: &QueryIntent) -> &'static str {
    match intent {
        QueryIntent::ProjectInfo { .. } => {
            "Eres un experto en proyectos de investigación mexicanos. Analiza documentos \
             oficiales y extrae información precisa. Responde en español con claridad."
        }
        QueryIntent::Verify { .. } => {
            "Eres un verificador de hechos basado en documentos. Determina la veracidad \
             usando solo evidencia documental."
        }
        QueryIntent::FindDocuments { .. } => {
            "Eres un buscador experto en documentos oficiales."
        }
        QueryIntent::CategoryListing(_) | QueryIntent::General => {
            "Eres un asistente que responde preguntas usando únicamente la información \
             extraída de comunicados oficiales. Responde en español."
        }
    }
}

/// Build the user prompt for one intent: the persisted context block plus
/// intent-specific instructions, ending with the user's own question.
pub fn user_prompt(intent: &QueryIntent, question: &str, context: &str) -> String {
    match intent {
        QueryIntent::ProjectInfo { name } => format!(
            r#"Informa sobre este proyecto a partir del contexto.

PROYECTO: {name}

CONTEXTO:
{context}

INSTRUCCIONES:
1. Enfócate exclusivamente en el proyecto "{name}"
2. Organiza la respuesta en: descripción, objetivo, instituciones participantes, estado actual
3. Para cada dato, cita el documento exacto
4. Si algún aspecto no aparece en el contexto, indica "No se menciona"

PREGUNTA ORIGINAL: {question}"#
        ),
        QueryIntent::Verify { claim } => format!(
            r#"Verifica esta afirmación usando únicamente el contexto.

AFIRMACIÓN: "{claim}"

CONTEXTO:
{context}

INSTRUCCIONES:
1. Clasifica la afirmación como VERDADERA, FALSA, NO CONCLUYENTE o PARCIALMENTE VERDADERA
2. Cita la evidencia y el documento que la respalda o refuta
3. Si la evidencia es insuficiente, dilo explícitamente

PREGUNTA ORIGINAL: {question}"#
        ),
        QueryIntent::FindDocuments { needle } => format!(
            r#"Encuentra en qué documentos aparece esta información.

BÚSQUEDA: "{needle}"

CONTEXTO:
{context}

INSTRUCCIONES:
1. Lista los documentos donde aparece, ordenados por relevancia
2. Para cada documento, resume brevemente la mención
3. Si no aparece en ningún documento del contexto, dilo explícitamente

PREGUNTA ORIGINAL: {question}"#
        ),
        QueryIntent::CategoryListing(_) | QueryIntent::General => format!(
            r#"CONTEXTO:
{context}

PREGUNTA: {question}

INSTRUCCIONES:
- Responde usando únicamente la información del contexto
- Sé específico y cita los documentos relevantes
- Si el contexto no contiene información suficiente, dilo
- Mantén la respuesta concisa y factual"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_embed_context_and_question() {
        let intents = [
            QueryIntent::ProjectInfo {
                name: "kutsari".to_string(),
            },
            QueryIntent::Verify {
                claim: "kutsari trata sobre petróleo".to_string(),
            },
            QueryIntent::FindDocuments {
                needle: "ipn".to_string(),
            },
            QueryIntent::General,
        ];

        for intent in intents {
            let prompt = user_prompt(&intent, "la pregunta original", "EL BLOQUE DE CONTEXTO");
            assert!(prompt.contains("EL BLOQUE DE CONTEXTO"));
            assert!(prompt.contains("la pregunta original"));
        }
    }
}
