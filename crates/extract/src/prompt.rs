use crate::schema::Category;
use ingest::Document;

pub fn system_prompt(category: Category) -> &'static str {
    match category {
        Category::Proyectos => {
            "Eres un experto en análisis de documentos oficiales mexicanos. \
             Extrae información precisa y verificable. Responde en español."
        }
        Category::Personas => {
            "Eres un experto en extraer nombres de personas de documentos oficiales."
        }
        Category::Instituciones => {
            "Eres un experto en identificar instituciones en documentos oficiales."
        }
    }
}

pub fn extraction_prompt(category: Category, documents_block: &str) -> String {
    match category {
        Category::Proyectos => format!(
            r#"Analiza estos documentos y extrae todos los proyectos de investigación y desarrollo tecnológico.

DOCUMENTOS:
{documents_block}

INSTRUCCIONES:
1. Busca proyectos con nombre propio (ej: "Kutsari", "Olinia")
2. Incluye proyectos mencionados como "Proyecto X", "Iniciativa Y"
3. Para cada proyecto, proporciona:
   - Nombre completo
   - Descripción breve
   - Instituciones involucradas
   - Documentos donde aparece

FORMATO DE RESPUESTA (JSON, sin markdown ni explicaciones):
{{
  "proyectos": [
    {{
      "nombre": "Nombre del proyecto",
      "descripcion": "Descripción concisa",
      "instituciones": ["Inst1", "Inst2"],
      "documentos": ["doc1.pdf", "doc2.pdf"]
    }}
  ]
}}"#
        ),
        Category::Personas => format!(
            r#"Extrae todos los nombres de personas mencionadas en estos documentos.

DOCUMENTOS:
{documents_block}

INSTRUCCIONES:
1. Extrae nombres completos (Nombre + Apellidos)
2. Incluye cargos/roles si se mencionan
3. Para cada persona, indica en qué documentos aparece

FORMATO (JSON, sin markdown ni explicaciones):
{{
  "personas": [
    {{
      "nombre_completo": "Nombre Apellido1 Apellido2",
      "cargo": "Cargo/Rol mencionado",
      "documentos": ["doc1.pdf", "doc2.pdf"]
    }}
  ]
}}"#
        ),
        Category::Instituciones => format!(
            r#"Identifica todas las instituciones mencionadas en estos documentos.

DOCUMENTOS:
{documents_block}

INSTRUCCIONES:
1. Incluye universidades, institutos, secretarías, centros de investigación
2. Usa el nombre completo
3. Para cada institución, indica en qué documentos aparece

FORMATO (JSON, sin markdown ni explicaciones):
{{
  "instituciones": [
    {{
      "nombre": "Nombre completo de la institución",
      "siglas": "Siglas (si aplica)",
      "documentos": ["doc1.pdf", "doc2.pdf"]
    }}
  ]
}}"#
        ),
    }
}

pub fn repair_prompt(invalid_json: &str) -> String {
    format!(
        r#"El siguiente JSON es inválido:

{invalid_json}

Corrige este JSON. Responde únicamente con JSON válido, sin bloques de código, sin markdown y sin explicaciones."#
    )
}

/// Render a batch of documents as the block the extraction prompts embed:
/// each document labeled with its file name so the model can cite it.
pub fn format_documents(documents: &[Document]) -> String {
    let mut block = String::new();

    for doc in documents {
        block.push_str(&format!("--- DOCUMENTO: {} ---\n", doc.file_name));
        block.push_str(&doc.text);
        block.push_str("\n\n");
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ingest::generate_doc_id;

    fn doc(name: &str, text: &str) -> Document {
        Document {
            doc_id: generate_doc_id(name),
            file_name: name.to_string(),
            path: name.to_string(),
            text: text.to_string(),
            extracted_at: Utc::now(),
        }
    }

    #[test]
    fn documents_block_labels_each_file() {
        let docs = vec![
            doc("comunicado_01.pdf", "El proyecto Kutsari avanza."),
            doc("comunicado_02.pdf", "Firma de convenio con el IPN."),
        ];
        let block = format_documents(&docs);

        assert!(block.contains("--- DOCUMENTO: comunicado_01.pdf ---"));
        assert!(block.contains("El proyecto Kutsari avanza."));
        assert!(block.contains("--- DOCUMENTO: comunicado_02.pdf ---"));
    }

    #[test]
    fn extraction_prompt_embeds_documents_and_schema() {
        let block = format_documents(&[doc("c.pdf", "texto del comunicado")]);
        for category in Category::ALL {
            let prompt = extraction_prompt(category, &block);
            assert!(prompt.contains("texto del comunicado"));
            assert!(prompt.contains(category.as_str()));
        }
    }
}
