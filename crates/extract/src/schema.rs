use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three record types the extractor knows about. Closed set, matched
/// exhaustively; the CLI keyword is the lowercase Spanish name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Proyectos,
    Personas,
    Instituciones,
}

#[derive(Debug, Error)]
#[error("unknown category '{0}' (expected proyectos, personas or instituciones)")]
pub struct UnknownCategory(String);

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Proyectos,
        Category::Personas,
        Category::Instituciones,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Proyectos => "proyectos",
            Category::Personas => "personas",
            Category::Instituciones => "instituciones",
        }
    }

    /// Singular label used when rendering listings.
    pub fn singular(&self) -> &'static str {
        match self {
            Category::Proyectos => "proyecto",
            Category::Personas => "persona",
            Category::Instituciones => "institución",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proyectos" => Ok(Category::Proyectos),
            "personas" => Ok(Category::Personas),
            "instituciones" => Ok(Category::Instituciones),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// One structured unit pulled out of the communiqués. Owned by the
/// extractor; read-only once persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedRecord {
    pub category: Category,
    pub name: String,
    pub description: String,
    /// File names of the communiqués this record was seen in.
    pub source_docs: Vec<String>,
    pub mentions: usize,
}

/// Persisted envelope: one JSON file per category, overwritten wholesale
/// on every extractor run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFile {
    pub category: Category,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<ExtractedRecord>,
}

// Wire shapes the model is instructed to return, one per category. The
// prompt embeds the matching schema; anything optional defaults to empty.

#[derive(Debug, Deserialize)]
struct RawProyecto {
    nombre: String,
    #[serde(default)]
    descripcion: String,
    #[serde(default)]
    instituciones: Vec<String>,
    #[serde(default)]
    documentos: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPersona {
    nombre_completo: String,
    #[serde(default)]
    cargo: String,
    #[serde(default)]
    documentos: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawInstitucion {
    nombre: String,
    #[serde(default)]
    siglas: String,
    #[serde(default)]
    documentos: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProyectosEnvelope {
    #[serde(default)]
    proyectos: Vec<RawProyecto>,
}

#[derive(Debug, Deserialize)]
struct PersonasEnvelope {
    #[serde(default)]
    personas: Vec<RawPersona>,
}

#[derive(Debug, Deserialize)]
struct InstitucionesEnvelope {
    #[serde(default)]
    instituciones: Vec<RawInstitucion>,
}

/// Parse one batch reply into records. The model's per-category shapes
/// fold into the common record: participating institutions, a person's
/// role and an institution's acronym all land in the description.
pub fn parse_records(category: Category, json: &str) -> Result<Vec<ExtractedRecord>> {
    let records = match category {
        Category::Proyectos => {
            let envelope: ProyectosEnvelope =
                serde_json::from_str(json).context("reply does not match the proyectos schema")?;
            envelope
                .proyectos
                .into_iter()
                .map(|p| {
                    let mut description = p.descripcion;
                    if !p.instituciones.is_empty() {
                        if !description.is_empty() {
                            description.push_str(" — ");
                        }
                        description.push_str("Instituciones: ");
                        description.push_str(&p.instituciones.join(", "));
                    }
                    make_record(category, p.nombre, description, p.documentos)
                })
                .collect()
        }
        Category::Personas => {
            let envelope: PersonasEnvelope =
                serde_json::from_str(json).context("reply does not match the personas schema")?;
            envelope
                .personas
                .into_iter()
                .map(|p| make_record(category, p.nombre_completo, p.cargo, p.documentos))
                .collect()
        }
        Category::Instituciones => {
            let envelope: InstitucionesEnvelope = serde_json::from_str(json)
                .context("reply does not match the instituciones schema")?;
            envelope
                .instituciones
                .into_iter()
                .map(|i| {
                    let description = if i.siglas.is_empty() {
                        String::new()
                    } else {
                        format!("Siglas: {}", i.siglas)
                    };
                    make_record(category, i.nombre, description, i.documentos)
                })
                .collect()
        }
    };

    Ok(records)
}

fn make_record(
    category: Category,
    name: String,
    description: String,
    source_docs: Vec<String>,
) -> ExtractedRecord {
    let mentions = source_docs.len();
    ExtractedRecord {
        category,
        name,
        description,
        source_docs,
        mentions,
    }
}
