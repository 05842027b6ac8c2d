use extract::Category;
use regex::Regex;
use std::sync::LazyLock;

/// What the user is asking for. Classified up front so a plain category
/// listing never touches the language model.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryIntent {
    /// The literal category keyword, or "dame/lista los proyectos...".
    CategoryListing(Category),
    /// "De qué trata el proyecto X" / "Qué es X".
    ProjectInfo { name: String },
    /// "Es verdad que ..." fact check.
    Verify { claim: String },
    /// "En qué documentos aparece ...".
    FindDocuments { needle: String },
    /// Anything else: answer from the full extracted context.
    General,
}

static LISTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:dame|muestra|lista|extrae)\s+(?:los\s+|las\s+)?)?(proyectos|personas|instituciones)\s*$")
        .unwrap()
});

static PROJECT_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:de\s+qu[ée]\s+trata|qu[ée]\s+es|en\s+qu[ée]\s+consiste)\s+(?:el\s+)?(?:proyecto\s+)?["']?([^"'?]+)"#,
    )
    .unwrap()
});

static VERIFY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:es\s+(?:verdad|mentira|cierto|falso)|verdad\s+o\s+mentira)[\s:,]+(?:que\s+)?(.+)")
        .unwrap()
});

static FIND_DOCUMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:en\s+qu[ée]\s+documentos?|d[óo]nde)\s+(?:aparece|se\s+menciona)[\s:,]*(.+)")
        .unwrap()
});

/// Classify a free-text question. Matching happens on the lowercased,
/// trimmed text; captured parameters come back trimmed of quotes and
/// trailing question marks.
pub fn analyze(question: &str) -> QueryIntent {
    let q = question.trim().to_lowercase();

    if let Some(captures) = LISTING.captures(&q) {
        // The keyword comes straight out of the listing pattern
        let category = captures[1].parse::<Category>().expect("pattern yields a valid category");
        return QueryIntent::CategoryListing(category);
    }

    if let Some(captures) = PROJECT_INFO.captures(&q) {
        return QueryIntent::ProjectInfo {
            name: clean_capture(&captures[1]),
        };
    }

    if let Some(captures) = VERIFY.captures(&q) {
        return QueryIntent::Verify {
            claim: clean_capture(&captures[1]),
        };
    }

    if let Some(captures) = FIND_DOCUMENTS.captures(&q) {
        return QueryIntent::FindDocuments {
            needle: clean_capture(&captures[1]),
        };
    }

    QueryIntent::General
}

fn clean_capture(text: &str) -> String {
    text.trim()
        .trim_end_matches(['?', '.', '!'])
        .trim_matches(['"', '\''])
        .trim()
        .to_string()
}
