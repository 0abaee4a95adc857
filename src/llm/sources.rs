//! Citation list appended to grounded answers

/// One web source reported in grounding metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

impl GroundingSource {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// Collapse duplicate URIs, keeping first-seen order and the first title
pub fn unique_sources(sources: &[GroundingSource]) -> Vec<&GroundingSource> {
    let mut unique: Vec<&GroundingSource> = Vec::new();
    for source in sources {
        if !unique.iter().any(|s| s.uri == source.uri) {
            unique.push(source);
        }
    }
    unique
}

/// Markdown "Sources" section, or an empty string when there is nothing to cite
pub fn format_sources(sources: &[GroundingSource]) -> String {
    let unique = unique_sources(sources);
    if unique.is_empty() {
        return String::new();
    }

    let mut section = String::from("\n\n**Sources:**\n");
    for source in unique {
        section.push_str(&format!("- [{}]({})\n", source.title, source.uri));
    }
    section
}

pub fn append_sources(text: &mut String, sources: &[GroundingSource]) {
    text.push_str(&format_sources(sources));
}
