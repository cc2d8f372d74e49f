//! Lenient field readers shared by the raw wire records.

use serde::{Deserialize, Deserializer};

/// Identifier as served by the backend: document stores hand out strings,
/// relational ones integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdValue {
    Text(String),
    Number(i64),
}

impl IdValue {
    /// Normalize to a non-empty string id.
    pub(crate) fn into_id(self) -> Option<String> {
        match self {
            Self::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Self::Number(n) => Some(n.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NameList {
    List(Vec<String>),
    Joined(String),
}

/// Read an author list given either as an array or a `", "`-joined string.
pub(crate) fn name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match Option::<NameList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(NameList::List(list)) => list,
        Some(NameList::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect())
}

/// Read a keyword set: trimmed, empty entries dropped, first occurrence wins.
pub(crate) fn keyword_set<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    let mut keywords: Vec<String> = Vec::with_capacity(raw.len());
    for keyword in raw {
        let keyword = keyword.trim();
        if !keyword.is_empty() && !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    Ok(keywords)
}
