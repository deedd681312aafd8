use serde::{Deserialize, Deserializer, Serialize};

/// A playable track as returned by the backend. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    /// Length in seconds, when the backend knows it.
    #[serde(
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<f64>,
}

impl Track {
    pub fn same_as(&self, other: &Track) -> bool {
        self.id == other.id
    }
}

/// A named list of tracks kept by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub songs: Vec<Track>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeconds {
    Number(f64),
    Text(String),
}

/// The search backend emits `""` for unknown durations, so accept numbers,
/// numeric strings, empty strings and null.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawSeconds>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawSeconds::Number(n)) if n.is_finite() && n > 0.0 => Some(n),
        Some(RawSeconds::Text(s)) => s.trim().parse::<f64>().ok().filter(|n| *n > 0.0),
        _ => None,
    })
}
