//! Text normalization for fuzzy comparison.
//!
//! Release titles accrete annotation suffixes ("(Original Mix)",
//! "- Remastered") that carry no identity. Both query and candidate titles
//! are normalized with the same fixed list before scoring, so "Song One" and
//! "Song One (Radio Edit)" compare as equals.

/// Annotation suffixes stripped from titles before scoring.
///
/// Compared against the lower-cased title, so entries are lower-case.
const TITLE_ANNOTATIONS: &[&str] = &[
    "(original mix)",
    "(extended mix)",
    "(club mix)",
    "(radio edit)",
    "(radio mix)",
    "(album version)",
    "(single version)",
    "(remastered)",
    "(re-recorded)",
    "- remastered",
    "- original mix",
    "- radio edit",
];

/// Normalize a title: lower-case, trim, strip annotation suffixes.
pub fn normalize_title(title: &str) -> String {
    let mut normalized = title.trim().to_lowercase();

    // Suffixes can stack ("song (radio edit) - remastered"), keep stripping
    // until none apply
    loop {
        let before = normalized.len();
        for annotation in TITLE_ANNOTATIONS {
            if let Some(stripped) = normalized.strip_suffix(annotation) {
                normalized = stripped.trim_end().to_string();
            }
        }
        if normalized.len() == before {
            break;
        }
    }

    normalized
}

/// Normalize an artist: lower-case, trim.
pub fn normalize_artist(artist: &str) -> String {
    artist.trim().to_lowercase()
}
