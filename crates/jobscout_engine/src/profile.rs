use std::fs;
use std::path::Path;

use pipeline_logging::pipeline_info;

use crate::ProfileError;

/// Reads the candidate profile once at startup and returns its text with
/// whitespace collapsed to single spaces.
///
/// PDFs go through `pdf-extract`; `.txt` and `.md` files are read as-is.
pub fn extract_profile_text(path: &Path) -> Result<String, ProfileError> {
    let bytes = fs::read(path).map_err(|source| ProfileError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let raw = if is_plain_text(path) {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|err| ProfileError::Extraction {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?
    };

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(ProfileError::Empty(path.to_path_buf()));
    }
    pipeline_info!("Loaded candidate profile from {} ({} chars)", path.display(), text.len());
    Ok(text)
}

fn is_plain_text(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("md"))
}

fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
