//! Storage key derivation for uploaded originals.

use uuid::Uuid;

const FALLBACK_NAME: &str = "file";
const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 10;

/// Reduce a client-supplied filename to its last path segment and replace every run of
/// characters outside `[A-Za-z0-9._-]` with a single `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit('/').next().unwrap_or_default();
    if base.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    let mut out = String::with_capacity(base.len());
    let mut in_run = false;
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

fn usable_extension(candidate: &str) -> Option<String> {
    let candidate = candidate.to_ascii_lowercase();
    let ok = !candidate.is_empty()
        && candidate.len() <= MAX_EXTENSION_LEN
        && candidate.chars().all(|c| c.is_ascii_alphanumeric());
    ok.then_some(candidate)
}

/// Lower-cased extension for the stored object.
///
/// Taken from the filename when it has a usable one, otherwise from the content type
/// subtype (`image/svg+xml` gives `svg`), otherwise `bin`.
pub fn extension(name: &str, content_type: &str) -> String {
    let from_name = name
        .rsplit_once('.')
        .and_then(|(_, ext)| usable_extension(ext));

    let from_content_type = || {
        content_type
            .split(';')
            .next()
            .and_then(|essence| essence.split_once('/'))
            .and_then(|(_, subtype)| subtype.split('+').next())
            .and_then(|subtype| usable_extension(subtype.trim()))
    };

    from_name
        .or_else(from_content_type)
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// `jobs/{user_id}/{job_id}/original.{ext}`
pub fn job_storage_key(user_id: Uuid, job_id: Uuid, ext: &str) -> String {
    format!("jobs/{}/{}/original.{}", user_id, job_id, ext)
}
