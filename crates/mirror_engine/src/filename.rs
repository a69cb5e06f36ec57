use sha2::{Digest, Sha256};
use url::Url;

const DEFAULT_EXTENSION: &str = "jpg";

/// Filesystem-safe local name for a downloaded image, derived from the last
/// path segment of its address. When the path carries no usable file name,
/// synthesizes `image_{short_hash(url)}.jpg`.
pub fn local_image_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
        .trim();

    if segment.is_empty() || !segment.contains('.') {
        return format!("image_{}.{}", short_hash(url.as_str()), DEFAULT_EXTENSION);
    }
    sanitize(segment)
}

/// Name for a remote address whose sanitized name is already claimed by a
/// different address: `{stem}--{short_hash(url)}.{ext}`.
pub fn disambiguated_name(name: &str, url: &Url) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}--{}.{ext}", short_hash(url.as_str())),
        None => format!("{name}--{}", short_hash(url.as_str())),
    }
}

/// Replace everything outside word characters, hyphen, and dot with `_`.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
