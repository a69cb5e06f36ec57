use std::collections::HashMap;
use std::path::PathBuf;

use scraper::{Html, Selector};
use url::Url;

use crate::fetch::{FetchError, Fetcher};
use crate::filename::{disambiguated_name, local_image_name};
use crate::persist::{AtomicFileWriter, PersistError};

/// A single image reference found on the page, resolved to an absolute address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub resolved: Url,
}

/// Outcome of localizing one image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Downloaded; the reference should point at `local`, a path relative to
    /// the output root.
    Localized { remote: String, local: String },
    /// Download failed; the reference keeps pointing at the remote address.
    Failed { remote: String, error: FetchError },
}

/// Per-image results of one localization pass, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizeReport {
    pub outcomes: Vec<ImageOutcome>,
}

impl LocalizeReport {
    pub fn localized(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ImageOutcome::Localized { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.localized()
    }

    /// Map from resolved remote address to local relative path, for rewriting
    /// image references during conversion.
    pub fn path_map(&self) -> HashMap<String, String> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ImageOutcome::Localized { remote, local } => {
                    Some((remote.clone(), local.clone()))
                }
                ImageOutcome::Failed { .. } => None,
            })
            .collect()
    }
}

/// Where localized images land on disk and how the document refers to them.
#[derive(Debug, Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
    prefix: String,
}

impl ImageStore {
    pub fn new(images_dir: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            images_dir,
            prefix: prefix.into(),
        }
    }

    fn rel_path(&self, name: &str) -> String {
        format!("{}/{}", self.prefix, name)
    }
}

/// Collect `<img>` references in document order.
///
/// Reads `src` with `data-src` as fallback; skips nodes without a usable
/// attribute, inline `data:` sources, and vector images. Remaining addresses
/// are resolved against the page's base URL.
pub fn collect_image_refs(html: &str, base: &Url) -> Vec<ImageRef> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    let mut refs = Vec::new();
    for element in document.select(&selector) {
        let src = element
            .value()
            .attr("src")
            .or_else(|| element.value().attr("data-src"))
            .map(str::trim);
        let Some(src) = src.filter(|s| !s.is_empty()) else {
            continue;
        };
        let Some(resolved) = resolve_image_url(src, base) else {
            continue;
        };
        refs.push(ImageRef { resolved });
    }
    refs
}

fn resolve_image_url(reference: &str, base: &Url) -> Option<Url> {
    let url = Url::parse(reference)
        .ok()
        .or_else(|| base.join(reference).ok())?;
    if url.scheme() == "data" {
        return None;
    }
    if url.path().to_ascii_lowercase().ends_with(".svg") {
        return None;
    }
    Some(url)
}

/// Download every collected image, one at a time in document order, and write
/// each under the images directory.
///
/// A failed download is logged and recorded as [`ImageOutcome::Failed`]; the
/// run carries on with the remote address in place. Only a filesystem error
/// while writing a fetched image aborts, since that is a persistence failure,
/// not a degraded remote.
pub async fn localize_images(
    fetcher: &dyn Fetcher,
    refs: &[ImageRef],
    store: &ImageStore,
) -> Result<LocalizeReport, PersistError> {
    let mut report = LocalizeReport::default();
    if refs.is_empty() {
        return Ok(report);
    }

    log::info!("found {} images to process", refs.len());
    let writer = AtomicFileWriter::new(store.images_dir.clone());

    // name -> owning address, to detect sanitization collisions.
    let mut claimed: HashMap<String, String> = HashMap::new();
    // address -> outcome, so repeated references download once.
    let mut done: HashMap<String, ImageOutcome> = HashMap::new();

    for image in refs {
        let remote = image.resolved.as_str().to_string();
        if let Some(outcome) = done.get(&remote) {
            report.outcomes.push(outcome.clone());
            continue;
        }

        let mut name = local_image_name(&image.resolved);
        if claimed.get(&name).is_some_and(|owner| owner != &remote) {
            name = disambiguated_name(&name, &image.resolved);
        }
        claimed.insert(name.clone(), remote.clone());

        log::info!("downloading image: {remote}");
        let outcome = match fetcher.fetch_bytes(&remote).await {
            Ok(bytes) => {
                let path = writer.write_bytes(&name, &bytes)?;
                log::info!("image saved: {}", path.display());
                ImageOutcome::Localized {
                    remote: remote.clone(),
                    local: store.rel_path(&name),
                }
            }
            Err(error) => {
                log::warn!("failed to download image {remote}: {error}");
                ImageOutcome::Failed {
                    remote: remote.clone(),
                    error,
                }
            }
        };
        done.insert(remote, outcome.clone());
        report.outcomes.push(outcome);
    }

    Ok(report)
}
