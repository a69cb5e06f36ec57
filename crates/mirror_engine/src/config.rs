use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::fetch::FetchSettings;

/// Source of the wall-clock timestamp embedded in the document header and the
/// commit message. Injectable so tests can pin it.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Clock producing `YYYY-MM-DD HH:MM:SS UTC` from the current wall clock.
pub fn system_clock() -> Clock {
    Arc::new(|| Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Everything one mirroring run needs to know. Passed into the pipeline entry
/// point rather than living in process-wide constants, so test runs can use
/// isolated output roots.
#[derive(Clone)]
pub struct MirrorConfig {
    /// The page to mirror.
    pub page_url: String,
    /// Output root; also the working copy the publisher operates on.
    pub output_dir: PathBuf,
    /// Name of the image directory under the output root.
    pub images_subdir: String,
    /// Name of the generated Markdown document under the output root.
    pub document_filename: String,
    /// Name of the viewer shell under the output root; `None` skips it.
    pub index_filename: Option<String>,
    /// Document header title. Falls back to the page `<title>`, then "Changelog".
    pub title: Option<String>,
    pub fetch: FetchSettings,
    pub now_utc: Clock,
}

impl MirrorConfig {
    pub fn new(page_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            page_url: page_url.into(),
            output_dir: output_dir.into(),
            images_subdir: "images".to_string(),
            document_filename: "changelog.md".to_string(),
            index_filename: Some("index.html".to_string()),
            title: None,
            fetch: FetchSettings::default(),
            now_utc: system_clock(),
        }
    }

    /// Absolute path of the image directory.
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join(&self.images_subdir)
    }
}
