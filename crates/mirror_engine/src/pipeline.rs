use std::path::PathBuf;

use url::Url;

use crate::config::MirrorConfig;
use crate::document::build_document;
use crate::fetch::{FetchError, Fetcher};
use crate::images::{collect_image_refs, localize_images, ImageStore, LocalizeReport};
use crate::markdown::{page_title, MarkdownRenderer};
use crate::persist::{ensure_output_dir, AtomicFileWriter, PersistError};
use crate::publish::{publish_if_changed, PublishOutcome, Publisher};
use crate::site::index_html;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("could not persist output: {0}")]
    Persist(#[from] PersistError),
    #[error("fetched page has an unusable final url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Summary of one mirroring run.
#[derive(Debug)]
pub struct RunReport {
    pub document_path: PathBuf,
    pub bytes_written: u64,
    pub images: LocalizeReport,
    pub publish: PublishOutcome,
}

/// Run the whole pipeline once: fetch the page, localize its images, convert
/// to Markdown, write the document and viewer shell, then publish.
///
/// Fetch, conversion, and document-write failures are fatal and propagate;
/// per-image and publish failures degrade the run and land in the report.
pub async fn run(
    config: &MirrorConfig,
    fetcher: &dyn Fetcher,
    publisher: &dyn Publisher,
) -> Result<RunReport, PipelineError> {
    log::info!("fetching page: {}", config.page_url);
    let page = fetcher.fetch_page(&config.page_url).await?;
    let base = Url::parse(&page.final_url)?;

    // Nothing below touches the filesystem until the page fetch has succeeded.
    ensure_output_dir(&config.output_dir)?;

    let refs = collect_image_refs(&page.html, &base);
    let store = ImageStore::new(config.images_dir(), config.images_subdir.clone());
    let images = localize_images(fetcher, &refs, &store).await?;

    log::info!("converting page to markdown");
    let renderer = MarkdownRenderer::with_image_paths(images.path_map());
    let body = renderer.render(&page.html, Some(base.as_str()));

    let title = config
        .title
        .clone()
        .or_else(|| page_title(&page.html))
        .unwrap_or_else(|| "Changelog".to_string());
    let generated_utc = (config.now_utc)();
    let document = build_document(&title, &config.page_url, &generated_utc, &body);

    let writer = AtomicFileWriter::new(config.output_dir.clone());
    let document_path = writer.write(&config.document_filename, &document)?;
    log::info!(
        "document saved: {} ({} bytes)",
        document_path.display(),
        document.len()
    );

    if let Some(index) = &config.index_filename {
        writer.write(index, &index_html(&title, &config.document_filename))?;
        log::info!("viewer shell saved: {index}");
    }

    let message = format!("Update changelog - {generated_utc}");
    let publish = publish_if_changed(publisher, &message);

    Ok(RunReport {
        document_path,
        bytes_written: document.len() as u64,
        images,
        publish,
    })
}
