//! Mirror engine: fetch a changelog page, localize its images, convert it to
//! Markdown, and publish the result to a git-tracked output directory.
mod config;
mod document;
mod fetch;
mod filename;
mod images;
mod markdown;
mod persist;
mod pipeline;
mod publish;
mod site;

pub use config::{system_clock, Clock, MirrorConfig};
pub use document::build_document;
pub use fetch::{FetchError, FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
pub use filename::{disambiguated_name, local_image_name};
pub use images::{
    collect_image_refs, localize_images, ImageOutcome, ImageRef, ImageStore, LocalizeReport,
};
pub use markdown::{page_title, MarkdownRenderer};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{run, PipelineError, RunReport};
pub use publish::{
    publish_if_changed, GitCli, NoopPublisher, PublishError, PublishOutcome, PublishStep,
    Publisher,
};
pub use site::index_html;
