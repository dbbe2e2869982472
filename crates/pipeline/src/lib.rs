//! The point-to-polygon conversion pipeline.
//!
//! [`PtpJob`] drives the whole conversion for one volume: chunked
//! extraction of point annotations ([`extractor`]), batch resolution of
//! image files ([`fetch`]), invocation of the external segmentation
//! script ([`runner`]), streaming decode of the result artifact
//! ([`parser`]), and ordered bulk re-insertion of the resulting polygons
//! ([`uploader`]), all inside one database transaction.

pub mod error;
pub mod extractor;
pub mod fetch;
pub mod hook;
pub mod job;
pub mod parser;
pub mod runner;
pub mod uploader;

pub use error::PipelineError;
pub use extractor::AnnotationExtractor;
pub use fetch::{DiskFetcher, FetchError, FetchedImage, ImageFetcher, ImageHandle};
pub use hook::{HookError, LogHook, ReprocessHook};
pub use job::{PtpJob, ScratchPaths};
pub use parser::{ResultParser, ResultRecord};
pub use runner::ModelRunner;
pub use uploader::AnnotationUploader;
