//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: resetting the output directory
//! ([`crate::assets`]), reading and classifying documents
//! ([`crate::document`]), ordering posts ([`crate::posts`]), rendering every
//! output file ([`crate::write`]) and finally copying the static assets.

use crate::assets::{self, copy_static, reset_output};
use crate::config::Config;
use crate::document::{self, classify, Reader};
use crate::posts::PostList;
use crate::write::{self, Templates, Writer};
use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub pages: usize,
    pub static_files: usize,
    pub output_directory: PathBuf,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Build complete! Generated {} posts to {}",
            self.posts,
            self.output_directory.display()
        )
    }
}

/// Builds the site described by `config`.
///
/// The output directory is deleted and recreated first, so nothing from a
/// previous build survives. If the content directory doesn't exist a warning
/// is logged and `None` is returned, leaving the output directory empty.
///
/// Documents that fail to read or convert are logged and skipped. Failures
/// while rendering are returned and stop the build, possibly leaving the
/// output directory partially populated.
///
/// The build takes no lock: two builds writing to the same output directory
/// at the same time will clobber each other.
pub fn build_site(config: &Config) -> Result<Option<Summary>> {
    reset_output(&config.output_directory)?;

    let templates = Templates::load(&config.template_directory)?;

    if !config.content_directory.is_dir() {
        warn!(
            dir = %config.content_directory.display(),
            "content directory not found, nothing to build"
        );
        return Ok(None);
    }

    let writer = Writer {
        templates: &templates,
        site: &config.site,
        output_directory: &config.output_directory,
    };

    let reader = Reader::new(&config.site.url)?;
    let mut pages = 0;
    let posts = classify(reader.documents(&config.content_directory)?, |page| {
        pages += 1;
        writer.write_page(page)
    })?;

    let list = PostList::assemble(posts);
    info!(posts = list.len(), pages, "read documents");

    writer.write_posts(&list, &Utc::now())?;

    let static_files = copy_static(&config.static_directory, &config.output_directory)?;
    info!(static_files, "copied static assets");

    Ok(Some(Summary {
        posts: list.len(),
        pages,
        static_files,
        output_directory: config.output_directory.clone(),
    }))
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for errors preparing the output directory or copying assets.
    #[error(transparent)]
    Assets(#[from] assets::Error),

    /// Returned when the content directory can't be listed.
    #[error("Reading documents: {0}")]
    Documents(#[from] document::Error),

    /// Returned for errors loading templates or writing output files.
    #[error(transparent)]
    Write(#[from] write::Error),
}
