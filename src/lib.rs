//! The library code for the `inkpress` static site generator. A build is one
//! sequential pass over a content directory of markdown files:
//!
//! 1. Reset the output directory ([`crate::assets`])
//! 2. Read each source file, extract its metadata and convert it to HTML
//!    ([`crate::document`], [`crate::markdown`], [`crate::date`])
//! 3. Write standalone pages as they are read, and collect everything else as
//!    posts
//! 4. Sort the posts and link each to its newer and older neighbour
//!    ([`crate::posts`])
//! 5. Render the posts, the index, the not-found page, the feed and the
//!    sitemap ([`crate::write`])
//! 6. Copy the static assets on top ([`crate::assets`])
//!
//! [`crate::build::build_site`] runs the whole thing from a
//! [`crate::config::Config`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod assets;
pub mod build;
pub mod config;
pub mod date;
pub mod document;
pub mod markdown;
pub mod posts;
pub mod value;
pub mod write;
