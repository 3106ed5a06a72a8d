//! Renders every output file. Each output kind has its own template and its
//! own context; every context also carries the site-wide fields (see
//! [`Writer::context`]).
//!
//! | Kind      | Template      | Output          |
//! |-----------|---------------|-----------------|
//! | post      | `post.html`   | `{slug}.html`   |
//! | page      | `page.html`   | `{slug}.html`   |
//! | index     | `index.html`  | `index.html`    |
//! | not-found | `404.html`    | `404.html`      |
//! | feed      | `feed.xml`    | `feed.xml`      |
//! | sitemap   | `sitemap.xml` | `sitemap.xml`   |
//!
//! Unlike reading documents, nothing here is recoverable: a template that
//! fails to load or execute stops the build.

use crate::config::Site;
use crate::date::DATE_FORMAT;
use crate::document::Document;
use crate::posts::{Post, PostList};
use crate::value::{self, feed_date, string};
use chrono::{DateTime, Utc};
use gtmpl::{Context, Template};
use gtmpl_value::Value;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The number of posts in the feed.
pub const FEED_LENGTH: usize = 10;

/// If present in the template directory, this file is prepended to every
/// HTML template so they can share `{{define}}` blocks. The XML templates are
/// used as-is since anything in front of the XML declaration would make them
/// invalid.
pub const BASE_TEMPLATE: &str = "base.html";

pub const INDEX_FILE: &str = "index.html";
pub const NOT_FOUND_FILE: &str = "404.html";
pub const FEED_FILE: &str = "feed.xml";
pub const SITEMAP_FILE: &str = "sitemap.xml";

const POST_TEMPLATE: &str = "post.html";
const PAGE_TEMPLATE: &str = "page.html";

/// The parsed templates, one per output kind.
pub struct Templates {
    post: Template,
    page: Template,
    index: Template,
    not_found: Template,
    feed: Template,
    sitemap: Template,
}

impl Templates {
    /// Loads and parses every template from `dir`.
    pub fn load(dir: &Path) -> Result<Templates> {
        let base = dir.join(BASE_TEMPLATE);
        let base = match base.is_file() {
            true => Some(base),
            false => None,
        };
        let html = |name: &str| {
            parse_template(base.iter().cloned().chain(std::iter::once(dir.join(name))))
        };
        let xml = |name: &str| parse_template(std::iter::once(dir.join(name)));
        Ok(Templates {
            post: html(POST_TEMPLATE)?,
            page: html(PAGE_TEMPLATE)?,
            index: html(INDEX_FILE)?,
            not_found: html(NOT_FOUND_FILE)?,
            feed: xml(FEED_FILE)?,
            sitemap: xml(SITEMAP_FILE)?,
        })
    }
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template(template_files: impl Iterator<Item = PathBuf>) -> Result<Template> {
    let mut contents = String::new();
    let mut last = PathBuf::new();
    for template_file in template_files {
        std::fs::File::open(&template_file)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|err| Error::OpenTemplateFile {
                path: template_file.clone(),
                err,
            })?;
        last = template_file;
    }

    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|err| Error::ParseTemplate {
            path: last,
            message: err.to_string(),
        })?;
    Ok(template)
}

/// Applies templates and writes the results into the output directory.
pub struct Writer<'a> {
    pub templates: &'a Templates,

    /// The site identity shared by every context.
    pub site: &'a Site,

    /// The (already cleared) directory all files are written to.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Builds the fields every template receives: `site_name`, `site_url`,
    /// `site_description`, `copyright`, `analytics_id`, `page_title`,
    /// `meta_description` and `full_url`.
    fn context(
        &self,
        page_title: String,
        meta_description: &str,
        full_url: &str,
    ) -> HashMap<String, Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("site_name".to_owned(), string(self.site.name.as_str()));
        m.insert(
            "site_url".to_owned(),
            string(self.site.url.as_str().trim_end_matches('/')),
        );
        m.insert(
            "site_description".to_owned(),
            string(self.site.description.as_str()),
        );
        m.insert("copyright".to_owned(), string(self.site.copyright.as_str()));
        m.insert(
            "analytics_id".to_owned(),
            string(self.site.analytics_id.as_str()),
        );
        m.insert("page_title".to_owned(), string(page_title));
        m.insert("meta_description".to_owned(), string(meta_description));
        m.insert("full_url".to_owned(), string(full_url));
        m
    }

    fn document_title(&self, document: &Document) -> String {
        format!("{} | {}", document.title, self.site.name)
    }

    /// The absolute URL of a site-wide output file.
    fn site_file_url(&self, file_name: &str) -> String {
        match self.site.url.join(file_name) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.site.url, file_name),
        }
    }

    /// Applies `template` to `context` and writes the result to `file_name`
    /// in the output directory, replacing whatever is there.
    fn render(
        &self,
        template: &Template,
        context: HashMap<String, Value>,
        file_name: &str,
    ) -> Result<()> {
        let template_error = |message: String| Error::Template {
            file: file_name.to_owned(),
            message,
        };
        let context = Context::from(Value::Object(context))
            .map_err(|err| template_error(err.to_string()))?;

        let mut out: Vec<u8> = Vec::new();
        template
            .execute(&mut out, &context)
            .map_err(|err| template_error(err.to_string()))?;

        let path = self.output_directory.join(file_name);
        std::fs::write(&path, out).map_err(|err| Error::Write { path, err })?;
        debug!(file = file_name, "wrote");
        Ok(())
    }

    /// Writes a post with its `newer` and `older` neighbours.
    pub fn write_post(&self, list: &PostList, post: &Post) -> Result<()> {
        let document = &post.document;
        let mut context = self.context(
            self.document_title(document),
            &document.excerpt,
            document.full_url.as_str(),
        );
        context.insert("post".to_owned(), value::post(list, post));
        context.insert("og_type".to_owned(), string("article"));
        self.render(&self.templates.post, context, &document.url)
    }

    /// Writes a standalone page. Pages are outside the post list and carry
    /// no navigation links.
    pub fn write_page(&self, document: &Document) -> Result<()> {
        let mut context = self.context(
            self.document_title(document),
            &document.excerpt,
            document.full_url.as_str(),
        );
        context.insert("post".to_owned(), Value::from(document));
        context.insert("og_type".to_owned(), string("website"));
        context.insert(
            "lastmod".to_owned(),
            string(document.date.format(DATE_FORMAT).to_string()),
        );
        self.render(&self.templates.page, context, &document.url)
    }

    pub fn write_index(&self, list: &PostList) -> Result<()> {
        let mut context = self.context(
            self.site.name.clone(),
            &self.site.description,
            self.site.url.as_str(),
        );
        context.insert("posts".to_owned(), value::posts(list.iter()));
        context.insert("og_type".to_owned(), string("website"));
        self.render(&self.templates.index, context, INDEX_FILE)
    }

    pub fn write_not_found(&self) -> Result<()> {
        let mut context = self.context(
            format!("404 Not Found | {}", self.site.name),
            &self.site.description,
            &self.site_file_url(NOT_FOUND_FILE),
        );
        context.insert("og_type".to_owned(), string("website"));
        self.render(&self.templates.not_found, context, NOT_FOUND_FILE)
    }

    /// Writes the feed with the [`FEED_LENGTH`] most recent posts.
    /// `build_date` is the only input that changes between identical builds.
    pub fn write_feed(&self, list: &PostList, build_date: &DateTime<Utc>) -> Result<()> {
        let mut context = self.context(
            self.site.name.clone(),
            &self.site.description,
            &self.site_file_url(FEED_FILE),
        );
        context.insert(
            "posts".to_owned(),
            value::posts(list.recent(FEED_LENGTH).iter()),
        );
        context.insert(
            "build_date".to_owned(),
            string(feed_date(&build_date.naive_utc())),
        );
        self.render(&self.templates.feed, context, FEED_FILE)
    }

    pub fn write_sitemap(&self, list: &PostList) -> Result<()> {
        let mut context = self.context(
            self.site.name.clone(),
            &self.site.description,
            &self.site_file_url(SITEMAP_FILE),
        );
        context.insert("posts".to_owned(), value::posts(list.iter()));
        self.render(&self.templates.sitemap, context, SITEMAP_FILE)
    }

    /// Writes every post followed by the index, not-found page, feed and
    /// sitemap.
    pub fn write_posts(&self, list: &PostList, build_date: &DateTime<Utc>) -> Result<()> {
        for post in list.iter() {
            self.write_post(list, post)?;
        }
        self.write_index(list)?;
        self.write_not_found()?;
        self.write_feed(list, build_date)?;
        self.write_sitemap(list)
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading templates or writing output files.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    #[error("Opening template file '{}': {err}", path.display())]
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    #[error("Parsing template '{}': {message}", path.display())]
    ParseTemplate { path: PathBuf, message: String },

    /// Returned when applying a template fails.
    #[error("Rendering `{file}`: {message}")]
    Template { file: String, message: String },

    /// Returned when an output file can't be written.
    #[error("Writing '{}': {err}", path.display())]
    Write { path: PathBuf, err: std::io::Error },
}
