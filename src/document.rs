//! Defines the [`Document`] record and the [`Reader`] which builds documents
//! from source files. Also defines [`classify`], which routes documents to
//! either the standalone page writer or the post list.

use crate::date::Resolver as DateResolver;
use crate::markdown::{self, Converter as MarkdownConverter, Metadata};
use chrono::NaiveDateTime;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// The number of characters kept in an excerpt.
pub const EXCERPT_LENGTH: usize = 100;

/// The extension of source files.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// The extension of rendered documents.
pub const HTML_EXTENSION: &str = ".html";

/// Slugs whose output file would be overwritten by a site-wide page.
pub const RESERVED_SLUGS: &[&str] = &["index", "404"];

/// Whether a document is part of the chronological post list or a standalone
/// page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Post,
    Page,
}

impl Kind {
    /// Anything other than an explicit `page` is a post.
    pub fn from_metadata(value: Option<&str>) -> Kind {
        match value {
            Some("page") => Kind::Page,
            _ => Kind::Post,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Post => "post",
            Kind::Page => "page",
        }
    }
}

/// The fields the pipeline reads out of a document's metadata, each taken
/// from the first value of its key. Empty values count as absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub kind: Option<String>,
    pub image: Option<String>,
}

impl From<&Metadata> for Frontmatter {
    fn from(metadata: &Metadata) -> Frontmatter {
        let first = |key: &str| {
            metadata
                .get(key)
                .and_then(|values| values.first())
                .filter(|value| !value.is_empty())
                .cloned()
        };
        Frontmatter {
            title: first("title"),
            date: first("date"),
            kind: first("type"),
            image: first("image"),
        }
    }
}

/// One source file after metadata extraction and markdown conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The source file name without its extension. Output file names and
    /// URLs are derived from it.
    pub slug: String,

    /// The `title` metadata value, or the slug.
    pub title: String,

    pub kind: Kind,

    /// See [`crate::date`] for the fallback rules.
    pub date: NaiveDateTime,

    /// The full source text, metadata block included.
    pub raw: String,

    /// The converted HTML body.
    pub body: String,

    /// The first [`EXCERPT_LENGTH`] characters of `body` with tags removed.
    pub excerpt: String,

    /// The output location relative to the site root (`{slug}.html`).
    pub url: String,

    /// `url` joined onto the site URL.
    pub full_url: Url,

    pub image: Option<String>,

    /// Every metadata key, including those the pipeline doesn't interpret,
    /// for templates to use.
    pub metadata: Metadata,
}

/// Reads [`Document`]s from a content directory.
pub struct Reader<'a> {
    /// The absolute URL of the site root. Document URLs are joined onto it.
    site_root: &'a Url,
    converter: MarkdownConverter,
    dates: DateResolver,
    tags: Regex,
}

impl<'a> Reader<'a> {
    pub fn new(site_root: &'a Url) -> Result<Reader<'a>> {
        Ok(Reader {
            site_root,
            converter: MarkdownConverter::new()?,
            dates: DateResolver::new()?,
            tags: Regex::new(r"<[^>]+>")?,
        })
    }

    /// Returns the documents in `source_directory` in file name order. A
    /// document that can't be read or converted is logged and left out; it
    /// doesn't stop the others from being read.
    pub fn documents(
        &'a self,
        source_directory: &Path,
    ) -> Result<impl Iterator<Item = Document> + 'a> {
        let paths = source_files(source_directory)?;
        Ok(paths.into_iter().filter_map(move |path| {
            match self.read_document(&path) {
                Ok(document) => {
                    if RESERVED_SLUGS.contains(&document.slug.as_str()) {
                        warn!(
                            file = %path.display(),
                            "`{}` collides with a site-wide page and will be overwritten",
                            document.url,
                        );
                    }
                    Some(document)
                }
                Err(err) => {
                    warn!(file = %path.display(), "skipping document: {}", err);
                    None
                }
            }
        }))
    }

    /// Reads and converts a single source file.
    pub fn read_document(&self, path: &Path) -> Result<Document> {
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?;

        let raw = std::fs::read_to_string(path)?;
        let modified = std::fs::metadata(path)?.modified()?;
        let converted = self.converter.convert(&raw);
        let frontmatter = Frontmatter::from(&converted.metadata);

        if let Some(date) = &frontmatter.date {
            if self.dates.parse(date).is_none() {
                debug!(
                    file = %path.display(),
                    date = %date,
                    "malformed date, using modification time"
                );
            }
        }
        let date = self.dates.resolve(frontmatter.date.as_deref(), modified);

        let url = format!("{}{}", slug, HTML_EXTENSION);
        Ok(Document {
            slug: slug.to_owned(),
            title: frontmatter.title.unwrap_or_else(|| slug.to_owned()),
            kind: Kind::from_metadata(frontmatter.kind.as_deref()),
            date,
            excerpt: self.excerpt(&converted.html),
            full_url: self.site_root.join(&url)?,
            url,
            image: frontmatter.image,
            raw,
            body: converted.html,
            metadata: converted.metadata,
        })
    }

    /// Strips everything that looks like a tag and keeps the first
    /// [`EXCERPT_LENGTH`] characters. Truncation ignores word boundaries.
    pub fn excerpt(&self, html: &str) -> String {
        self.tags
            .replace_all(html, "")
            .chars()
            .take(EXCERPT_LENGTH)
            .collect()
    }
}

/// Lists the markdown files directly inside `dir`, sorted by file name.
/// Hidden files are skipped.
pub fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for result in std::fs::read_dir(dir)? {
        let entry = result?;
        let os_file_name = entry.file_name();
        let file_name = os_file_name.to_string_lossy();
        if !file_name.starts_with('.')
            && file_name.ends_with(MARKDOWN_EXTENSION)
            && entry.file_type()?.is_file()
        {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Routes each document by kind: pages go straight to `write_page`, posts are
/// collected and returned in the order they were encountered.
pub fn classify<I, F, E>(
    documents: I,
    mut write_page: F,
) -> std::result::Result<Vec<Document>, E>
where
    I: IntoIterator<Item = Document>,
    F: FnMut(&Document) -> std::result::Result<(), E>,
{
    let mut posts = Vec::new();
    for document in documents {
        match document.kind {
            Kind::Page => write_page(&document)?,
            Kind::Post => posts.push(document),
        }
    }
    Ok(posts)
}

/// Represents the result of reading a [`Document`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading a [`Document`].
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a source file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned when the markdown converter can't be set up.
    #[error(transparent)]
    Markdown(#[from] markdown::Error),

    /// Returned when the document's URL can't be built.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// Returned when a pattern fails to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Returned for I/O errors, including non-UTF-8 source text.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn site_root() -> Url {
        Url::parse("https://example.org/").unwrap()
    }

    #[test]
    fn test_kind_from_metadata() {
        assert_eq!(Kind::Page, Kind::from_metadata(Some("page")));
        assert_eq!(Kind::Post, Kind::from_metadata(Some("post")));
        assert_eq!(Kind::Post, Kind::from_metadata(Some("draft")));
        assert_eq!(Kind::Post, Kind::from_metadata(None));
    }

    #[test]
    fn test_frontmatter_takes_first_values() {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_owned(), vec!["One".to_owned(), "Two".to_owned()]);
        metadata.insert("image".to_owned(), vec![String::new()]);
        let frontmatter = Frontmatter::from(&metadata);
        assert_eq!(Some("One".to_owned()), frontmatter.title);
        assert_eq!(None, frontmatter.image);
        assert_eq!(None, frontmatter.date);
    }

    #[test]
    fn test_excerpt() -> Result<()> {
        let root = site_root();
        let reader = Reader::new(&root)?;
        assert_eq!(
            "Hello world\n",
            reader.excerpt("<p>Hello <em>world</em></p>\n")
        );

        let long = format!("<p>{}</p>", "あ".repeat(150));
        let excerpt = reader.excerpt(&long);
        assert_eq!(EXCERPT_LENGTH, excerpt.chars().count());
        assert!(!excerpt.contains('<') && !excerpt.contains('>'));
        Ok(())
    }

    #[test]
    fn test_read_document() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("hello.md");
        fs::write(
            &path,
            "title: Hello, world!\ndate: 2024-01-01\nimage: cover.png\nmood: sunny\n\n# Hi\n",
        )?;

        let root = site_root();
        let document = Reader::new(&root)?.read_document(&path)?;
        assert_eq!("hello", document.slug);
        assert_eq!("Hello, world!", document.title);
        assert_eq!(Kind::Post, document.kind);
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            Some(document.date)
        );
        assert_eq!("<h1>Hi</h1>\n", document.body);
        assert_eq!("Hi\n", document.excerpt);
        assert_eq!("hello.html", document.url);
        assert_eq!("https://example.org/hello.html", document.full_url.as_str());
        assert_eq!(Some("cover.png".to_owned()), document.image);
        assert_eq!(vec!["sunny".to_owned()], document.metadata["mood"]);
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("bare.md");
        fs::write(&path, "Nothing but text.\n")?;

        let root = site_root();
        let document = Reader::new(&root)?.read_document(&path)?;
        assert_eq!("bare", document.title);
        assert_eq!(Kind::Post, document.kind);
        assert_eq!(None, document.image);
        Ok(())
    }

    #[test]
    fn test_documents_skip_failures_and_sort() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("b.md"), "title: B\n\nb\n")?;
        fs::write(dir.path().join("a.md"), "title: A\n\na\n")?;
        fs::write(dir.path().join("broken.md"), [0xff, 0xfe, 0x00])?;
        fs::write(dir.path().join("latin1.md"), [b't', b':', b' ', 0xe9, b'\n'])?;
        fs::write(dir.path().join(".hidden.md"), "title: H\n\nh\n")?;
        fs::write(dir.path().join("notes.txt"), "title: T\n\nt\n")?;

        let root = site_root();
        let reader = Reader::new(&root)?;
        let slugs: Vec<String> = reader
            .documents(dir.path())?
            .map(|document| document.slug)
            .collect();
        assert_eq!(vec!["a".to_owned(), "b".to_owned()], slugs);
        Ok(())
    }

    #[test]
    fn test_classify() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("about.md"), "title: About\ntype: page\n\nme\n")?;
        fs::write(dir.path().join("first.md"), "title: First\n\none\n")?;
        fs::write(dir.path().join("second.md"), "title: Second\n\ntwo\n")?;

        let root = site_root();
        let reader = Reader::new(&root)?;
        let mut pages = Vec::new();
        let posts = classify(reader.documents(dir.path())?, |page| {
            pages.push(page.slug.clone());
            Ok::<(), Error>(())
        })?;

        assert_eq!(vec!["about".to_owned()], pages);
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(vec!["first", "second"], slugs);
        Ok(())
    }
}
