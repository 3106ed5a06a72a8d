//! Loads the build [`Config`]: site identity and the four directories the
//! pipeline works with. Everything has a default, so a project file is
//! optional.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "inkpress.yaml";

pub const DEFAULT_SITE_NAME: &str = "bluntbangs";
pub const DEFAULT_SITE_URL: &str = "https://www.bluntbangs.com";
pub const DEFAULT_SITE_DESCRIPTION: &str =
    "このサイトはあれこれ試しているところです。";

#[derive(Deserialize, Default)]
#[serde(default)]
struct Project {
    site_name: Option<String>,
    site_url: Option<String>,
    site_description: Option<String>,
    copyright: Option<String>,
    analytics_id: Option<String>,
    content_directory: Option<PathBuf>,
    template_directory: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    static_directory: Option<PathBuf>,
}

/// Values supplied on the command line or through the environment. They
/// take precedence over the project file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub site_url: Option<String>,
    pub output_directory: Option<PathBuf>,
}

/// The identity of the site, made available to every template.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub name: String,

    /// The site root. Its path always ends in `/` so page URLs can be joined
    /// onto it.
    pub url: Url,

    pub description: String,
    pub copyright: String,
    pub analytics_id: String,
}

impl Site {
    /// Builds a [`Site`], normalizing `url` into a joinable root.
    pub fn new(
        name: String,
        url: &str,
        description: String,
        copyright: Option<String>,
        analytics_id: String,
    ) -> Result<Site> {
        let copyright =
            copyright.unwrap_or_else(|| format!("© {} {}", Local::now().year(), name));
        Ok(Site {
            url: site_root(url)?,
            name,
            description,
            copyright,
            analytics_id,
        })
    }
}

/// Everything a build needs. Read once before the build starts and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub site: Site,
    pub content_directory: PathBuf,
    pub template_directory: PathBuf,
    pub output_directory: PathBuf,
    pub static_directory: PathBuf,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its parents.
    /// Falls back to the defaults, rooted at `dir`, if there is none.
    pub fn from_directory(dir: &Path, overrides: Overrides) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, overrides)
                    .with_context(|| format!("Loading configuration `{}`", path.display()));
            }
        }
        Config::from_project(Project::default(), dir, overrides)
    }

    /// Loads the configuration from a project file. Relative directories in
    /// the file are resolved against the file's directory.
    pub fn from_project_file(path: &Path, overrides: Overrides) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Config::from_project(project, project_root, overrides),
        }
    }

    fn from_project(project: Project, root: &Path, overrides: Overrides) -> Result<Config> {
        let dir = |configured: Option<PathBuf>, default: &str| {
            root.join(configured.unwrap_or_else(|| PathBuf::from(default)))
        };
        let site_url = overrides
            .site_url
            .or(project.site_url)
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_owned());

        Ok(Config {
            site: Site::new(
                project
                    .site_name
                    .unwrap_or_else(|| DEFAULT_SITE_NAME.to_owned()),
                &site_url,
                project
                    .site_description
                    .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_owned()),
                project.copyright,
                project.analytics_id.unwrap_or_default(),
            )?,
            content_directory: dir(project.content_directory, "content"),
            template_directory: dir(project.template_directory, "templates"),
            output_directory: match overrides.output_directory {
                Some(output) => output,
                None => dir(project.output_directory, "public"),
            },
            static_directory: dir(project.static_directory, "static"),
        })
    }
}

/// Parses `url` and makes sure its path ends in a slash. Without the slash,
/// [`Url::join`] would replace the last path segment instead of appending to
/// it.
fn site_root(url: &str) -> Result<Url> {
    let mut root = Url::parse(url).with_context(|| format!("Invalid site URL `{}`", url))?;
    if root.cannot_be_a_base() {
        return Err(anyhow!("Site URL `{}` can't be used as a base URL", url));
    }
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    Ok(root)
}
