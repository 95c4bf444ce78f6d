//! Source origins: a remote download root or a local directory

use crate::{Error, Result};
use regex::Regex;
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Base location the yearly files are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// HTTP(S) root; always ends with `/` so filenames join as children
    Remote(Url),
    /// Directory on the local filesystem
    Local(PathBuf),
}

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://").expect("scheme pattern is valid")
    })
}

impl Origin {
    /// Parse an origin string
    ///
    /// `http://` and `https://` roots become [`Origin::Remote`], `file://`
    /// URLs and plain paths become [`Origin::Local`]. Any other scheme is
    /// rejected.
    pub fn parse(origin: &str) -> Result<Self> {
        let trimmed = origin.trim();
        if trimmed.is_empty() {
            return Err(Error::fetch(origin, "origin is empty"));
        }

        let Some(captures) = scheme_pattern().captures(trimmed) else {
            return Ok(Origin::Local(PathBuf::from(trimmed)));
        };

        let scheme = captures["scheme"].to_ascii_lowercase();
        match scheme.as_str() {
            "http" | "https" => {
                let with_slash = if trimmed.ends_with('/') {
                    trimmed.to_string()
                } else {
                    format!("{}/", trimmed)
                };
                let url = Url::parse(&with_slash).map_err(|e| {
                    Error::fetch_with_source(trimmed, "invalid origin URL", e)
                })?;
                Ok(Origin::Remote(url))
            }
            "file" => {
                let url = Url::parse(trimmed)
                    .map_err(|e| Error::fetch_with_source(trimmed, "invalid file URL", e))?;
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::fetch(trimmed, "file URL does not name a local path"))?;
                Ok(Origin::Local(path))
            }
            other => Err(Error::fetch(
                trimmed,
                format!("unsupported origin scheme '{}'", other),
            )),
        }
    }

    /// Local directory origin
    pub fn local(dir: impl AsRef<Path>) -> Self {
        Origin::Local(dir.as_ref().to_path_buf())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Origin::Remote(_))
    }

    /// Full location of a file under this origin, as a display string
    pub fn locate(&self, filename: &str) -> String {
        match self {
            Origin::Remote(base) => match base.join(filename) {
                Ok(url) => url.to_string(),
                Err(_) => format!("{}{}", base, filename),
            },
            Origin::Local(dir) => dir.join(filename).display().to_string(),
        }
    }
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Remote(url) => write!(f, "{}", url),
            Origin::Local(dir) => write!(f, "{}", dir.display()),
        }
    }
}
