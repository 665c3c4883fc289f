//! Normalised change events and the image reference they carry.
//!
//! A [`Change`] is the only thing that leaves hookrelay. It is built by a
//! source adapter, handed to a [`crate::ChangeNotifier`] once, and dropped.
//!
//! The serde representation is the downstream wire form and must not drift:
//!
//! ```json
//! {"Kind":"git","Source":{"URL":"git@github.com:o/r.git","Branch":"main"}}
//! {"Kind":"image","Source":{"Name":{"Domain":"","Image":"o/r"}}}
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{ImageRefError, RefName, RepoUrl};

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// A normalised change event.
///
/// Carries no adapter-specific metadata; two providers describing the same
/// push produce equal values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Kind", content = "Source")]
pub enum Change {
    /// A git ref moved.
    #[serde(rename = "git")]
    Git(GitUpdate),
    /// A container image was pushed.
    #[serde(rename = "image")]
    Image(ImageUpdate),
}

impl Change {
    /// Creates a git change for `branch` of the repository at `url`.
    pub fn git(url: RepoUrl, branch: RefName) -> Self {
        Self::Git(GitUpdate { url, branch })
    }

    /// Creates an image change for `name`.
    pub fn image(name: ImageName) -> Self {
        Self::Image(ImageUpdate { name })
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git(update) => write!(f, "git {}@{}", update.url, update.branch),
            Self::Image(update) => write!(f, "image {}", update.name),
        }
    }
}

// ---------------------------------------------------------------------------

/// A ref update in a git repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitUpdate {
    /// SSH clone URL of the repository.
    #[serde(rename = "URL")]
    pub url: RepoUrl,
    /// Ref that moved; see [`RefName`] for the prefix rules.
    #[serde(rename = "Branch")]
    pub branch: RefName,
}

/// A new image in a container registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageUpdate {
    /// Repository that received the push. Tags are not forwarded.
    #[serde(rename = "Name")]
    pub name: ImageName,
}

// ---------------------------------------------------------------------------
// Image references
// ---------------------------------------------------------------------------

/// Matches the leading path element of an image reference when that element
/// names a registry: `localhost` or a dotted hostname, optionally with a port.
///
/// `None` only if the pattern fails to compile, in which case no leading
/// element is treated as a registry.
static DOMAIN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(?:localhost|[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)+)(?::[0-9]+)?$",
    )
    .ok()
});

fn is_registry_host(element: &str) -> bool {
    DOMAIN.as_ref().is_some_and(|re| re.is_match(element))
}

/// Registry host plus repository path of an image, without tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageName {
    /// Registry host, empty for the default registry.
    #[serde(rename = "Domain")]
    pub domain: String,
    /// Repository path within the registry (e.g. `"library/alpine"`).
    #[serde(rename = "Image")]
    pub image: String,
}

impl std::fmt::Display for ImageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.domain.is_empty() {
            write!(f, "{}", self.image)
        } else {
            write!(f, "{}/{}", self.domain, self.image)
        }
    }
}

/// A parsed docker-style image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Registry and repository.
    pub name: ImageName,
    /// Tag, if the reference carried one.
    pub tag: Option<String>,
}

impl ImageRef {
    /// Parses an image reference such as `"quay.io/org/app:1.2"`.
    ///
    /// The first path element is treated as the registry host when there are
    /// three or more elements, or when there are two and it looks like a
    /// host. Otherwise the whole path is the repository on the default
    /// registry.
    ///
    /// # Errors
    ///
    /// - [`ImageRefError::Blank`] for the empty string.
    /// - [`ImageRefError::Malformed`] for a leading or trailing `/`, an empty
    ///   repository, or more than one `:` in the repository part.
    /// - [`ImageRefError::BlankTag`] for a trailing `:`.
    pub fn parse(s: &str) -> Result<Self, ImageRefError> {
        if s.is_empty() {
            return Err(ImageRefError::Blank);
        }
        if s.starts_with('/') || s.ends_with('/') {
            return Err(ImageRefError::Malformed(s.to_string()));
        }

        let elements: Vec<&str> = s.split('/').collect();
        let (domain, path) = match elements.as_slice() {
            [single] => ("", (*single).to_string()),
            [first, second] if is_registry_host(first) => (*first, (*second).to_string()),
            [_, _] => ("", s.to_string()),
            [first, rest @ ..] => (*first, rest.join("/")),
            [] => return Err(ImageRefError::Blank),
        };

        let parts: Vec<&str> = path.split(':').collect();
        let (image, tag) = match parts.as_slice() {
            [image] => (*image, None),
            [image, _] if image.is_empty() => return Err(ImageRefError::Malformed(s.to_string())),
            [_, tag] if tag.is_empty() => return Err(ImageRefError::BlankTag(s.to_string())),
            [image, tag] => (*image, Some((*tag).to_string())),
            _ => return Err(ImageRefError::Malformed(s.to_string())),
        };
        if image.is_empty() {
            return Err(ImageRefError::Malformed(s.to_string()));
        }

        Ok(Self {
            name: ImageName {
                domain: domain.to_string(),
                image: image.to_string(),
            },
            tag,
        })
    }
}

impl std::str::FromStr for ImageRef {
    type Err = ImageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}:{}", self.name, tag),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
