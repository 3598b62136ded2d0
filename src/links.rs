//! Hypermedia navigation over `_meta` blocks.
//!
//! Every resource the server returns carries its own URL in `_meta.href` and
//! a list of related resources in `_meta.links`:
//!
//! ```json
//! "_meta": {
//!   "href": "https://hub/api/projects/6f1c...",
//!   "links": [
//!     {"rel": "versions", "href": "https://hub/api/projects/6f1c.../versions"}
//!   ]
//! }
//! ```
//!
//! Facade operations follow these links instead of building URLs by hand.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{HubError, Result};

/// A single `{rel, href}` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// The `_meta` block of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Self link.
    #[serde(default)]
    pub href: Option<String>,

    /// HTTP methods the caller may use on this resource.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,

    #[serde(default)]
    pub links: Vec<Link>,
}

impl Meta {
    /// Href of the first link whose `rel` matches exactly.
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == rel)
            .map(|l| l.href.as_str())
    }
}

/// A server resource that carries a `_meta` block.
pub trait Resource {
    fn meta(&self) -> &Meta;

    /// Self link.
    fn href(&self) -> Option<&str> {
        self.meta().href.as_deref()
    }

    /// Href of the related resource named `rel`.
    fn link(&self, rel: &str) -> Option<&str> {
        self.meta().link(rel)
    }

    /// Like [`Resource::link`], but a missing relation is an error.
    fn require_link(&self, rel: &str) -> Result<&str> {
        self.link(rel).ok_or_else(|| HubError::MissingLink {
            rel: rel.to_string(),
        })
    }

    /// Self link, or an error if the resource has none.
    fn require_href(&self) -> Result<&str> {
        self.href().ok_or_else(|| HubError::MissingLink {
            rel: "self".to_string(),
        })
    }

    /// Identifier of the resource: the last path segment of its self link.
    fn object_id(&self) -> Option<String> {
        self.href().and_then(id_from_href)
    }
}

/// Find the `href` for `rel` in a raw JSON resource.
pub fn get_link<'a>(resource: &'a Value, rel: &str) -> Option<&'a str> {
    resource
        .get("_meta")?
        .get("links")?
        .as_array()?
        .iter()
        .find(|l| l.get("rel").and_then(Value::as_str) == Some(rel))?
        .get("href")?
        .as_str()
}

/// Self link of a raw JSON resource.
pub fn self_href(resource: &Value) -> Option<&str> {
    resource.get("_meta")?.get("href")?.as_str()
}

/// Last non-empty path segment of an href.
///
/// Parses the URL rather than splitting the string at a fixed offset, so
/// query strings and server-side path prefixes don't shift the result.
pub fn id_from_href(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

/// Identifier of a raw JSON resource, from its self link.
pub fn object_id(resource: &Value) -> Option<String> {
    self_href(resource).and_then(id_from_href)
}
