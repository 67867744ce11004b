//! Link discovery and resolution
//!
//! A job consumes named links exported by other jobs. Each declared consumer
//! is matched by name against the supplied payloads: the first supplied link
//! with that name wins. A mandatory declaration without a match fails the
//! render; an optional one simply resolves to nothing.

use crate::config::tree::PropertyTree;
use crate::error::ValidationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What a job expects to consume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConsumerDeclaration {
    /// Link name
    pub name: String,

    /// Link type, informational only
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,

    /// Whether the job renders without this link
    #[serde(default)]
    pub optional: bool,
}

impl LinkConsumerDeclaration {
    /// A link that must be supplied
    #[inline]
    pub fn mandatory<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            link_type: None,
            optional: false,
        }
    }

    /// A link that may be absent
    #[inline]
    pub fn optional<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            link_type: None,
            optional: true,
        }
    }
}

/// One instance of the exporting job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInstance {
    /// Network address of the instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Availability zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub az: Option<String>,

    /// Instance id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A named payload exported by another job
///
/// `properties` already holds the exporting job's effective properties; no
/// defaulting is applied to it on the consuming side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link name
    pub name: String,

    /// Instances of the exporting job
    #[serde(default)]
    pub instances: Vec<LinkInstance>,

    /// Exported properties
    #[serde(default)]
    pub properties: PropertyTree,
}

impl Link {
    /// Create a link without instances
    #[inline]
    pub fn new<S: Into<String>>(name: S, properties: PropertyTree) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
            properties,
        }
    }

    /// Add an instance with the given address (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_instance_address<S: Into<String>>(mut self, address: S) -> Self {
        self.instances.push(LinkInstance {
            address: Some(address.into()),
            ..LinkInstance::default()
        });
        self
    }

    /// Address of the first instance, used as the fallback endpoint
    #[must_use]
    #[inline]
    pub fn peer_address(&self) -> Option<&str> {
        self.instances
            .first()
            .and_then(|instance| instance.address.as_deref())
    }
}

/// Links matched to a job's consumer declarations, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLinks {
    links: IndexMap<String, Link>,
}

impl ResolvedLinks {
    /// No links resolved
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved link called `name`
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    /// Properties of the link called `name`
    #[must_use]
    #[inline]
    pub fn properties(&self, name: &str) -> Option<&PropertyTree> {
        self.get(name).map(|link| &link.properties)
    }

    /// Address of the first instance of the link called `name`
    #[must_use]
    #[inline]
    pub fn peer_address(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Link::peer_address)
    }

    /// Whether the link called `name` was resolved
    #[must_use]
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.links.contains_key(name)
    }

    /// Number of resolved links
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether nothing was resolved
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Resolved links in declaration order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Mutable properties of the link called `name`
    pub(crate) fn properties_mut(&mut self, name: &str) -> Option<&mut PropertyTree> {
        self.links.get_mut(name).map(|link| &mut link.properties)
    }
}

impl FromIterator<Link> for ResolvedLinks {
    /// Collect already-matched links, keeping the first of each name
    #[inline]
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        let mut links = IndexMap::new();
        for link in iter {
            links.entry(link.name.clone()).or_insert(link);
        }
        Self { links }
    }
}

/// Match declared consumers against supplied links
///
/// # Errors
///
/// Returns [`ValidationError::MissingLink`] for the first mandatory
/// declaration without a same-named supplied link.
#[inline]
pub fn resolve_links(
    declared: &[LinkConsumerDeclaration],
    supplied: &[Link],
) -> Result<ResolvedLinks, ValidationError> {
    let mut resolved = ResolvedLinks::new();

    for declaration in declared {
        match supplied.iter().find(|link| link.name == declaration.name) {
            Some(link) => {
                resolved.links.insert(declaration.name.clone(), link.clone());
            }
            None if declaration.optional => {}
            None => return Err(ValidationError::missing_link(declaration.name.clone())),
        }
    }

    Ok(resolved)
}
