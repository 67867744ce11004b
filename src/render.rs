//! Render driver
//!
//! Turns (manifest, job specification, links) into an effective document:
//! merge, link resolution, canonicalization, validation, assembly. Each
//! render is a pure function of its inputs.

use crate::canonical::canonicalize;
use crate::config::links::{Link, ResolvedLinks, resolve_links};
use crate::config::merge::merge;
use crate::config::schema::JobSpec;
use crate::config::tree::PropertyTree;
use crate::config::Manifest;
use crate::document::EffectiveDocument;
use crate::document::indicators;
use crate::error::ValidationError;
use crate::job::JobKind;
use crate::validation::validate;
use tracing::debug;

/// Everything validators and assemblers see for one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Job being rendered
    pub job: JobKind,

    /// Deployment name, when known
    pub deployment: Option<String>,

    /// Effective (merged, then canonicalized) properties
    pub properties: PropertyTree,

    /// Links matched to the job's consumer declarations
    pub links: ResolvedLinks,
}

impl RenderContext {
    /// Broker context over `properties` with no links
    #[must_use]
    #[inline]
    pub fn from_properties(properties: PropertyTree) -> Self {
        Self {
            job: JobKind::Broker,
            deployment: None,
            properties,
            links: ResolvedLinks::new(),
        }
    }

    /// Replace the resolved links (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_links(mut self, links: ResolvedLinks) -> Self {
        self.links = links;
        self
    }
}

/// Inputs of a single render
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Job to render
    pub job: JobKind,

    /// Deployment manifest
    pub manifest: &'a Manifest,

    /// The job's specification
    pub spec: &'a JobSpec,

    /// Supplied link payloads
    pub links: &'a [Link],
}

/// Merge, resolve, canonicalize and validate without assembling
///
/// # Errors
///
/// Returns the first [`ValidationError`] raised by link resolution, a
/// canonicalizer or a validator.
#[inline]
pub fn prepare(request: &RenderRequest<'_>) -> Result<RenderContext, ValidationError> {
    let job = request.job;

    let schema = request.spec.property_schema();
    let properties = merge(&request.manifest.properties, &schema);
    debug!(
        "Merged {} declared properties for job {}",
        schema.len(),
        job
    );

    let links = resolve_links(&request.spec.consumes, request.links)?;
    debug!("Resolved {} of {} supplied link(s)", links.len(), request.links.len());

    let mut context = RenderContext {
        job,
        deployment: request.manifest.name.clone(),
        properties,
        links,
    };

    canonicalize(job.canonicalizers(), &mut context)?;
    debug!("Canonicalized properties for job {}", job);

    validate(job.validators(), &context)?;
    debug!("All {} validators passed for job {}", job.validators().len(), job);

    Ok(context)
}

/// Render the effective document of a job
///
/// # Errors
///
/// Returns the first [`ValidationError`] of the pipeline.
#[inline]
pub fn render(request: &RenderRequest<'_>) -> Result<EffectiveDocument, ValidationError> {
    let context = prepare(request)?;
    let document = request.job.assemble(&context)?;
    debug!("Assembled document for job {}", request.job);
    Ok(document)
}

/// Render the broker's indicator document
///
/// # Errors
///
/// Returns the first [`ValidationError`] of the broker pipeline.
#[inline]
pub fn render_indicators(request: &RenderRequest<'_>) -> Result<EffectiveDocument, ValidationError> {
    let context = prepare(request)?;
    Ok(indicators::assemble(&context))
}
