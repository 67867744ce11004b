//! `odb-config` - configuration resolution for an on-demand service broker release
//!
//! Merges a job's manifest properties with the defaults of its job
//! specification, resolves the links it consumes, rewrites deprecated
//! configuration shapes, validates the result against the release's rules
//! and assembles the effective document each job template renders.

pub mod canonical;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod job;
pub mod render;
pub mod system;
pub mod validation;

use anyhow::{Result, bail};
use cli::Args;
use config::Manifest;
use config::yaml::{load_job_spec, load_links};
use document::OutputFormat;
use job::JobKind;
use render::RenderRequest;
use system::System;
use tracing::info;

/// Render the document requested by `args`
///
/// # Errors
///
/// Returns an error if:
/// - The job name or output format is unknown
/// - `--indicators` is requested for a job other than the broker
/// - An input file cannot be loaded
/// - The configuration violates a rule of the job ([`error::ValidationError`])
#[inline]
pub fn run(args: &Args, system: &dyn System) -> Result<String> {
    let job: JobKind = args.job.parse()?;
    let format: OutputFormat = args
        .output_format
        .parse()
        .map_err(|err: String| anyhow::anyhow!(err))?;

    if args.indicators && job != JobKind::Broker {
        bail!("--indicators is only supported for the broker job, not {job}");
    }

    let spec_path = args
        .job_spec
        .clone()
        .unwrap_or_else(|| job.default_spec_path());

    let mut manifest = Manifest::load_from_file(system, &args.manifest)?;
    if let Some(ref deployment) = args.deployment {
        manifest.name = Some(deployment.clone());
    }
    let spec = load_job_spec(system, &spec_path)?;
    let links = match args.links {
        Some(ref path) => load_links(system, path)?,
        None => Vec::new(),
    };

    let request = RenderRequest {
        job,
        manifest: &manifest,
        spec: &spec,
        links: &links,
    };

    let document = if args.indicators {
        if manifest.name.is_none() {
            bail!("--indicators requires a deployment name (set name in the manifest or pass --deployment)");
        }
        render::render_indicators(&request)?
    } else {
        render::render(&request)?
    };
    info!("Rendered {} document", job);

    document.render(format)
}
