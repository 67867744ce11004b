use clap::Parser;

/// Command-line arguments for odb-config
#[derive(Parser, Debug, Clone)]
#[command(name = "odb-config")]
#[command(about = "Resolves, validates and normalizes job configuration for an on-demand service broker release")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Job to render (e.g. broker, register-broker, service-backup)
    #[arg(long, value_name = "NAME", env = "ODB_CONFIG_JOB")]
    pub job: String,

    /// Deployment manifest holding the job's properties
    #[arg(long, value_name = "PATH")]
    pub manifest: String,

    /// Job specification file [default: jobs/<NAME>/spec.yml]
    #[arg(long = "job-spec", value_name = "PATH")]
    pub job_spec: Option<String>,

    /// YAML list of links supplied to the job
    #[arg(long, value_name = "PATH")]
    pub links: Option<String>,

    /// Output format: yaml or json
    #[arg(long = "output-format", value_name = "FORMAT", default_value = "yaml")]
    pub output_format: String,

    /// Emit the broker's indicator document instead of its configuration
    #[arg(long)]
    pub indicators: bool,

    /// Deployment name, overriding the manifest's
    #[arg(long, value_name = "NAME")]
    pub deployment: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}
