//! Error types with exit codes

use core::fmt;
use thiserror::Error;

/// A rejected configuration
///
/// The `Display` output of every variant is the exact user-facing message.
/// Callers and tests match on it literally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// A mandatory consumed link has no matching supplied link
    #[error("Can't find link '{name}'")]
    MissingLink { name: String },

    /// A link is present but its meaningful sub-fields are all blank
    #[error("{message}")]
    EmptyLink { message: String },

    /// A required field is absent or an empty string
    #[error("{message}")]
    MissingField { message: String },

    /// Two mutually exclusive configuration shapes are both populated
    #[error("{message}")]
    ConflictingConfig { message: String },

    /// A value falls outside its allowed set
    #[error("{message}")]
    InvalidEnum { message: String },

    /// Wrong structural type, e.g. a map where a sequence is expected
    #[error("{message}")]
    InvalidShape { message: String },

    /// Floating or non-semver version
    #[error("{message}")]
    InvalidVersion { message: String },

    /// A feature is enabled without its required companion configuration
    #[error("{message}")]
    DependentConfig { message: String },

    /// A numeric setting is below its lower bound
    #[error("{message}")]
    OutOfRange { message: String },
}

/// Fieldless discriminant of [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [`ValidationError::MissingLink`]
    MissingLink,
    /// See [`ValidationError::EmptyLink`]
    EmptyLink,
    /// See [`ValidationError::MissingField`]
    MissingField,
    /// See [`ValidationError::ConflictingConfig`]
    ConflictingConfig,
    /// See [`ValidationError::InvalidEnum`]
    InvalidEnum,
    /// See [`ValidationError::InvalidShape`]
    InvalidShape,
    /// See [`ValidationError::InvalidVersion`]
    InvalidVersion,
    /// See [`ValidationError::DependentConfig`]
    DependentConfig,
    /// See [`ValidationError::OutOfRange`]
    OutOfRange,
}

impl fmt::Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::MissingLink => "missing link",
            Self::EmptyLink => "empty link",
            Self::MissingField => "missing field",
            Self::ConflictingConfig => "conflicting config",
            Self::InvalidEnum => "invalid enum",
            Self::InvalidShape => "invalid shape",
            Self::InvalidVersion => "invalid version",
            Self::DependentConfig => "dependent config",
            Self::OutOfRange => "out of range",
        };
        f.write_str(name)
    }
}

impl ValidationError {
    /// Exit code used by the binary for any validation failure
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        2
    }

    /// The kind of this error
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match *self {
            Self::MissingLink { .. } => ErrorKind::MissingLink,
            Self::EmptyLink { .. } => ErrorKind::EmptyLink,
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::ConflictingConfig { .. } => ErrorKind::ConflictingConfig,
            Self::InvalidEnum { .. } => ErrorKind::InvalidEnum,
            Self::InvalidShape { .. } => ErrorKind::InvalidShape,
            Self::InvalidVersion { .. } => ErrorKind::InvalidVersion,
            Self::DependentConfig { .. } => ErrorKind::DependentConfig,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }

    /// Create a missing link error
    #[inline]
    pub fn missing_link<S: Into<String>>(name: S) -> Self {
        Self::MissingLink { name: name.into() }
    }

    /// Create an empty link error
    #[inline]
    pub fn empty_link<S: Into<String>>(message: S) -> Self {
        Self::EmptyLink {
            message: message.into(),
        }
    }

    /// Create a missing field error with a free-form message
    #[inline]
    pub fn missing<S: Into<String>>(message: S) -> Self {
        Self::MissingField {
            message: message.into(),
        }
    }

    /// `Invalid <section> config - must specify <field>`
    #[inline]
    pub fn missing_field(section: &str, field: &str) -> Self {
        Self::missing(format!("Invalid {section} config - must specify {field}"))
    }

    /// Create a conflicting configuration error
    #[inline]
    pub fn conflicting<S: Into<String>>(message: S) -> Self {
        Self::ConflictingConfig {
            message: message.into(),
        }
    }

    /// `Unsupported value '<value>' for <property>. Choose from "a", "b"`
    #[inline]
    pub fn invalid_enum(property: &str, value: &str, allowed: &[&str]) -> Self {
        Self::InvalidEnum {
            message: format!(
                "Unsupported value '{value}' for {property}. Choose from {}",
                quoted_choices(allowed)
            ),
        }
    }

    /// `Unsupported value <value> for <property>. Choose from "a", "b"`
    ///
    /// The register-broker errand reports the value without quotes.
    #[inline]
    pub fn invalid_enum_unquoted(property: &str, value: &str, allowed: &[&str]) -> Self {
        Self::InvalidEnum {
            message: format!(
                "Unsupported value {value} for {property}. Choose from {}",
                quoted_choices(allowed)
            ),
        }
    }

    /// Create an invalid shape error
    #[inline]
    pub fn invalid_shape<S: Into<String>>(message: S) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }

    /// Create an invalid version error
    #[inline]
    pub fn invalid_version<S: Into<String>>(message: S) -> Self {
        Self::InvalidVersion {
            message: message.into(),
        }
    }

    /// Create a dependent configuration error
    #[inline]
    pub fn dependent<S: Into<String>>(message: S) -> Self {
        Self::DependentConfig {
            message: message.into(),
        }
    }

    /// `Invalid <property> - must be greater or equal <minimum>`
    #[inline]
    pub fn out_of_range(property: &str, minimum: i64) -> Self {
        Self::OutOfRange {
            message: format!("Invalid {property} - must be greater or equal {minimum}"),
        }
    }
}

/// Failure to obtain the inputs of a render
///
/// These are not part of the validation contract: they describe unreadable
/// files, malformed documents and unknown jobs.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InputError {
    /// Manifest file missing or malformed
    #[error("Manifest error: {message}")]
    Manifest { message: String },

    /// Job specification missing, malformed or rejected by the schema
    #[error("Job spec error: {message}")]
    JobSpec { message: String },

    /// Links file missing or malformed
    #[error("Links error: {message}")]
    Links { message: String },

    /// The job name does not match a known job
    #[error("Unknown job: {name}")]
    UnknownJob { name: String },
}

impl InputError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        1
    }

    /// Create a manifest error
    #[inline]
    pub fn manifest<S: Into<String>>(message: S) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }

    /// Create a job spec error
    #[inline]
    pub fn job_spec<S: Into<String>>(message: S) -> Self {
        Self::JobSpec {
            message: message.into(),
        }
    }

    /// Create a links error
    #[inline]
    pub fn links<S: Into<String>>(message: S) -> Self {
        Self::Links {
            message: message.into(),
        }
    }

    /// Create an unknown job error
    #[inline]
    pub fn unknown_job<S: Into<String>>(name: S) -> Self {
        Self::UnknownJob { name: name.into() }
    }
}

fn quoted_choices(allowed: &[&str]) -> String {
    allowed
        .iter()
        .map(|choice| format!("\"{choice}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
