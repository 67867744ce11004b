//! Job catalogue
//!
//! Each job of the release fixes its canonicalizers, its validators (in
//! order) and the assembler that builds its document.

use core::fmt;
use core::str::FromStr;

use crate::canonical::{self, Canonicalizer};
use crate::document::{self, EffectiveDocument};
use crate::error::{InputError, ValidationError};
use crate::render::RenderContext;
use crate::validation::{self, Validator};

/// A job of the service broker release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JobKind {
    /// The on-demand broker itself
    Broker,
    /// Registers the broker and its plans with Cloud Foundry
    RegisterBroker,
    /// Removes the broker from Cloud Foundry
    DeregisterBroker,
    /// Deletes every service instance, then deregisters the broker
    DeleteAllServiceInstancesAndDeregisterBroker,
    /// Upgrades every service instance to the current configuration
    UpgradeAllServiceInstances,
    /// Recreates the VMs of every service instance
    RecreateAllServiceInstances,
    /// Collects service metrics through the broker
    ServiceMetricsAdapter,
    /// Lists deployments that no longer have a service instance
    OrphanDeployments,
    /// Backs up service data to the configured destinations
    ServiceBackup,
}

const BROKER_CANONICALIZERS: &[Canonicalizer] = &[
    canonical::plans::plans,
    canonical::quotas::quotas,
    canonical::stemcells::stemcells,
    canonical::cf::cf,
];

const REGISTER_CANONICALIZERS: &[Canonicalizer] = &[
    canonical::plans::broker_link_plans,
    canonical::cf::broker_link_cf,
];

const LINKED_CF_CANONICALIZERS: &[Canonicalizer] = &[canonical::cf::broker_link_cf];

const BROKER_VALIDATORS: &[Validator] = &[
    validation::auth::bosh,
    validation::auth::cf,
    validation::credhub::secure_binding,
    validation::credhub::secure_manifests,
    validation::deployment::releases,
    validation::deployment::stemcells,
    validation::deployment::version_pinning,
    validation::catalog::service_catalog,
    validation::catalog::plan_fields,
    validation::catalog::service_access,
    validation::errands::lifecycle_errands,
    validation::dns::dns_bindings,
    validation::catalog::instance_groups,
    validation::quotas::quotas,
    validation::maintenance::maintenance_info,
];

const REGISTER_VALIDATORS: &[Validator] = &[validation::catalog::linked_service_access];

const ERRAND_VALIDATORS: &[Validator] = &[validation::upgrades::errand_bounds];

const BACKUP_VALIDATORS: &[Validator] = &[validation::backup::destinations];

impl JobKind {
    /// Every job, in release order
    pub const ALL: [Self; 9] = [
        Self::Broker,
        Self::RegisterBroker,
        Self::DeregisterBroker,
        Self::DeleteAllServiceInstancesAndDeregisterBroker,
        Self::UpgradeAllServiceInstances,
        Self::RecreateAllServiceInstances,
        Self::ServiceMetricsAdapter,
        Self::OrphanDeployments,
        Self::ServiceBackup,
    ];

    /// Job name as it appears in the release
    #[must_use]
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Broker => "broker",
            Self::RegisterBroker => "register-broker",
            Self::DeregisterBroker => "deregister-broker",
            Self::DeleteAllServiceInstancesAndDeregisterBroker => {
                "delete-all-service-instances-and-deregister-broker"
            }
            Self::UpgradeAllServiceInstances => "upgrade-all-service-instances",
            Self::RecreateAllServiceInstances => "recreate-all-service-instances",
            Self::ServiceMetricsAdapter => "service-metrics-adapter",
            Self::OrphanDeployments => "orphan-deployments",
            Self::ServiceBackup => "service-backup",
        }
    }

    /// Prefix used in this job's error messages
    #[must_use]
    #[inline]
    pub fn property_prefix(self) -> String {
        self.name().replace('-', "_")
    }

    /// Conventional location of the job's specification
    #[must_use]
    #[inline]
    pub fn default_spec_path(self) -> String {
        format!("jobs/{}/spec.yml", self.name())
    }

    /// Rewrite rules applied before validation
    #[must_use]
    #[inline]
    pub const fn canonicalizers(self) -> &'static [Canonicalizer] {
        match self {
            Self::Broker => BROKER_CANONICALIZERS,
            Self::RegisterBroker => REGISTER_CANONICALIZERS,
            Self::DeregisterBroker
            | Self::DeleteAllServiceInstancesAndDeregisterBroker
            | Self::UpgradeAllServiceInstances
            | Self::RecreateAllServiceInstances => LINKED_CF_CANONICALIZERS,
            Self::ServiceMetricsAdapter
            | Self::OrphanDeployments
            | Self::ServiceBackup => &[],
        }
    }

    /// Validators, in the order they run
    #[must_use]
    #[inline]
    pub const fn validators(self) -> &'static [Validator] {
        match self {
            Self::Broker => BROKER_VALIDATORS,
            Self::RegisterBroker => REGISTER_VALIDATORS,
            Self::UpgradeAllServiceInstances | Self::RecreateAllServiceInstances => {
                ERRAND_VALIDATORS
            }
            Self::ServiceBackup => BACKUP_VALIDATORS,
            Self::DeregisterBroker
            | Self::DeleteAllServiceInstancesAndDeregisterBroker
            | Self::ServiceMetricsAdapter
            | Self::OrphanDeployments => &[],
        }
    }

    /// Build the job's document from a validated context
    ///
    /// # Errors
    ///
    /// Returns an error if a value the document needs cannot be derived,
    /// such as a broker URL without an explicit URI or a linked address.
    #[inline]
    pub fn assemble(self, context: &RenderContext) -> Result<EffectiveDocument, ValidationError> {
        match self {
            Self::Broker => Ok(document::broker::assemble(context)),
            Self::RegisterBroker => document::register::assemble(context),
            Self::DeregisterBroker => Ok(document::deregister::assemble(context, false)),
            Self::DeleteAllServiceInstancesAndDeregisterBroker => {
                Ok(document::deregister::assemble(context, true))
            }
            Self::UpgradeAllServiceInstances | Self::RecreateAllServiceInstances => {
                document::upgrade::assemble(context)
            }
            Self::ServiceMetricsAdapter => document::client::metrics(context),
            Self::OrphanDeployments => document::client::orphans(context),
            Self::ServiceBackup => Ok(document::backup::assemble(context)),
        }
    }
}

impl fmt::Display for JobKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JobKind {
    type Err = InputError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|job| job.name() == s)
            .ok_or_else(|| InputError::unknown_job(s))
    }
}
