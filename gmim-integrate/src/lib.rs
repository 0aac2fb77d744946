//! Integration of normalized signals across samples.
//!
//! Chromosomes present in every sample are combined bin by bin; the
//! integrated score of a bin is the product of the samples' scores.

pub mod integrator;
pub mod lockstep;
pub mod matcher;

// re-exports
pub use integrator::{GroupOutcome, GroupStatus, IntegrationResult, MultiSampleIntegrator};
pub use lockstep::{IntegratedFile, LockstepSummary, integrate_files, integrate_readers};
pub use matcher::{IntegrationGroup, Matching, SampleChromosomes, match_chromosomes};
