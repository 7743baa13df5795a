pub mod aggregate;
pub mod analyzer;
pub mod batch;
pub mod config;
pub mod cycle;
pub mod error;
pub mod impedance;
pub mod median;
pub mod output;
pub mod scheduler;
pub mod source;
pub mod traits;

pub use aggregate::AggregatedPoint;
pub use analyzer::{analyze, LogProgress};
pub use config::SweepConfig;
pub use error::{SweepError, SweepResult};
pub use impedance::ImpedancePoint;
pub use source::{RawSample, SampleStore};
