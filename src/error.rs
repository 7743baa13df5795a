use thiserror::Error;

/// Everything that can stop a sweep analysis.
///
/// All failures are deterministic for a given input, so none of them are retried.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid sweep range: max frequency {max}Hz must be above min frequency {min}Hz")]
    InvalidRange { min: f64, max: f64 },

    #[error("sweep range of {decades:.3} decades gives no batches at {batches_per_decade} batches per decade")]
    NoBatches { decades: f64, batches_per_decade: usize },

    #[error("invalid setting {name} = {value}")]
    InvalidSetting { name: &'static str, value: f64 },

    #[error("sweep range would need {batches} batches, more than the limit of {limit}")]
    TooManyBatches { batches: f64, limit: usize },

    #[error("input contains no samples")]
    EmptyInput,

    #[error("batch {index} has an empty line range")]
    EmptyBatch { index: usize },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("zero reference current over a {samples}-sample cycle")]
    ZeroCurrent { samples: usize },

    #[error("batch {index} failed: {source}")]
    Batch {
        index: usize,
        #[source]
        source: Box<SweepError>,
    },

    #[error("batch worker panicked")]
    WorkerPanicked,

    #[error("failed to start batch workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to read recording: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid config file: {0}")]
    ConfigFile(#[from] serde_json::Error),
}

pub type SweepResult<T> = Result<T, SweepError>;
