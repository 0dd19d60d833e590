pub mod metrics;
pub mod timeout;

pub use metrics::track_metrics;
pub use timeout::enforce_deadline;
