//! Coarse-grained progress reporting.
//!
//! Long operations report checkpoints to an external sink purely for user
//! feedback; the core calls the interface but does not own any presentation.
//! Fraction computation is resilient to a zero or unknown total step count.

/// Receives coarse progress checkpoints from long operations.
pub trait ProgressSink {
    /// Reports that `done` of `total` steps have completed. `total` may be
    /// zero when the step count is unknown.
    fn checkpoint(&mut self, done: usize, total: usize, status: &str);
}

/// Fraction of work done, guarding against a zero total.
pub fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64
    }
}

/// Sink that discards all checkpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn checkpoint(&mut self, _done: usize, _total: usize, _status: &str) {}
}

/// Sink that forwards checkpoints to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn checkpoint(&mut self, done: usize, total: usize, status: &str) {
        log::info!("[{:>3.0}%] {status}", fraction(done, total) * 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_does_not_divide() {
        assert_eq!(fraction(3, 0), 0.0);
        assert_eq!(fraction(1, 4), 0.25);
    }
}
