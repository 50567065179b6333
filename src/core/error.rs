use thiserror::Error;

/// Errors surfaced by the learning core.
///
/// All of these are precondition failures: a bad configuration, a vector of
/// the wrong length, or an update requested out of order. None of them are
/// retryable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("{what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("no forward pass has run yet; nothing to reinforce")]
    NoActivity,

    #[error("degenerate reward landscape: {0}")]
    DegenerateLandscape(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fail with [`Error::ShapeMismatch`] unless `actual == expected`.
pub(crate) fn expect_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            what,
            expected,
            actual,
        })
    }
}
