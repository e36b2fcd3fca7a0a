use crate::Scalar;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds for the particle-mesh core and its exporters.
///
/// Every variant is unrecoverable locally: constructors reject bad
/// configuration up front and the run loop propagates the first failure to
/// the caller. There are no internal retries.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected construction: a scalar parameter that must be positive wasn't.
    #[error("invalid configuration: {name} must be positive, got {value}")]
    InvalidConfiguration { name: &'static str, value: Scalar },

    /// Rejected construction: particle count disagrees with the position list.
    #[error("particle count {count} does not match {provided} provided positions")]
    CountMismatch { count: usize, provided: usize },

    /// A particle coordinate outside `[0, 1]`.
    #[error("coordinate {0} is outside the periodic unit box")]
    OutOfBounds(Scalar),

    /// Degenerate diagnostic parameters (e.g. a zero-bin histogram).
    #[error("invalid diagnostic request: {0}")]
    Usage(&'static str),

    /// Propagated I/O failures from the export routines.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_the_parameter() {
        let e = Error::InvalidConfiguration {
            name: "time_step",
            value: -0.1,
        };
        let msg = format!("{}", e);
        assert!(msg.contains("time_step"));
        assert!(msg.contains("-0.1"));
    }

    #[test]
    fn out_of_bounds_carries_the_value() {
        let msg = format!("{}", Error::OutOfBounds(1.25));
        assert!(msg.contains("1.25"));
    }
}
