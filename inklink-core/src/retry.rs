//! Bounded retry
//!
//! Every protocol step (plane start, page, end) runs through
//! [`run_with_retries`] with the same attempt budget.

/// Outcome of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Failure<E> {
    /// Attempt may be repeated
    Retryable(E),
    /// Stop immediately
    Fatal(E),
}

impl<E> Failure<E> {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Failure::Retryable(_))
    }

    pub fn error(&self) -> &E {
        match self {
            Failure::Retryable(error) | Failure::Fatal(error) => error,
        }
    }

    pub fn into_error(self) -> E {
        match self {
            Failure::Retryable(error) | Failure::Fatal(error) => error,
        }
    }
}

/// Successful value and the attempt that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    /// 1-based attempt number
    pub attempts: u8,
}

/// Last error once the budget is spent or a fatal error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted<E> {
    pub error: E,
    /// Attempts made, including the failing one
    pub attempts: u8,
    /// Stopped on a fatal error rather than the budget
    pub fatal: bool,
}

/// Run `step` until it succeeds, fails fatally, or `max_attempts` attempts
/// have been made. A budget of zero is treated as one.
///
/// `step` receives the 1-based attempt number.
pub fn run_with_retries<T, E, F>(max_attempts: u8, mut step: F) -> Result<Retried<T>, Exhausted<E>>
where
    F: FnMut(u8) -> Result<T, Failure<E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match step(attempt) {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    attempts: attempt,
                })
            }
            Err(Failure::Retryable(_)) if attempt < max_attempts => attempt += 1,
            Err(Failure::Retryable(error)) => {
                return Err(Exhausted {
                    error,
                    attempts: attempt,
                    fatal: false,
                })
            }
            Err(Failure::Fatal(error)) => {
                return Err(Exhausted {
                    error,
                    attempts: attempt,
                    fatal: true,
                })
            }
        }
    }
}
