//! Soft-failure result for probing operations.

use super::error::ProbeError;

/// A probe result that always carries a usable value.
///
/// When the probe hit an I/O or search problem the value is the safe
/// fallback (`false`, `None`) and `diagnostic` holds the cause, so callers
/// can tell "not installed" apart from "could not look".
#[derive(Debug)]
pub struct Probed<T> {
    value: T,
    diagnostic: Option<ProbeError>,
}

impl<T> Probed<T> {
    /// A clean result.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    /// A fallback value produced because the probe failed.
    pub fn degraded(value: T, diagnostic: ProbeError) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }

    /// Builds a result from a value and an optional diagnostic.
    pub fn from_parts(value: T, diagnostic: Option<ProbeError>) -> Self {
        Self { value, diagnostic }
    }

    /// Borrows the value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Takes the value, discarding any diagnostic.
    pub fn into_value(self) -> T {
        self.value
    }

    /// The probe problem, if any.
    pub fn diagnostic(&self) -> Option<&ProbeError> {
        self.diagnostic.as_ref()
    }

    /// Returns true if the value is a fallback.
    pub fn is_degraded(&self) -> bool {
        self.diagnostic.is_some()
    }

    /// Splits into the value and the optional diagnostic.
    pub fn into_parts(self) -> (T, Option<ProbeError>) {
        (self.value, self.diagnostic)
    }

    /// Maps the value, keeping the diagnostic.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probed<U> {
        Probed {
            value: f(self.value),
            diagnostic: self.diagnostic,
        }
    }
}

impl<T: Default> Default for Probed<T> {
    fn default() -> Self {
        Self::ok(T::default())
    }
}
