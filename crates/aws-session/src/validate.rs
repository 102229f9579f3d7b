use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {0} must be set")]
pub(crate) struct FieldError(pub &'static str);

/// Records with required fields.
///
/// Implementations check their required fields in declaration order and stop at the
/// first one left at its zero value. Optional fields are never inspected.
pub(crate) trait Validate {
    fn validate(&self) -> Result<(), FieldError>;
}

/// Zero value of a field type: empty string, zero integer, empty sequence.
pub(crate) trait Zero {
    fn is_zero(&self) -> bool;
}

impl Zero for str {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Zero for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Zero for [T] {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Zero for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! impl_zero_int {
    ($($t:ty),*) => {
        $(impl Zero for $t {
            fn is_zero(&self) -> bool {
                *self == 0
            }
        })*
    };
}

impl_zero_int!(i32, i64, u32, u64);

pub(crate) fn require<T: Zero + ?Sized>(name: &'static str, value: &T) -> Result<(), FieldError> {
    if value.is_zero() {
        return Err(FieldError(name));
    }
    Ok(())
}

/// Required record field: validated recursively, its innermost violation wins.
pub(crate) fn require_record<T: Validate>(value: &T) -> Result<(), FieldError> {
    value.validate()
}
