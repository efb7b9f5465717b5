/// Errors raised by dimension, info and cursor operations.
///
/// Numeric payloads are widened to `i128` so that both index widths report
/// the exact offending values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ArrayError {
    #[error("invalid argument `{param}`: {reason}")]
    InvalidArgument { param: &'static str, reason: String },

    #[error("`{param}` value {index} is outside {start}..{end}")]
    IndexOutOfRange {
        param: &'static str,
        index: i128,
        start: i128,
        end: i128,
    },

    #[error("`{op}` by {delta} from flat index {flat} leaves 0..{length}")]
    OperationOutOfRange {
        op: &'static str,
        flat: i128,
        delta: i128,
        length: i128,
    },

    #[error("internal invariant violated: {0}")]
    InternalInvariant(&'static str),
}

pub type Result<T> = std::result::Result<T, ArrayError>;

impl ArrayError {
    pub(crate) fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        ArrayError::InvalidArgument {
            param,
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(
        param: &'static str,
        index: impl Into<i128>,
        start: impl Into<i128>,
        end: impl Into<i128>,
    ) -> Self {
        ArrayError::IndexOutOfRange {
            param,
            index: index.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Fails with `InvalidArgument` unless `got == expected`.
    pub(crate) fn check_rank(param: &'static str, expected: usize, got: usize) -> Result<()> {
        if expected == got {
            Ok(())
        } else {
            Err(Self::invalid(
                param,
                format!("expected {expected} coordinates, got {got}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_values() {
        let e = ArrayError::out_of_range("dim_indices", 7i32, 2i32, 5i32);
        assert_eq!(e.to_string(), "`dim_indices` value 7 is outside 2..5");

        let e = ArrayError::OperationOutOfRange {
            op: "add",
            flat: 3,
            delta: 4,
            length: 5,
        };
        assert_eq!(e.to_string(), "`add` by 4 from flat index 3 leaves 0..5");
    }

    #[test]
    fn rank_check() {
        assert!(ArrayError::check_rank("dim_indices", 2, 2).is_ok());
        let err = ArrayError::check_rank("dim_indices", 2, 3).unwrap_err();
        assert!(matches!(err, ArrayError::InvalidArgument { param: "dim_indices", .. }));
    }
}
