//! Closed-interval bounds for the fixed-width integer scalar types.

use crate::schema::ScalarType;

/// Inclusive integer range, widened to `i128` so that every scalar width
/// (including `u64`) shares one comparison path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntRange {
    pub min: i128,
    pub max: i128,
}

impl IntRange {
    /// Whether `n` lies within the closed interval.
    #[must_use]
    pub fn contains(self, n: i128) -> bool {
        n >= self.min && n <= self.max
    }
}

/// Bounds for an integer scalar type, or `None` for the non-integer scalars.
#[must_use]
pub fn int_range(ty: ScalarType) -> Option<IntRange> {
    let range = match ty {
        ScalarType::Int8 => IntRange {
            min: i128::from(i8::MIN),
            max: i128::from(i8::MAX),
        },
        ScalarType::Uint8 => IntRange {
            min: 0,
            max: i128::from(u8::MAX),
        },
        ScalarType::Int16 => IntRange {
            min: i128::from(i16::MIN),
            max: i128::from(i16::MAX),
        },
        ScalarType::Uint16 => IntRange {
            min: 0,
            max: i128::from(u16::MAX),
        },
        ScalarType::Int32 => IntRange {
            min: i128::from(i32::MIN),
            max: i128::from(i32::MAX),
        },
        ScalarType::Uint32 => IntRange {
            min: 0,
            max: i128::from(u32::MAX),
        },
        ScalarType::Int64 => IntRange {
            min: i128::from(i64::MIN),
            max: i128::from(i64::MAX),
        },
        ScalarType::Uint64 => IntRange {
            min: 0,
            max: i128::from(u64::MAX),
        },
        _ => return None,
    };
    Some(range)
}
