//! Greedy, order-preserving packing of value sets into statement-sized groups.

use crate::error::{Result, SqlPackError};
use crate::template::VALUE_SEPARATOR;

/// Byte budget for one statement.
///
/// `max_bytes == 0` means the server imposes no limit and nothing is ever split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackingConfig {
    pub reserved_overhead_bytes: usize,
    pub max_bytes: usize,
}

impl PackingConfig {
    pub const fn new(reserved_overhead_bytes: usize, max_bytes: usize) -> Self {
        Self {
            reserved_overhead_bytes,
            max_bytes,
        }
    }

    #[inline]
    pub const fn is_unlimited(&self) -> bool {
        self.max_bytes == 0
    }

    /// Whether a statement needing `total_bytes` fits the budget.
    #[inline]
    pub const fn fits(&self, total_bytes: usize) -> bool {
        self.is_unlimited() || total_bytes <= self.max_bytes
    }

    /// See [`partition`].
    pub fn partition<'v, V: AsRef<str>>(&self, values: &'v [V]) -> Result<Vec<&'v [V]>> {
        partition(values, self.reserved_overhead_bytes, self.max_bytes)
    }
}

/// Splits `values` into contiguous groups so that each group, joined with commas
/// and charged `reserved_bytes`, stays within `max_bytes`.
///
/// Walks the input once and closes the current group as soon as the next value
/// would overflow it. Groups concatenated in order reproduce `values` exactly.
/// With `max_bytes == 0` the whole input is a single group; an empty input
/// yields no groups.
///
/// Fails with [`SqlPackError::ExceedsCapacity`] before producing anything if a
/// value cannot fit even alone.
pub fn partition<V: AsRef<str>>(
    values: &[V],
    reserved_bytes: usize,
    max_bytes: usize,
) -> Result<Vec<&[V]>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    if max_bytes == 0 {
        return Ok(vec![values]);
    }

    let separator = VALUE_SEPARATOR.len();
    let mut groups = Vec::new();
    let mut start = 0;
    // value bytes in the open group, separators excluded
    let mut current = 0;

    for (index, value) in values.iter().enumerate() {
        let len = value.as_ref().len();

        let alone = reserved_bytes + len;
        if alone > max_bytes {
            return Err(SqlPackError::ExceedsCapacity {
                index,
                size: alone,
                max_bytes,
            });
        }

        let separators = (index - start) * separator;
        if reserved_bytes + current + len + separators <= max_bytes {
            current += len;
        } else {
            groups.push(&values[start..index]);
            start = index;
            current = len;
        }
    }
    groups.push(&values[start..]);

    Ok(groups)
}
