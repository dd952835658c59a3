//! # Quantizer
//!
//! Quantizers force continuous inputs onto the discrete entries of a lookup table. Musically they are used to make a
//! smoothly varying pitch signal land on in-tune notes.
//!
//! Lookups always resolve to an entry that is actually present in the table. Values that fall between two entries
//! resolve to the LOWER entry, even when the upper entry is numerically closer. Values outside the table clamp to the
//! first or last entry.

use heapless::Vec;

use crate::error::{Error, Result};

/// The most entries any lookup table can hold.
///
/// Ten octaves of semitones plus a reference entry need 121 slots, this leaves a little headroom.
pub const TABLE_CAPACITY: usize = 128;

/// A quantizer conversion is represented here.
///
/// The value is copied verbatim out of the table, never interpolated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantized {
    /// The index of the table entry that was selected
    pub index: usize,
    /// The table entry itself
    pub value: f32,
}

/// An immutable, strictly ascending lookup table is represented here.
///
/// The ordering is checked once at construction, so lookups can't fail afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleTable {
    values: Vec<f32, TABLE_CAPACITY>,
}

impl ScaleTable {
    /// `ScaleTable::new(vs)` is a new table holding a copy of the values `vs`.
    ///
    /// # Arguments
    ///
    /// * `values` - the table entries, must be non-empty and strictly ascending
    ///
    /// # Errors
    ///
    /// * `EmptyTable` if `values` is empty
    /// * `NotAscending` if any entry is not greater than the one before it
    /// * `CapacityExceeded` if there are more than `TABLE_CAPACITY` values
    pub fn new(values: &[f32]) -> Result<Self> {
        check_ascending(values)?;
        let values = Vec::from_slice(values).map_err(|_| Error::CapacityExceeded {
            len: values.len(),
            capacity: TABLE_CAPACITY,
        })?;
        Ok(Self { values })
    }

    /// `t.quantize(q)` is the table entry that query `q` snaps to, along with its index.
    ///
    /// Runs in O(log N) time and never allocates.
    pub fn quantize(&self, query: f32) -> Quantized {
        search(&self.values, query)
    }

    /// `t.get(i)` is the entry at index `i`, if there is one.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// `t.first()` is the lowest entry.
    pub fn first(&self) -> f32 {
        self.values[0]
    }

    /// `t.last()` is the highest entry.
    pub fn last(&self) -> f32 {
        self.values[self.values.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false, a table can't be built empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// `quantize(t, q)` is the entry of table `t` that query `q` snaps to, along with its index.
///
/// The table ordering is checked on every call, which costs O(N) comparisons on top of the O(log N) search. Build a
/// `ScaleTable` once and use `ScaleTable::quantize` for O(log N) lookups.
///
/// # Arguments
///
/// * `table` - the lookup table, must be non-empty and strictly ascending
///
/// * `query` - the value to quantize
///
/// # Examples
///
/// ```
/// # use cv_quantizer::quantizer::quantize;
/// let table = [1.0, 2.0, 4.0];
/// // 3.9 is much closer to 4.0, but values between two entries always go to the lower one
/// assert_eq!(quantize(&table, 3.9).unwrap().value, 2.0);
/// ```
pub fn quantize(table: &[f32], query: f32) -> Result<Quantized> {
    check_ascending(table)?;
    Ok(search(table, query))
}

/// `search(t, q)` is the binary search over a table already known to be non-empty and ascending.
fn search(table: &[f32], query: f32) -> Quantized {
    let last = table.len() - 1;

    if query <= table[0] {
        return Quantized {
            index: 0,
            value: table[0],
        };
    }
    if table[last] <= query {
        return Quantized {
            index: last,
            value: table[last],
        };
    }

    // table[lower] <= query <= table[upper] holds for the whole search
    let mut lower = 0;
    let mut upper = last;

    while 1 < upper - lower {
        let mid = (lower + upper) >> 1;
        let candidate = table[mid];

        if query == candidate {
            return Quantized {
                index: mid,
                value: candidate,
            };
        } else if candidate < query {
            lower = mid;
        } else {
            upper = mid;
        }
    }

    Quantized {
        index: lower,
        value: table[lower],
    }
}

fn check_ascending(table: &[f32]) -> Result<()> {
    if table.is_empty() {
        return Err(Error::EmptyTable);
    }
    // written as a negated `<` so that NaN entries are rejected too
    match table.windows(2).position(|pair| !(pair[0] < pair[1])) {
        Some(pos) => Err(Error::NotAscending { index: pos + 1 }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{build_frequency_table, build_voltage_table};

    const TABLE: [f32; 6] = [1.0, 2.0, 3.0, 5.0, 8.0, 13.0];

    #[test]
    fn every_result_is_an_entry_of_the_table() {
        let mut q = -2.0_f32;
        while q < 16.0 {
            let conversion = quantize(&TABLE, q).unwrap();
            assert_eq!(TABLE[conversion.index], conversion.value);
            q += 0.1;
        }
    }

    #[test]
    fn values_at_or_below_the_first_entry_clamp_to_it() {
        assert_eq!(quantize(&TABLE, 1.0).unwrap().value, 1.0);
        assert_eq!(quantize(&TABLE, 0.5).unwrap().value, 1.0);
        assert_eq!(quantize(&TABLE, -1000.0).unwrap().index, 0);
    }

    #[test]
    fn values_at_or_above_the_last_entry_clamp_to_it() {
        assert_eq!(quantize(&TABLE, 13.0).unwrap().value, 13.0);
        assert_eq!(quantize(&TABLE, 1E6).unwrap().index, 5);
    }

    #[test]
    fn exact_entries_are_fixed_points() {
        for (i, v) in TABLE.iter().enumerate() {
            let conversion = quantize(&TABLE, *v).unwrap();
            assert_eq!(conversion.index, i);
            assert_eq!(conversion.value, *v);
        }
    }

    #[test]
    fn values_between_entries_round_down_even_when_the_upper_entry_is_closer() {
        for i in 0..TABLE.len() - 1 {
            let near_upper = TABLE[i + 1] - 0.01;
            let near_lower = TABLE[i] + 0.01;
            assert_eq!(quantize(&TABLE, near_upper).unwrap().value, TABLE[i]);
            assert_eq!(quantize(&TABLE, near_lower).unwrap().value, TABLE[i]);
        }
    }

    #[test]
    fn single_entry_table_always_returns_its_entry() {
        let table = [440.0];
        assert_eq!(quantize(&table, 0.0).unwrap().value, 440.0);
        assert_eq!(quantize(&table, 880.0).unwrap().value, 440.0);
    }

    #[test]
    fn two_entry_table_rounds_down_between_them() {
        let table = [10.0, 20.0];
        assert_eq!(quantize(&table, 19.9).unwrap().index, 0);
        assert_eq!(quantize(&table, 20.0).unwrap().index, 1);
    }

    #[test]
    fn empty_table_is_an_error() {
        assert_eq!(quantize(&[], 1.0), Err(Error::EmptyTable));
        assert_eq!(ScaleTable::new(&[]), Err(Error::EmptyTable));
    }

    #[test]
    fn unordered_table_is_an_error() {
        assert_eq!(
            quantize(&[1.0, 3.0, 2.0], 2.5),
            Err(Error::NotAscending { index: 2 })
        );
        assert_eq!(
            ScaleTable::new(&[1.0, 1.0]),
            Err(Error::NotAscending { index: 1 })
        );
        assert_eq!(
            ScaleTable::new(&[1.0, f32::NAN]),
            Err(Error::NotAscending { index: 1 })
        );
    }

    #[test]
    fn oversized_table_is_an_error() {
        let mut values = [0.0_f32; TABLE_CAPACITY + 1];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f32;
        }
        assert_eq!(
            ScaleTable::new(&values),
            Err(Error::CapacityExceeded {
                len: TABLE_CAPACITY + 1,
                capacity: TABLE_CAPACITY
            })
        );
    }

    #[test]
    fn nan_query_resolves_to_the_first_entry() {
        assert_eq!(quantize(&TABLE, f32::NAN).unwrap().index, 0);
    }

    #[test]
    fn scale_table_matches_the_checked_lookup() {
        let table = ScaleTable::new(&TABLE).unwrap();
        let mut q = 0.0_f32;
        while q < 14.0 {
            assert_eq!(table.quantize(q), quantize(&TABLE, q).unwrap());
            q += 0.25;
        }
    }

    #[test]
    fn every_entry_of_the_a0_pitch_table_is_a_fixed_point() {
        let table = build_frequency_table(27.5, 120).unwrap();
        for (i, v) in table.as_slice().iter().enumerate() {
            assert_eq!(table.quantize(*v), Quantized { index: i, value: *v });
            assert_eq!(quantize(table.as_slice(), *v).unwrap().index, i);
        }
    }

    #[test]
    fn pitch_table_midpoints_round_down() {
        let table = build_frequency_table(27.5, 120).unwrap();
        for (i, pair) in table.as_slice().windows(2).enumerate() {
            let midpoint = (pair[0] + pair[1]) / 2.0;
            let just_below_upper = pair[1] - (pair[1] - pair[0]) * 0.01;
            assert_eq!(table.quantize(midpoint).index, i);
            assert_eq!(table.quantize(just_below_upper).index, i);
        }
    }

    #[test]
    fn voltage_table_lookups_round_down_to_the_semitone() {
        let table = build_voltage_table(-5..=4, 12).unwrap();
        assert_eq!(table.quantize(0.05).value, 0.0);
        assert_eq!(table.quantize(-5.0), Quantized { index: 1, value: -5.0 });
        assert_eq!(table.quantize(-6.0).index, 0);
        assert_eq!(table.quantize(5.0).index, 120);
        assert_eq!(table.quantize(0.99).index, 61 + 11);
    }

    #[test]
    fn repeated_lookups_are_identical() {
        let table = ScaleTable::new(&TABLE).unwrap();
        assert_eq!(table.quantize(6.5), table.quantize(6.5));
    }
}
