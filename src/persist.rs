//! Binary persistence of arrays.
//!
//! The format is sequential and shape-independent: the member count as a
//! little-endian `u64`, followed by every member in order, each in its own
//! encoding. Arrays are encoded with bincode's legacy configuration
//! (fixed-width little-endian integers), so the layout is stable across
//! releases.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::array::Array;
use crate::error::PersistError;

impl<M: Serialize> Array<M> {
    /// Writes this array to `out` and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Encode`] if a member cannot be encoded or
    /// `out` fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xqarray::array::Array;
    ///
    /// let array: Array<u32> = (1..=3).collect();
    /// let mut bytes = Vec::new();
    /// let written = array.write_to(&mut bytes).unwrap();
    ///
    /// assert_eq!(written, 8 + 3 * 4);
    /// assert_eq!(&bytes[..8], &3_u64.to_le_bytes());
    /// assert_eq!(Array::<u32>::read_from(&mut bytes.as_slice()).unwrap(), array);
    /// ```
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<usize, PersistError> {
        let written = bincode::serde::encode_into_std_write(self, out, bincode::config::legacy())?;
        tracing::debug!(members = self.len(), bytes = written, "array written");
        Ok(written)
    }
}

impl<M: DeserializeOwned + Clone> Array<M> {
    /// Reads an array written by [`write_to`](Self::write_to).
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Decode`] if the input is truncated or not a
    /// valid encoding.
    pub fn read_from<R: Read>(input: &mut R) -> Result<Self, PersistError> {
        let array: Self = bincode::serde::decode_from_std_read(input, bincode::config::legacy())?;
        tracing::debug!(members = array.len(), "array read");
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn encoded(array: &Array<u16>) -> Vec<u8> {
        let mut bytes = Vec::new();
        array.write_to(&mut bytes).unwrap();
        bytes
    }

    #[rstest]
    fn test_empty_array_is_a_zero_count() {
        assert_eq!(encoded(&Array::new()), 0_u64.to_le_bytes());
    }

    #[rstest]
    fn test_layout_is_count_then_members() {
        let array: Array<u16> = vec![1, 2, 0x0304].into();
        let mut expected = 3_u64.to_le_bytes().to_vec();
        expected.extend([1, 0, 2, 0, 4, 3]);
        assert_eq!(encoded(&array), expected);
    }

    #[rstest]
    fn test_encoding_ignores_shape() {
        let appended = (0..500).fold(Array::new(), |array, member| array.snoc(member));
        let prepended = (0..500).rev().fold(Array::new(), |array, member| array.cons(member));
        let joined = appended
            .sub_array(0, 123)
            .unwrap()
            .concat(&appended.sub_array(123, 377).unwrap());
        assert_eq!(encoded(&appended), encoded(&prepended));
        assert_eq!(encoded(&appended), encoded(&joined));
    }

    #[rstest]
    fn test_read_back() {
        let array: Array<u16> = (0..1000).collect();
        let bytes = encoded(&array);
        let decoded = Array::<u16>::read_from(&mut bytes.as_slice()).unwrap();
        decoded.check_invariants();
        assert_eq!(decoded, array);
    }

    #[rstest]
    fn test_truncated_input_fails() {
        let bytes = encoded(&(0..10).collect());
        let result = Array::<u16>::read_from(&mut &bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(PersistError::Decode(_))));
    }
}
