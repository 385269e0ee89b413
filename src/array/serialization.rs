//! Serde support.
//!
//! An array is written as a plain sequence of its members in order, so
//! the internal shape never leaks into the serialized form. Reading goes
//! through [`ArrayBuilder`], which picks a fresh shape.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Array, ArrayBuilder};

impl<M: Serialize> Serialize for Array<M> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for member in self {
            seq.serialize_element(member)?;
        }
        seq.end()
    }
}

struct ArrayVisitor<M> {
    marker: PhantomData<M>,
}

impl<M> ArrayVisitor<M> {
    const fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

impl<'de, M> Visitor<'de> for ArrayVisitor<M>
where
    M: Deserialize<'de> + Clone,
{
    type Value = Array<M>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of array members")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut builder = ArrayBuilder::new();
        while let Some(member) = seq.next_element()? {
            builder.append(member);
        }
        Ok(builder.finish())
    }
}

impl<'de, M> Deserialize<'de> for Array<M>
where
    M: Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(ArrayVisitor::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(250)]
    fn test_json_is_a_plain_list(#[case] count: i32) {
        let array: Array<i32> = (0..count).collect();
        let json = serde_json::to_string(&array).unwrap();
        let expected = serde_json::to_string(&(0..count).collect::<Vec<_>>()).unwrap();
        assert_eq!(json, expected);

        let decoded: Array<i32> = serde_json::from_str(&json).unwrap();
        decoded.check_invariants();
        assert_eq!(decoded, array);
    }

    #[rstest]
    fn test_rejects_non_sequences() {
        assert!(serde_json::from_str::<Array<i32>>("{\"a\": 1}").is_err());
        assert!(serde_json::from_str::<Array<i32>>("[1, \"x\"]").is_err());
    }
}
