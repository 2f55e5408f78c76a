use crate::Value;
use std::{
    fmt,
    hash::{Hash, Hasher},
};

const FNV_SEED: u64 = 0x811C9DC5;
const FNV_PRIME: u64 = 0x01000193;

// FNV-1a over a byte slice
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_SEED;
    for byte in bytes {
        hash = (hash ^ *byte as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// The key type used by object values
///
/// Wraps a [Value] with the language's hashing rules: strings hash their
/// bytes, numeric variants hash their raw byte representation, and every
/// other variant hashes to zero. Equality is the language's structural
/// value equality.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueKey(Value);

impl ValueKey {
    /// Returns a reference to the key's value
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Returns the language hash of the key's value
    pub fn language_hash(&self) -> u64 {
        match &self.0 {
            Value::Str(s) => fnv1a(s.as_bytes()),
            Value::Int(i) => fnv1a(&i.to_ne_bytes()),
            Value::Float(f) => fnv1a(&f.to_ne_bytes()),
            Value::Double(d) => fnv1a(&d.to_ne_bytes()),
            _ => 0,
        }
    }
}

impl Eq for ValueKey {}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.language_hash());
    }
}

impl From<Value> for ValueKey {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for ValueKey {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueMap;

    #[test]
    fn string_keys_hash_their_bytes() {
        let a = ValueKey::from("key");
        let b = ValueKey::from("key");
        assert_eq!(a.language_hash(), b.language_hash());
        assert_ne!(a.language_hash(), ValueKey::from("other").language_hash());
    }

    #[test]
    fn fnv1a_reference_value() {
        // FNV-1a of "a" with a 32-bit seed and prime
        assert_eq!(fnv1a(b""), FNV_SEED);
        assert_eq!(fnv1a(b"a"), (FNV_SEED ^ b'a' as u64).wrapping_mul(FNV_PRIME));
    }

    #[test]
    fn non_hashable_variants_hash_to_zero() {
        assert_eq!(ValueKey::from(Value::Undefined).language_hash(), 0);
        assert_eq!(ValueKey::from(Value::Null).language_hash(), 0);
        assert_eq!(ValueKey::from(Value::Bool(true)).language_hash(), 0);
    }

    #[test]
    fn heterogeneous_keys() {
        let mut map = ValueMap::default();
        map.insert(ValueKey::from("name"), Value::from("tama"));
        map.insert(ValueKey::from(Value::Int(1)), Value::from("one"));

        assert_eq!(map.get(&ValueKey::from("name")), Some(&Value::from("tama")));
        assert_eq!(
            map.get(&ValueKey::from(Value::Int(1))),
            Some(&Value::from("one"))
        );
        assert_eq!(map.get(&ValueKey::from(Value::Int(2))), None);
    }
}
