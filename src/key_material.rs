// Key material mappings
// Descriptive field name -> integer, the form keys take at the crate boundary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::math::BigUnsignedInteger;

pub const ENC_EXPONENT: &str = "ENC_EXPONENT";
pub const DEC_EXPONENT: &str = "DEC_EXPONENT";
pub const MODULUS: &str = "MODULUS";
pub const AES_KEY: &str = "AES_KEY";
pub const AES_IV: &str = "AES_IV";
pub const DES_KEY: &str = "DES_KEY";
pub const DES_IV: &str = "DES_IV";
pub const DH_PRIME: &str = "DH_PRIME";
pub const DH_GENERATOR: &str = "DH_GENERATOR";
pub const DH_SECRET: &str = "DH_SECRET";
pub const DH_PUBLIC: &str = "DH_PUBLIC";
pub const SIGNATURE: &str = "SIGNATURE";

/// Ordered mapping of field names to integer values.
///
/// Converting this to and from a persisted text format is the caller's job.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    fields: BTreeMap<String, BigUnsignedInteger>,
}

impl KeyMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: BigUnsignedInteger) {
        self.fields.insert(field.into(), value);
    }

    pub fn with(mut self, field: impl Into<String>, value: BigUnsignedInteger) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&BigUnsignedInteger> {
        self.fields.get(field)
    }

    /// A field that must be present and non-zero.
    pub fn require(&self, field: &str) -> Result<&BigUnsignedInteger> {
        match self.fields.get(field) {
            Some(value) if !value.is_zero() => Ok(value),
            _ => Err(Error::missing_key(field)),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BigUnsignedInteger)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge another mapping into this one; fields in `other` win.
    pub fn extend(&mut self, other: KeyMaterial) {
        self.fields.extend(other.fields);
    }
}

impl FromIterator<(String, BigUnsignedInteger)> for KeyMaterial {
    fn from_iter<I: IntoIterator<Item = (String, BigUnsignedInteger)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// Values are often secrets, so only the field names are printed.
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_require() {
        let material = KeyMaterial::new()
            .with(MODULUS, BigUnsignedInteger::from_u64(3233))
            .with(ENC_EXPONENT, BigUnsignedInteger::zero());

        assert_eq!(
            material.require(MODULUS).unwrap(),
            &BigUnsignedInteger::from_u64(3233)
        );
        assert_eq!(
            material.require(ENC_EXPONENT).unwrap_err(),
            Error::Validation(ValidationError::MissingKey(ENC_EXPONENT.to_string()))
        );
        assert!(material.require(DEC_EXPONENT).is_err());
    }

    #[test]
    fn test_debug_hides_values() {
        let material = KeyMaterial::new().with(DEC_EXPONENT, BigUnsignedInteger::from_u64(2753));
        let printed = format!("{:?}", material);
        assert!(printed.contains("DEC_EXPONENT"));
        assert!(!printed.contains("2753"));
        assert!(!printed.contains("ac1"));
    }
}
