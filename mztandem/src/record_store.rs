//! Read only access to the flat key/value records produced by the upstream X!Tandem reader

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
    str::FromStr,
};

use context_error::{BoxedError, Context, CreateError};
use indexmap::IndexMap;

use crate::{
    error::{TandemError, TandemErrorKind},
    key::FieldName,
};

/// A flat lookup from synthetic string keys (e.g. `hyperscore_s1_p1_d1`) to textual values.
///
/// An absent key is the only termination signal for the peptide and domain scans, so an
/// implementation should only return `None` when the key was truly never written.
pub trait RecordStore {
    /// Get the value stored for the given key
    fn get(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl<S: BuildHasher> RecordStore for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        Self::get(self, key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl RecordStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        Self::get(self, key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl<S: BuildHasher> RecordStore for IndexMap<String, String, S> {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        Self::get(self, key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

/// Render a JSON value the way the upstream reader would have stringified it, `null` is absent.
fn json_text(value: &serde_json::Value) -> Option<Cow<'_, str>> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

impl RecordStore for serde_json::Map<String, serde_json::Value> {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        Self::get(self, key).and_then(json_text)
    }
}

impl<S: BuildHasher> RecordStore for HashMap<String, serde_json::Value, S> {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        Self::get(self, key).and_then(json_text)
    }
}

/// A missing store behaves as a store without any records.
impl<R: RecordStore> RecordStore for Option<R> {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(|store| store.get(key))
    }
}

impl<R: RecordStore + ?Sized> RecordStore for &R {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).get(key)
    }
}

/// Typed access to the fields of a single composite key (a peptide or a domain).
pub(crate) struct Fields<'a, R: ?Sized, K> {
    store: &'a R,
    key: K,
}

impl<'a, R: RecordStore + ?Sized, K: std::fmt::Display + Copy> Fields<'a, R, K> {
    pub(crate) const fn new(store: &'a R, key: K) -> Self {
        Self { store, key }
    }

    /// Get the raw text of a field
    pub(crate) fn text(&self, field: impl FieldName) -> Option<Cow<'a, str>> {
        self.store.get(&format!("{field}_{}", self.key))
    }

    /// Get a field as an owned string, absent fields are the empty string
    pub(crate) fn string(&self, field: impl FieldName) -> String {
        self.text(field).map(Cow::into_owned).unwrap_or_default()
    }

    /// Parse a field, an absent field is `None` while a present but malformed field is an error.
    /// Values are parsed as is, surrounding whitespace makes a value malformed.
    pub(crate) fn parse<T: FromStr>(&self, field: impl FieldName) -> Result<Option<T>, TandemError> {
        self.text(field)
            .map(|value| parse_value(&value, field, self.key))
            .transpose()
    }

    /// Parse a field, using the type's zero value if it is absent
    pub(crate) fn parse_or_default<T: FromStr + Default>(
        &self,
        field: impl FieldName,
    ) -> Result<T, TandemError> {
        self.parse(field).map(Option::unwrap_or_default)
    }
}

/// Parse a single value, naming the field and composite key in the error.
pub(crate) fn parse_value<T: FromStr>(
    value: &str,
    field: impl FieldName,
    key: impl std::fmt::Display,
) -> Result<T, TandemError> {
    value.parse().map_err(|_| {
        let full_key = format!("{field}_{key}");
        BoxedError::new(
            TandemErrorKind::MalformedValue,
            format!("Invalid {field} value"),
            format!(
                "The value for '{full_key}' could not be parsed as {}",
                std::any::type_name::<T>()
            ),
            Context::none()
                .source(full_key.as_str())
                .lines(0, value)
                .to_owned(),
        )
    })
}

#[cfg(test)]
mod tests {
    use context_error::*;

    use super::*;
    use crate::key::{DomainField, PeptideField, PeptideKey};

    #[test]
    fn json_values() {
        let serde_json::Value::Object(records) = serde_json::json!({
            "seq_s1_p1": "PEPTIDE",
            "start_s1_p1": 12,
            "URL_s1_p1": null,
        }) else {
            unreachable!()
        };
        let key = PeptideKey::new(1, 1);
        let fields = Fields::new(&records, key);
        assert_eq!(fields.string(PeptideField::Sequence), "PEPTIDE");
        assert_eq!(fields.parse::<usize>(PeptideField::Start).unwrap(), Some(12));
        assert_eq!(fields.text(PeptideField::Url), None);
    }

    #[test]
    fn absent_versus_malformed() {
        let records: HashMap<String, String> = [
            ("mh_s1_p1_d1".to_string(), "1234.5".to_string()),
            ("expect_s1_p1_d1".to_string(), "abc".to_string()),
        ]
        .into_iter()
        .collect();
        let fields = Fields::new(&records, PeptideKey::new(1, 1).domain(1));
        assert_eq!(fields.parse::<f64>(DomainField::Mh).unwrap(), Some(1234.5));
        assert_eq!(
            fields.parse_or_default::<f64>(DomainField::HyperScore).unwrap(),
            0.0
        );
        let error = fields.parse::<f64>(DomainField::Expect).unwrap_err();
        assert!(matches!(error.get_kind(), TandemErrorKind::MalformedValue));
        assert!(error.get_long_description().contains("expect_s1_p1_d1"));
    }

    #[test]
    fn whitespace_is_malformed() {
        let records: HashMap<String, String> = [
            ("start_s1_p1".to_string(), " 5".to_string()),
            ("mh_s1_p1_d1".to_string(), "1234.5 ".to_string()),
        ]
        .into_iter()
        .collect();
        let peptide = Fields::new(&records, PeptideKey::new(1, 1));
        let error = peptide.parse::<usize>(PeptideField::Start).unwrap_err();
        assert!(matches!(error.get_kind(), TandemErrorKind::MalformedValue));
        let domain = Fields::new(&records, PeptideKey::new(1, 1).domain(1));
        assert!(domain.parse::<f64>(DomainField::Mh).is_err());
    }

    #[test]
    fn missing_store() {
        let records: Option<BTreeMap<String, String>> = None;
        assert_eq!(RecordStore::get(&records, "s1_p1"), None);
    }
}
