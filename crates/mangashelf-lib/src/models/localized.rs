use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
    ser::SerializeMap,
};

/// A locale keyed string mapping, e.g. `{"en": "Frieren", "ja": "..."}`.
///
/// Entries keep the order the upstream sent them in, so "first available
/// locale" means the first key of the JSON object. Non-string values are
/// skipped, and an empty JSON array (which the upstream sends instead of `{}`
/// for some empty descriptions) is read as an empty mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedString(Vec<(String, String)>);

impl LocalizedString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locale: &str, value: &str) -> Self {
        self.insert(locale, value);
        self
    }

    pub fn insert(&mut self, locale: &str, value: &str) {
        match self.0.iter_mut().find(|(key, _)| key == locale) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.0.push((locale.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == locale)
            .map(|(_, value)| value.as_str())
    }

    /// English value if present and non-empty
    pub fn english(&self) -> Option<&str> {
        self.get("en").filter(|value| !value.is_empty())
    }

    /// First non-empty value in upstream order
    pub fn first(&self) -> Option<&str> {
        self.0
            .iter()
            .map(|(_, value)| value.as_str())
            .find(|value| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for LocalizedString {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut localized = LocalizedString::new();
        for (locale, value) in iter {
            localized.insert(locale, value);
        }
        localized
    }
}

impl Serialize for LocalizedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (locale, value) in &self.0 {
            map.serialize_entry(locale, value)?;
        }
        map.end()
    }
}

struct LocalizedVisitor;

impl<'de> Visitor<'de> for LocalizedVisitor {
    type Value = LocalizedString;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of locale to string")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut localized = LocalizedString::new();
        while let Some((locale, value)) = map.next_entry::<String, serde_json::Value>()? {
            if let serde_json::Value::String(value) = value {
                localized.insert(&locale, &value);
            }
        }
        Ok(localized)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(LocalizedString::new())
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(LocalizedString::new())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(LocalizedString::new())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LocalizedVisitor)
    }
}

impl<'de> Deserialize<'de> for LocalizedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LocalizedVisitor)
    }
}
