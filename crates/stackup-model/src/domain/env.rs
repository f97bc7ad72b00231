use serde::{Deserialize, Serialize};

use crate::KeyValue;

/// Extra environment variables handed to a spawned process.
///
/// Entries are applied on top of the inherited parent environment, in order,
/// so a later entry with the same key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Env(Vec<KeyValue>);

impl Env {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.0.iter()
    }

    /// Value for `key`, resolving duplicates to the last entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|kv| kv.key() == key)
            .map(|kv| kv.value())
    }

    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push(KeyValue::new(key, value));
    }

    /// Builder-style [`Env::push`].
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.push(key, value);
        self
    }
}

impl<T> FromIterator<T> for Env
where
    T: Into<KeyValue>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::Env;

    #[test]
    fn later_entries_override_earlier_ones() {
        let env = Env::new()
            .with("Jwt__Issuer", "localhost")
            .with("Jwt__Audience", "localhost")
            .with("Jwt__Issuer", "example.test");

        assert_eq!(env.len(), 3);
        assert_eq!(env.get("Jwt__Issuer"), Some("example.test"));
        assert_eq!(env.get("Jwt__Audience"), Some("localhost"));
        assert!(env.get("Jwt__Key").is_none());
    }

    #[test]
    fn collects_from_pairs() {
        let env: Env = [("A", "1"), ("B", "2")].into_iter().collect();
        let keys: Vec<_> = env.iter().map(|kv| kv.key()).collect();
        assert_eq!(keys, ["A", "B"]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let env = Env::new().with("FOO", "bar");
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"[{"key":"FOO","value":"bar"}]"#);

        let back: Env = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
    }
}
