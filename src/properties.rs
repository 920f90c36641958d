use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context as _;
use parking_lot::RwLock;
use tracing::{debug, info};

/// String-keyed configuration values consumed by property value binding
pub trait PropertyRegistry: Send + Sync {
    fn get_property(&self, key: &str) -> Option<String>;

    fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    fn put_property(&self, key: &str, value: &str);
}

/// In-memory property registry, loadable from the `.properties` format
#[derive(Debug, Default)]
pub struct DefaultPropertyRegistry {
    values: RwLock<BTreeMap<String, String>>,
}

impl DefaultPropertyRegistry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect()),
        }
    }

    /// Loads `key=value` and `key: value` lines, later keys override earlier ones.
    /// Lines starting with `#` or `!` are comments. Keys and values are trimmed.
    /// Returns the number of loaded pairs.
    pub fn load_str(&self, source: &str) -> usize {
        let pairs = parse(source);
        let count = pairs.len();

        let mut values = self.values.write();
        for (key, value) in pairs {
            debug!(key, "Property loaded");
            values.insert(key.to_owned(), value.to_owned());
        }
        count
    }

    /// # Errors
    /// Returns an error if the file can't be read
    pub fn load_file(&self, path: impl AsRef<Path>) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).with_context(|| format!("Failed to read properties file {}", path.display()))?;
        let count = self.load_str(&source);
        info!(path = %path.display(), count, "Properties file loaded");
        Ok(count)
    }

    /// Loads every `*.properties` file directly under `dir`, in file name order
    ///
    /// # Errors
    /// Returns an error if the directory or one of the files can't be read
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> anyhow::Result<usize> {
        let dir = dir.as_ref();
        let mut paths = fs::read_dir(dir)
            .with_context(|| format!("Failed to read properties directory {}", dir.display()))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to list properties directory {}", dir.display()))?;
        paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "properties"));
        paths.sort();

        let mut count = 0;
        for path in paths {
            count += self.load_file(path)?;
        }
        Ok(count)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl PropertyRegistry for DefaultPropertyRegistry {
    fn get_property(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn contains_property(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    fn put_property(&self, key: &str, value: &str) {
        self.values.write().insert(key.to_owned(), value.to_owned());
    }
}

fn parse(source: &str) -> Vec<(&str, &str)> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let (key, value) = match line.find(|c: char| c == '=' || c == ':') {
                Some(idx) => (&line[..idx], &line[idx + 1..]),
                None => line.split_once(char::is_whitespace).unwrap_or((line, "")),
            };
            let key = key.trim();
            (!key.is_empty()).then(|| (key, value.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse, DefaultPropertyRegistry, PropertyRegistry};

    use std::{env, fs, process};
    use tracing_test::traced_test;

    #[test]
    fn test_parse() {
        let source = "
            # comment
            ! another comment
            app.version = 1.2
            app.name: demo
            url=http://localhost:8080/path
            flag
            spaced value here
            =orphan
        ";
        assert_eq!(
            parse(source),
            [
                ("app.version", "1.2"),
                ("app.name", "demo"),
                ("url", "http://localhost:8080/path"),
                ("flag", ""),
                ("spaced", "value here"),
            ]
        );
    }

    #[test]
    #[traced_test]
    fn test_registry() {
        let registry = DefaultPropertyRegistry::from_pairs([("a", "1")]);
        assert_eq!(registry.load_str("b=2\na=3"), 2);

        assert_eq!(registry.get_property("a").as_deref(), Some("3"));
        assert!(registry.contains_property("b"));
        assert!(!registry.contains_property("c"));

        registry.put_property("c", "4");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    #[traced_test]
    fn test_load_dir() {
        let dir = env::temp_dir().join(format!("beanwire-properties-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.properties"), "key=first\nonly.a=1").unwrap();
        fs::write(dir.join("b.properties"), "key=second").unwrap();
        fs::write(dir.join("ignored.txt"), "ignored=1").unwrap();

        let registry = DefaultPropertyRegistry::new();
        assert_eq!(registry.load_dir(&dir).unwrap(), 3);
        assert_eq!(registry.get_property("key").as_deref(), Some("second"));
        assert!(!registry.contains_property("ignored"));

        assert!(registry.load_file(dir.join("missing.properties")).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
