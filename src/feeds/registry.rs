//! Ordered feed registry

use std::io::Read;

use super::config::FeedConfig;
use super::error::ConfigError;

/// Ordered, immutable list of configured feeds
///
/// The sequence defines cycle order. Guaranteed non-empty, so index math
/// can always reduce modulo [`FeedRegistry::count`].
#[derive(Debug, Clone)]
pub struct FeedRegistry {
    feeds: Vec<FeedConfig>,
}

impl FeedRegistry {
    /// Validate and load a feed list
    ///
    /// Fails if the list is empty or any entry lacks a usable URL.
    pub fn load(feeds: Vec<FeedConfig>) -> Result<Self, ConfigError> {
        if feeds.is_empty() {
            return Err(ConfigError::NoFeeds);
        }

        for (index, feed) in feeds.iter().enumerate() {
            if !feed.has_usable_url() {
                return Err(ConfigError::InvalidUrl {
                    index,
                    name: feed.name.clone(),
                });
            }
        }

        Ok(Self { feeds })
    }

    /// Load from a JSON reader (the `feeds.json` format: an array of feeds)
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let feeds: Vec<FeedConfig> = serde_json::from_reader(reader)?;
        Self::load(feeds)
    }

    /// Get a feed by index, wrapping modulo the feed count
    pub fn get(&self, index: usize) -> &FeedConfig {
        &self.feeds[index % self.feeds.len()]
    }

    /// Number of configured feeds (always ≥ 1)
    pub fn count(&self) -> usize {
        self.feeds.len()
    }

    /// Iterate feeds in cycle order
    pub fn iter(&self) -> impl Iterator<Item = &FeedConfig> {
        self.feeds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_feeds() -> Vec<FeedConfig> {
        vec![
            FeedConfig::new("a", "rtsp://a/ch0"),
            FeedConfig::new("b", "rtsp://b/ch0"),
            FeedConfig::new("c", "rtsp://c/ch0"),
        ]
    }

    #[test]
    fn test_load_rejects_empty() {
        let result = FeedRegistry::load(Vec::new());
        assert!(matches!(result, Err(ConfigError::NoFeeds)));
    }

    #[test]
    fn test_load_rejects_bad_url() {
        let feeds = vec![
            FeedConfig::new("ok", "rtsp://a/ch0"),
            FeedConfig::new("broken", "not-a-url"),
        ];
        let result = FeedRegistry::load(feeds);
        match result {
            Err(ConfigError::InvalidUrl { index, name }) => {
                assert_eq!(index, 1);
                assert_eq!(name, "broken");
            }
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_get_wraps() {
        let registry = FeedRegistry::load(three_feeds()).unwrap();
        assert_eq!(registry.count(), 3);
        assert_eq!(registry.get(0).name, "a");
        assert_eq!(registry.get(3).name, "a");
        assert_eq!(registry.get(7).name, "b");
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"name": "front", "url": "rtsp://front/ch0", "comment": "porch"},
            {"name": "back", "url": "rtsp://back/ch0"}
        ]"#;
        let registry = FeedRegistry::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.get(1).name, "back");
    }

    #[test]
    fn test_from_json_malformed() {
        let result = FeedRegistry::from_json_reader("{not json".as_bytes());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
