use std::path::Path;

/// Relative paths (as written in the modpack manifest, e.g. `/mods/a.jar`)
/// that reclamation must never touch.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    entries: Vec<String>,
}

impl IgnoreList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| normalize_separators(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the absolute form of `path` ends with one of the entries
    pub fn matches(&self, path: &Path) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let normalized = normalize_separators(&dunce::simplified(&absolute).to_string_lossy());
        self.entries.iter().any(|entry| normalized.ends_with(entry))
    }
}

fn normalize_separators(s: &str) -> String {
    s.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_suffix_match_on_absolute_path() {
        let list = IgnoreList::new(["/mods/keep.jar", "/config/options.txt"]);
        assert!(list.matches(Path::new("/game/mods/keep.jar")));
        assert!(list.matches(Path::new("/game/config/options.txt")));
        assert!(!list.matches(Path::new("/game/mods/other.jar")));
    }

    #[test]
    fn test_relative_path_is_made_absolute() {
        let list = IgnoreList::new(["/mods/keep.jar"]);
        let relative = PathBuf::from("mods").join("keep.jar");
        assert!(list.matches(&relative));
    }

    #[test]
    fn test_backslash_entries_are_normalized() {
        let list = IgnoreList::new(["\\mods\\keep.jar", ""]);
        assert_eq!(list.len(), 1);
        assert!(list.matches(Path::new("/srv/game/mods/keep.jar")));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let list = IgnoreList::default();
        assert!(list.is_empty());
        assert!(!list.matches(Path::new("/anything")));
    }
}
