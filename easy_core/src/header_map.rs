use serde::Serialize;

/// Ordered multimap of response headers.
///
/// Names compare case-insensitively; the spelling of the first occurrence is
/// kept. Values stay in arrival order under their name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(idx) => self.entries[idx].1.push(value.to_string()),
            None => self.entries.push((name.to_string(), vec![value.to_string()])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|idx| self.entries[idx].1.as_slice())
    }

    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops every name except those listed in `keep`.
    pub fn retain_names(&mut self, keep: &[&str]) {
        self.entries
            .retain(|(name, _)| keep.iter().any(|k| k.eq_ignore_ascii_case(name)));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_collect_in_order() {
        let mut map = HeaderMap::new();
        map.append("Set-Cookie", "a=1");
        map.append("Content-Type", "text/plain");
        map.append("set-cookie", "b=2");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("SET-COOKIE").unwrap(), &["a=1", "b=2"]);
        assert_eq!(map.get_first("content-type"), Some("text/plain"));

        let names: Vec<&str> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Set-Cookie", "Content-Type"]);
    }

    #[test]
    fn retain_names_keeps_only_listed() {
        let mut map = HeaderMap::new();
        map.append("A", "1");
        map.append("Set-Cookie", "x=1");
        map.retain_names(&["set-cookie"]);
        assert!(!map.contains("A"));
        assert_eq!(map.get("Set-Cookie").unwrap(), &["x=1"]);
    }
}
