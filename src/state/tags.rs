/// Tag sets and the palette of known tags

/// What a toggle did to the set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// The tag was appended
    Added,
    /// Every occurrence was dropped; these tags must be removed on disk
    Removed(Vec<String>),
}

impl Toggle {
    /// Tags the writer has to delete explicitly
    pub fn removals(&self) -> &[String] {
        match self {
            Toggle::Added => &[],
            Toggle::Removed(tags) => tags,
        }
    }
}

/// Ordered keyword list of one image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new(tags: Vec<String>) -> Self {
        Self { tags }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Remove `tag` if present (all occurrences), append it otherwise
    pub fn toggle(&mut self, tag: &str) -> Toggle {
        if self.contains(tag) {
            self.tags.retain(|t| t != tag);
            Toggle::Removed(vec![tag.to_owned()])
        } else {
            self.tags.push(tag.to_owned());
            Toggle::Added
        }
    }
}

/// Every tag offered as a toggle button, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct Palette {
    tags: Vec<String>,
}

impl Palette {
    /// Add a tag typed by the user or read from a file.
    ///
    /// Surrounding whitespace is trimmed. Blank tags and tags spanning
    /// several lines are refused. Returns the stored tag, or `None` if it
    /// was refused or already known.
    pub fn insert(&mut self, tag: &str) -> Option<&str> {
        let tag = tag.trim();
        if tag.is_empty() || tag.contains(['\n', '\r']) || self.contains(tag) {
            return None;
        }
        self.tags.push(tag.to_owned());
        self.tags.last().map(String::as_str)
    }

    /// Make sure every tag of `set` has a button
    pub fn extend_from(&mut self, set: &TagSet) {
        for tag in set.as_slice() {
            if !self.contains(tag) {
                // Tags read from disk keep their exact text
                self.tags.push(tag.clone());
            }
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}
