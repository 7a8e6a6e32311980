use std::cmp::Ordering;

pub const DEFAULT_PRIORITY: u8 = 1;

/// Identity shared by every pluggable unit.
pub trait Plugin {
    fn name(&self) -> &str;

    /// Lower runs first.
    fn priority(&self) -> u8 {
        DEFAULT_PRIORITY
    }

    /// Identifier used by the `only`/`disable` selection lists.
    fn slug(&self) -> String {
        slugify(self.name())
    }
}

/// An ordered, immutable list of plugins.
pub struct Registry<P: ?Sized> {
    entries: Vec<Box<P>>,
}

impl<P: ?Sized + Plugin> Registry<P> {
    /// Sorts by priority, then by name so equal priorities stay deterministic.
    pub fn new(mut entries: Vec<Box<P>>) -> Self {
        entries.sort_by(|a, b| match a.priority().cmp(&b.priority()) {
            Ordering::Equal => a.name().cmp(b.name()),
            other => other,
        });
        Self { entries }
    }

    /// Applies the `only`/`disable` lists. A non-empty `only` wins.
    pub fn select(self, only: &[String], disable: &[String]) -> Self {
        let only: Vec<String> = only.iter().map(|s| s.to_ascii_lowercase()).collect();
        let disable: Vec<String> = disable.iter().map(|s| s.to_ascii_lowercase()).collect();
        let entries = self
            .entries
            .into_iter()
            .filter(|p| {
                let slug = p.slug();
                if !only.is_empty() {
                    only.contains(&slug)
                } else {
                    !disable.contains(&slug)
                }
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.entries.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().to_ascii_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug
}
