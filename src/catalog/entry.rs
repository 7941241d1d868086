//! Catalog entries at each level of the hierarchy
//!
//! Children point back at their parent through a `Weak` handle: the walker
//! keeps every level alive until flattening is done, and a child never
//! extends its parent's lifetime.

use std::sync::{Arc, Weak};

/// One item of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Display label, usually the code or code range ("A00-A09")
    pub name: String,

    /// Link to the child listing, relative to the catalog domain
    pub url: Option<String>,

    /// Item text with the leading code prefix removed
    pub description: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, url: Option<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url,
            description: description.into(),
        }
    }

    /// Link to follow when this entry is expanded, if it has a usable one
    pub fn child_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Anything that was read off a listing page
pub trait Listing {
    fn entry(&self) -> &Entry;
}

/// An entry that belongs to exactly one parent one level up
pub trait Child: Listing + Sized {
    type Parent: Listing;

    /// Level name used in logs and linkage errors
    const LEVEL: &'static str;

    /// Creates the child with its back-reference already set
    fn attach(entry: Entry, parent: &Arc<Self::Parent>) -> Self;
}

/// Root of the hierarchy (e.g. "A00-B99 Certain infectious and parasitic diseases")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub entry: Entry,
}

impl Category {
    pub fn new(entry: Entry) -> Self {
        Self { entry }
    }
}

impl Listing for Category {
    fn entry(&self) -> &Entry {
        &self.entry
    }
}

/// Second level, owned by one category
#[derive(Debug, Clone)]
pub struct SubCategory {
    pub entry: Entry,
    category: Weak<Category>,
}

impl SubCategory {
    pub fn new(entry: Entry, category: &Arc<Category>) -> Self {
        Self {
            entry,
            category: Arc::downgrade(category),
        }
    }

    /// A subcategory whose category is unknown
    pub fn detached(entry: Entry) -> Self {
        Self {
            entry,
            category: Weak::new(),
        }
    }

    pub fn category(&self) -> Option<Arc<Category>> {
        self.category.upgrade()
    }
}

impl Listing for SubCategory {
    fn entry(&self) -> &Entry {
        &self.entry
    }
}

impl Child for SubCategory {
    type Parent = Category;
    const LEVEL: &'static str = "subcategory";

    fn attach(entry: Entry, parent: &Arc<Category>) -> Self {
        Self::new(entry, parent)
    }
}

/// Leaf code, owned by one subcategory
#[derive(Debug, Clone)]
pub struct Disease {
    pub entry: Entry,
    subcategory: Weak<SubCategory>,
}

impl Disease {
    pub fn new(entry: Entry, subcategory: &Arc<SubCategory>) -> Self {
        Self {
            entry,
            subcategory: Arc::downgrade(subcategory),
        }
    }

    /// A code whose subcategory is unknown
    pub fn detached(entry: Entry) -> Self {
        Self {
            entry,
            subcategory: Weak::new(),
        }
    }

    pub fn subcategory(&self) -> Option<Arc<SubCategory>> {
        self.subcategory.upgrade()
    }
}

impl Listing for Disease {
    fn entry(&self) -> &Entry {
        &self.entry
    }
}

impl Child for Disease {
    type Parent = SubCategory;
    const LEVEL: &'static str = "code";

    fn attach(entry: Entry, parent: &Arc<SubCategory>) -> Self {
        Self::new(entry, parent)
    }
}
