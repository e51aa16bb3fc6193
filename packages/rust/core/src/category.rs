//! Category code → slug/title resolution.
//!
//! Lookups are a linear scan over the configured list for a content type;
//! lists are short. Content types with no configuration resolve against a
//! single all-null entry, which matches no concrete value.

use tracing::trace;

use sitecache_shared::{AppConfig, CategoryEnumEntry, CategoryEnums, Result, SiteError};

/// Which field of a [`CategoryEnumEntry`] a lookup matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    /// Provider-side raw code.
    Enum,
    /// URL path segment.
    Slug,
}

impl std::str::FromStr for LookupField {
    type Err = SiteError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "enum" => Ok(Self::Enum),
            "slug" => Ok(Self::Slug),
            other => Err(SiteError::validation(format!(
                "unknown lookup field '{other}': expected 'enum' or 'slug'"
            ))),
        }
    }
}

/// Resolves category codes using the `category_enums` configuration.
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    enums: CategoryEnums,
    fallback: [CategoryEnumEntry; 1],
}

impl CategoryResolver {
    pub fn new(enums: CategoryEnums) -> Self {
        Self {
            enums,
            fallback: [CategoryEnumEntry::unconfigured()],
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.category_enums.clone())
    }

    /// Configured entries for `content_type`, or the null fallback.
    pub fn entries(&self, content_type: &str) -> &[CategoryEnumEntry] {
        self.enums
            .get(content_type)
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback)
    }

    /// All entries of `content_type` whose `field` equals `value`.
    pub fn resolve(
        &self,
        content_type: &str,
        value: &str,
        field: LookupField,
    ) -> Vec<&CategoryEnumEntry> {
        let matches: Vec<_> = self
            .entries(content_type)
            .iter()
            .filter(|entry| field_value(entry, field) == Some(value))
            .collect();
        trace!(content_type, value, ?field, matches = matches.len(), "category lookup");
        matches
    }

    /// The first match, if any.
    pub fn first(
        &self,
        content_type: &str,
        value: &str,
        field: LookupField,
    ) -> Option<&CategoryEnumEntry> {
        self.entries(content_type)
            .iter()
            .find(|entry| field_value(entry, field) == Some(value))
    }

    /// The first match, or [`SiteError::UnresolvedCategory`].
    pub fn require(
        &self,
        content_type: &str,
        value: &str,
        field: LookupField,
    ) -> Result<&CategoryEnumEntry> {
        self.first(content_type, value, field)
            .ok_or_else(|| SiteError::unresolved(content_type, value))
    }

    /// URL slug for a raw category code.
    ///
    /// A matching entry with no slug is as unusable for path building as no
    /// match at all, so both are unresolved.
    pub fn slug_for(&self, content_type: &str, raw: &str) -> Result<&str> {
        self.require(content_type, raw, LookupField::Enum)?
            .slug
            .as_deref()
            .ok_or_else(|| SiteError::unresolved(content_type, raw))
    }
}

fn field_value(entry: &CategoryEnumEntry, field: LookupField) -> Option<&str> {
    match field {
        LookupField::Enum => entry.enum_value.as_deref(),
        LookupField::Slug => entry.slug.as_deref(),
    }
}
