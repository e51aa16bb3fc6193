//! Core domain types for sitecache content.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SiteError;

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// The kinds of published material served by the content API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Page,
    News,
    Section,
    Tag,
    Meeting,
    Biography,
    Publication,
}

impl ContentType {
    /// Every content type, in search index output order.
    pub const ALL: [ContentType; 7] = [
        ContentType::Page,
        ContentType::News,
        ContentType::Section,
        ContentType::Tag,
        ContentType::Meeting,
        ContentType::Biography,
        ContentType::Publication,
    ];

    /// Collection name used by the content API and as the key into
    /// `category_enums` configuration.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Page => "pages",
            Self::News => "news",
            Self::Section => "sections",
            Self::Tag => "tags",
            Self::Meeting => "meetings",
            Self::Biography => "biographies",
            Self::Publication => "publications",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

impl std::str::FromStr for ContentType {
    type Err = SiteError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ct| ct.collection() == s)
            .or(match s {
                "posts" | "post" => Some(Self::News),
                _ => None,
            })
            .ok_or_else(|| SiteError::validation(format!("unknown content type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// CategoryEnumEntry
// ---------------------------------------------------------------------------

/// One configured category for a content type.
///
/// `enum` is the provider-side raw code, `slug` the URL path segment and
/// `title` the human label. All three are nullable so the fallback entry for
/// unconfigured content types can be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEnumEntry {
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CategoryEnumEntry {
    pub fn new(
        enum_value: impl Into<String>,
        slug: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            enum_value: Some(enum_value.into()),
            slug: Some(slug.into()),
            title: Some(title.into()),
        }
    }

    /// The entry used for content types with no configuration.
    pub fn unconfigured() -> Self {
        Self::default()
    }
}

/// Content type name → ordered category list.
pub type CategoryEnums = BTreeMap<String, Vec<CategoryEnumEntry>>;

// ---------------------------------------------------------------------------
// Content records
// ---------------------------------------------------------------------------

/// Reference from a page to its owning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRef {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A published content item of any type, as returned by the content API.
///
/// Fields the core reads are typed; everything else is kept verbatim in
/// `extra` so it survives into the search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Raw provider-side category code (meetings, publications, biographies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentRecord {
    /// Minimal record with only a slug, mostly useful for tests and fixtures.
    pub fn with_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: None,
            summary: None,
            category: None,
            section: None,
            created_at: None,
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// The full multi-type export fetched at build time.
///
/// The content API aliases `posts` as `news`; both spellings are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentExport {
    #[serde(default)]
    pub pages: Vec<ContentRecord>,
    #[serde(default, alias = "posts")]
    pub news: Vec<ContentRecord>,
    #[serde(default)]
    pub sections: Vec<ContentRecord>,
    #[serde(default)]
    pub tags: Vec<ContentRecord>,
    #[serde(default)]
    pub meetings: Vec<ContentRecord>,
    #[serde(default)]
    pub biographies: Vec<ContentRecord>,
    #[serde(default)]
    pub publications: Vec<ContentRecord>,
}

impl ContentExport {
    /// Records of a single content type.
    pub fn records(&self, content_type: ContentType) -> &[ContentRecord] {
        match content_type {
            ContentType::Page => &self.pages,
            ContentType::News => &self.news,
            ContentType::Section => &self.sections,
            ContentType::Tag => &self.tags,
            ContentType::Meeting => &self.meetings,
            ContentType::Biography => &self.biographies,
            ContentType::Publication => &self.publications,
        }
    }

    /// Total number of records across all types.
    pub fn len(&self) -> usize {
        ContentType::ALL
            .iter()
            .map(|ct| self.records(*ct).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parses_collection_names() {
        assert_eq!("meetings".parse::<ContentType>().unwrap(), ContentType::Meeting);
        assert_eq!("posts".parse::<ContentType>().unwrap(), ContentType::News);
        assert!("widgets".parse::<ContentType>().is_err());
    }

    #[test]
    fn category_entry_uses_enum_key() {
        let json = r#"{"enum":"BOARD_MEETING","slug":"board","title":"Board Meetings"}"#;
        let entry: CategoryEnumEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(entry, CategoryEnumEntry::new("BOARD_MEETING", "board", "Board Meetings"));

        let back = serde_json::to_string(&entry).expect("serialize");
        assert!(back.contains(r#""enum":"BOARD_MEETING""#));
    }

    #[test]
    fn record_keeps_unknown_fields() {
        let json = r#"{
            "slug": "jan-2023",
            "title": "January Board Meeting",
            "category": "BOARD_MEETING",
            "scheduledDate": "2023-01-12T15:00:00.000Z",
            "createdAt": "2022-12-01T09:30:00.000Z"
        }"#;
        let record: ContentRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.category.as_deref(), Some("BOARD_MEETING"));
        assert!(record.created_at.is_some());
        assert!(record.extra.contains_key("scheduledDate"));

        let back = serde_json::to_value(&record).expect("serialize");
        assert_eq!(back["scheduledDate"], "2023-01-12T15:00:00.000Z");
        assert_eq!(back["slug"], "jan-2023");
    }

    #[test]
    fn export_accepts_posts_alias() {
        let json = r#"{"posts": [{"slug": "a"}, {"slug": "b"}], "tags": [{"slug": "t"}]}"#;
        let export: ContentExport = serde_json::from_str(json).expect("deserialize");
        assert_eq!(export.news.len(), 2);
        assert_eq!(export.records(ContentType::Tag).len(), 1);
        assert_eq!(export.len(), 3);
        assert!(export.pages.is_empty());
    }

    #[test]
    fn export_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/search_export.fixture.json")
            .expect("read fixture");
        let export: ContentExport =
            serde_json::from_str(&fixture).expect("deserialize fixture export");
        assert_eq!(export.pages.len(), 3);
        assert_eq!(export.meetings.len(), 2);
        assert_eq!(export.publications.len(), 1);
        assert_eq!(
            export.pages[1].section.as_ref().map(|s| s.slug.as_str()),
            Some("about")
        );
    }
}
