//! Search index assembly.
//!
//! Flattens a multi-type [`ContentExport`] into one list in which every
//! record carries the `parentPath` a search result links to.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use sitecache_shared::{ContentExport, ContentRecord, ContentType, Result, SiteError};

use crate::category::CategoryResolver;

/// A content record annotated for client-side search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexItem {
    pub content_type: ContentType,
    pub parent_path: String,
    #[serde(flatten)]
    pub record: ContentRecord,
}

/// Builds search index items, resolving category paths through a
/// [`CategoryResolver`].
#[derive(Debug, Clone)]
pub struct SearchIndexAssembler<'a> {
    resolver: &'a CategoryResolver,
    home_slug: String,
}

impl<'a> SearchIndexAssembler<'a> {
    pub fn new(resolver: &'a CategoryResolver) -> Self {
        Self {
            resolver,
            home_slug: "home".into(),
        }
    }

    /// Slug of the page served at `/`.
    pub fn home_slug(mut self, slug: impl Into<String>) -> Self {
        self.home_slug = slug.into();
        self
    }

    /// Annotate and flatten `export`.
    ///
    /// Output is pages, news, sections, tags, meetings, biographies, then
    /// publications, each in export order. A meeting or publication whose
    /// category is not configured fails the whole assembly.
    #[instrument(skip_all, fields(records = export.len()))]
    pub fn assemble(&self, export: ContentExport) -> Result<Vec<SearchIndexItem>> {
        let ContentExport {
            pages,
            news,
            sections,
            tags,
            meetings,
            biographies,
            publications,
        } = export;

        let groups = [
            (ContentType::Page, pages),
            (ContentType::News, news),
            (ContentType::Section, sections),
            (ContentType::Tag, tags),
            (ContentType::Meeting, meetings),
            (ContentType::Biography, biographies),
            (ContentType::Publication, publications),
        ];

        let mut items = Vec::new();
        for (content_type, records) in groups {
            let count = records.len();
            for record in records {
                let parent_path = self.parent_path(content_type, &record)?;
                items.push(SearchIndexItem {
                    content_type,
                    parent_path,
                    record,
                });
            }
            debug!(%content_type, count, "annotated");
        }

        Ok(items)
    }

    /// The path a record of `content_type` is listed under.
    pub fn parent_path(&self, content_type: ContentType, record: &ContentRecord) -> Result<String> {
        let path = match content_type {
            ContentType::Page => self.page_path(record),
            ContentType::News => "/news".to_string(),
            ContentType::Section => String::new(),
            ContentType::Tag => "/tags".to_string(),
            ContentType::Meeting => {
                format!("/meetings/{}", self.category_slug(content_type, record)?)
            }
            ContentType::Biography => "/about/biographies".to_string(),
            ContentType::Publication => {
                format!("/publications/{}", self.category_slug(content_type, record)?)
            }
        };
        Ok(path)
    }

    fn page_path(&self, page: &ContentRecord) -> String {
        if page.slug == self.home_slug {
            return "/".to_string();
        }
        match &page.section {
            Some(section) if section.slug == page.slug => format!("/{}", section.slug),
            Some(section) => format!("/{}/{}", section.slug, page.slug),
            None => format!("/{}", page.slug),
        }
    }

    pub(crate) fn category_slug(
        &self,
        content_type: ContentType,
        record: &ContentRecord,
    ) -> Result<&'a str> {
        let raw = record.category.as_deref().ok_or_else(|| {
            SiteError::unresolved(content_type.collection(), format!("<none> (slug {})", record.slug))
        })?;
        self.resolver.slug_for(content_type.collection(), raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecache_shared::{CategoryEnumEntry, CategoryEnums, SectionRef};

    fn resolver() -> CategoryResolver {
        let mut enums = CategoryEnums::new();
        enums.insert(
            "meetings".into(),
            vec![CategoryEnumEntry::new("BOARD_MEETING", "board", "Board Meetings")],
        );
        enums.insert(
            "publications".into(),
            vec![CategoryEnumEntry::new("ANNUAL_REPORT", "annual-reports", "Annual Reports")],
        );
        CategoryResolver::new(enums)
    }

    fn page(slug: &str, section: Option<&str>) -> ContentRecord {
        let mut record = ContentRecord::with_slug(slug);
        record.section = section.map(|s| SectionRef {
            slug: s.into(),
            title: None,
            extra: Default::default(),
        });
        record
    }

    fn categorized(slug: &str, category: &str) -> ContentRecord {
        let mut record = ContentRecord::with_slug(slug);
        record.category = Some(category.into());
        record
    }

    #[test]
    fn page_paths() {
        let resolver = resolver();
        let assembler = SearchIndexAssembler::new(&resolver);

        let path = |p: ContentRecord| assembler.parent_path(ContentType::Page, &p).unwrap();
        assert_eq!(path(page("home", None)), "/");
        assert_eq!(path(page("staff", Some("about"))), "/about/staff");
        assert_eq!(path(page("about", Some("about"))), "/about");
        assert_eq!(path(page("faq", None)), "/faq");
    }

    #[test]
    fn custom_home_slug() {
        let resolver = resolver();
        let assembler = SearchIndexAssembler::new(&resolver).home_slug("welcome");
        assert_eq!(
            assembler.parent_path(ContentType::Page, &page("welcome", None)).unwrap(),
            "/"
        );
        assert_eq!(
            assembler.parent_path(ContentType::Page, &page("home", None)).unwrap(),
            "/home"
        );
    }

    #[test]
    fn fixed_prefixes() {
        let resolver = resolver();
        let assembler = SearchIndexAssembler::new(&resolver);
        let record = ContentRecord::with_slug("x");

        assert_eq!(assembler.parent_path(ContentType::News, &record).unwrap(), "/news");
        assert_eq!(assembler.parent_path(ContentType::Section, &record).unwrap(), "");
        assert_eq!(assembler.parent_path(ContentType::Tag, &record).unwrap(), "/tags");
        assert_eq!(
            assembler.parent_path(ContentType::Biography, &record).unwrap(),
            "/about/biographies"
        );
    }

    #[test]
    fn meeting_path_resolves_category() {
        let resolver = resolver();
        let export = ContentExport {
            meetings: vec![categorized("jan-2023", "BOARD_MEETING")],
            ..ContentExport::default()
        };

        let items = SearchIndexAssembler::new(&resolver).assemble(export).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].parent_path, "/meetings/board");
        assert_eq!(items[0].content_type, ContentType::Meeting);
        assert_eq!(items[0].record.slug, "jan-2023");
    }

    #[test]
    fn publication_path_resolves_category() {
        let resolver = resolver();
        let assembler = SearchIndexAssembler::new(&resolver);
        let record = categorized("annual-report-2022", "ANNUAL_REPORT");
        assert_eq!(
            assembler.parent_path(ContentType::Publication, &record).unwrap(),
            "/publications/annual-reports"
        );
    }

    #[test]
    fn unknown_category_fails_assembly() {
        let resolver = resolver();
        let export = ContentExport {
            news: vec![ContentRecord::with_slug("n1")],
            meetings: vec![categorized("retreat", "STAFF_RETREAT")],
            ..ContentExport::default()
        };

        let err = SearchIndexAssembler::new(&resolver).assemble(export).unwrap_err();
        assert!(matches!(
            err,
            SiteError::UnresolvedCategory { ref content_type, ref value }
                if content_type == "meetings" && value == "STAFF_RETREAT"
        ));
    }

    #[test]
    fn missing_category_is_unresolved() {
        let resolver = resolver();
        let assembler = SearchIndexAssembler::new(&resolver);
        let err = assembler
            .parent_path(ContentType::Publication, &ContentRecord::with_slug("orphan"))
            .unwrap_err();
        assert!(err.to_string().contains("orphan"));
    }

    #[test]
    fn output_order_and_no_dedup() {
        let resolver = resolver();
        let export = ContentExport {
            publications: vec![categorized("p1", "ANNUAL_REPORT")],
            tags: vec![ContentRecord::with_slug("t1")],
            pages: vec![page("staff", Some("about")), page("staff", Some("about"))],
            news: vec![ContentRecord::with_slug("n1")],
            ..ContentExport::default()
        };

        let items = SearchIndexAssembler::new(&resolver).assemble(export).unwrap();
        let kinds: Vec<ContentType> = items.iter().map(|i| i.content_type).collect();
        assert_eq!(
            kinds,
            vec![
                ContentType::Page,
                ContentType::Page,
                ContentType::News,
                ContentType::Tag,
                ContentType::Publication,
            ]
        );
    }

    #[test]
    fn item_serializes_flat_with_parent_path() {
        let resolver = resolver();
        let export = ContentExport {
            pages: vec![page("staff", Some("about"))],
            ..ContentExport::default()
        };
        let items = SearchIndexAssembler::new(&resolver).assemble(export).unwrap();
        let json = serde_json::to_value(&items[0]).unwrap();

        assert_eq!(json["parentPath"], "/about/staff");
        assert_eq!(json["contentType"], "page");
        assert_eq!(json["slug"], "staff");
        assert_eq!(json["section"]["slug"], "about");
    }

    #[test]
    fn fixture_export_assembles() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/search_export.fixture.json")
            .expect("read fixture");
        let export: ContentExport = serde_json::from_str(&fixture).expect("parse fixture");

        let mut enums = CategoryEnums::new();
        enums.insert(
            "meetings".into(),
            vec![
                CategoryEnumEntry::new("BOARD_MEETING", "board", "Board Meetings"),
                CategoryEnumEntry::new("RESEARCH_COMMITTEE", "research-committee", "Research Committee"),
            ],
        );
        enums.insert(
            "publications".into(),
            vec![CategoryEnumEntry::new("ANNUAL_REPORT", "annual-reports", "Annual Reports")],
        );
        let resolver = CategoryResolver::new(enums);

        let total = export.len();
        let items = SearchIndexAssembler::new(&resolver).assemble(export).unwrap();
        assert_eq!(items.len(), total);

        let paths: Vec<&str> = items.iter().map(|i| i.parent_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/",
                "/about/staff",
                "/about",
                "/news",
                "",
                "/tags",
                "/meetings/board",
                "/meetings/research-committee",
                "/about/biographies",
                "/publications/annual-reports",
            ]
        );
    }
}
