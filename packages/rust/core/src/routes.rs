//! Static route enumeration for prerendering.

use std::collections::HashSet;

use tracing::{debug, instrument};

use sitecache_shared::{ContentExport, ContentType, Result};

use crate::category::CategoryResolver;
use crate::search_index::SearchIndexAssembler;

/// Every routable path in `export`, each prefixed with `public_path`.
///
/// Order is sections, news, tags, publications, meetings, then the site
/// root. Pages are served under their section routes and are not listed.
/// Repeated paths keep their first position. A meeting or publication
/// with an unconfigured category is an error.
#[instrument(skip_all, fields(records = export.len(), public_path = %public_path))]
pub fn build_routes(
    export: &ContentExport,
    resolver: &CategoryResolver,
    public_path: &str,
) -> Result<Vec<String>> {
    let prefix = public_path.trim_end_matches('/');
    let assembler = SearchIndexAssembler::new(resolver);

    let mut paths = Vec::new();
    for section in &export.sections {
        paths.push(format!("/{}", section.slug));
    }
    for post in &export.news {
        paths.push(format!("/news/{}", post.slug));
    }
    for tag in &export.tags {
        paths.push(format!("/tags/{}", tag.slug));
    }
    for publication in &export.publications {
        let category = assembler.category_slug(ContentType::Publication, publication)?;
        paths.push(format!("/publications/{category}/{}", publication.slug));
    }
    for meeting in &export.meetings {
        let category = assembler.category_slug(ContentType::Meeting, meeting)?;
        paths.push(format!("/meetings/{category}/{}", meeting.slug));
    }
    paths.push("/".to_string());

    let mut seen = HashSet::new();
    let routes: Vec<String> = paths
        .into_iter()
        .map(|path| format!("{prefix}{path}"))
        .filter(|route| seen.insert(route.clone()))
        .collect();

    debug!(routes = routes.len(), "routes built");
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecache_shared::{CategoryEnumEntry, CategoryEnums, ContentRecord, SiteError};

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

    fn categorized(slug: &str, category: &str) -> ContentRecord {
        let mut record = ContentRecord::with_slug(slug);
        record.category = Some(category.into());
        record
    }

    fn export() -> ContentExport {
        ContentExport {
            pages: vec![ContentRecord::with_slug("staff")],
            sections: vec![ContentRecord::with_slug("about")],
            news: vec![ContentRecord::with_slug("hello"), ContentRecord::with_slug("hello")],
            tags: vec![ContentRecord::with_slug("people")],
            publications: vec![categorized("report-2022", "ANNUAL_REPORT")],
            meetings: vec![categorized("jan-2023", "BOARD_MEETING")],
            ..ContentExport::default()
        }
    }

    #[test]
    fn builds_routes_in_order() {
        let routes = build_routes(&export(), &resolver(), "").unwrap();
        assert_eq!(
            routes,
            vec![
                "/about",
                "/news/hello",
                "/tags/people",
                "/publications/annual-reports/report-2022",
                "/meetings/board/jan-2023",
                "/",
            ]
        );
    }

    #[test]
    fn public_path_prefixes_every_route() {
        let routes = build_routes(&export(), &resolver(), "/site/").unwrap();
        assert_eq!(routes.first().map(String::as_str), Some("/site/about"));
        assert_eq!(routes.last().map(String::as_str), Some("/site/"));
        assert!(routes.iter().all(|r| r.starts_with("/site/")));
    }

    #[test]
    fn empty_export_is_just_root() {
        let routes = build_routes(&ContentExport::default(), &resolver(), "").unwrap();
        assert_eq!(routes, vec!["/"]);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let export = ContentExport {
            meetings: vec![categorized("retreat", "STAFF_RETREAT")],
            ..ContentExport::default()
        };
        let err = build_routes(&export, &resolver(), "").unwrap_err();
        assert!(matches!(err, SiteError::UnresolvedCategory { .. }));
    }
}
