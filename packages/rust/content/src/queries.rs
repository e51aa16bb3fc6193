//! GraphQL query templates used by the site.
//!
//! Templates reference parameters as `$name`. [`Query::render`] substitutes
//! each one with a GraphQL literal built from the request's params object:
//! strings become escaped string literals, numbers and booleans are inlined.
//! The template text plus params is also what a request's cache key hashes.

use serde_json::Value;

use sitecache_shared::{Result, SiteError};

/// A named query template and the `data` field holding its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub name: &'static str,
    /// Field of `data` returned to callers; `None` returns all of `data`.
    pub collection: Option<&'static str>,
    pub template: &'static str,
}

impl Query {
    /// Substitute `$name` placeholders from `params`.
    pub fn render(&self, params: &Value) -> Result<String> {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let ident_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let ident = &after[..ident_len];

            if ident.is_empty() {
                out.push('$');
            } else {
                let value = params.get(ident).ok_or_else(|| {
                    SiteError::validation(format!(
                        "query '{}' requires parameter '{ident}'",
                        self.name
                    ))
                })?;
                out.push_str(&literal(self.name, ident, value)?);
            }
            rest = &after[ident_len..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Encode a JSON param as a GraphQL literal.
fn literal(query: &str, ident: &str, value: &Value) -> Result<String> {
    match value {
        // A JSON string literal is a valid, fully escaped GraphQL string.
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value.to_string()),
        _ => Err(SiteError::validation(format!(
            "query '{query}' parameter '{ident}' must be a string, number, or boolean"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub const PAGE: Query = Query {
    name: "page",
    collection: Some("pages"),
    template: r#"{
  pages(where: { slug: $slug, isPublished: true }) {
    id createdAt updatedAt title showToc addDivider slug content isPublished summary displayNav
    tags { name slug }
  }
}"#,
};

pub const POST: Query = Query {
    name: "post",
    collection: Some("posts"),
    template: r#"{
  posts(where: { slug: $slug, isPublished: true }) {
    id createdAt updatedAt title slug content isPublished summary
    tags { name slug }
  }
}"#,
};

pub const FRONT_PAGE_NEWS: Query = Query {
    name: "frontPageNews",
    collection: Some("posts"),
    template: r#"{
  posts(sort: "createdAt:desc", limit: $limit, where: { isPublished: true }) {
    title slug isPublished summary content createdAt
    tags { name slug }
  }
}"#,
};

pub const ALL_NEWS: Query = Query {
    name: "allNews",
    collection: Some("posts"),
    template: r#"{
  posts(sort: "createdAt:desc", where: { isPublished: true }) {
    title slug isPublished summary content createdAt
    tags { name slug }
  }
}"#,
};

pub const CONTENT_BY_TAG: Query = Query {
    name: "contentByTag",
    collection: Some("tags"),
    template: r#"{
  tags(where: { slug: $slug }) {
    name slug content
    meetings(sort: "scheduledDate:desc", where: { isPublished: true }) {
      createdAt updatedAt title slug scheduledDate summary category content
      tags { name slug }
    }
    pages(sort: "title:asc", where: { isPublished: true }) {
      title slug summary content addDivider showToc isPublished updatedAt createdAt
      section { title slug }
      tags { name slug }
    }
    publications(sort: "year:desc", where: { isPublished: true }) {
      createdAt updatedAt title year isPublished slug searchMeta summary category addToBanner
      tags { name slug }
      mediaMaterial { summary thumbnail { name url } file { name url hash } }
    }
    biographies(sort: "alphabetizeBy:asc", where: { isPublished: true }) {
      firstName middleName lastName membership order boldTitle slug prefix suffix title content category alphabetizeBy
      tags { name slug }
      headshot { url name }
    }
    news: posts(sort: "createdAt:desc", where: { isPublished: true }) {
      title slug isPublished summary content createdAt
      tags { name slug }
    }
  }
}"#,
};

pub const ALL_SECTIONS: Query = Query {
    name: "allSections",
    collection: Some("sections"),
    template: r#"{
  sections(sort: "order:asc", where: { isPublished: true }) {
    title slug isPublished summary searchMeta order hasSubMenus displayNav displayFooter displayDrawer
    pages(sort: "order:asc", where: { isPublished: true }) {
      title slug order isPublished displayNav summary addDivider
    }
  }
}"#,
};

pub const PAGE_BY_SECTION: Query = Query {
    name: "pageBySection",
    collection: Some("sections"),
    template: r#"{
  sections(where: { slug: $section }) {
    title slug summary hasSubMenus searchMeta
    pages(where: { isPublished: true, slug: $slug }) {
      id createdAt updatedAt title showToc addDivider slug content isPublished summary
      tags { name slug }
    }
  }
}"#,
};

pub const SITE_DESCRIPTION: Query = Query {
    name: "siteDescription",
    collection: Some("sites"),
    template: r#"{
  sites(where: { isPublished: true, slug: $slug }) {
    id title slug summary content siteType createdAt updatedAt
    tags { name slug }
  }
}"#,
};

pub const ALL_SITE_DESCRIPTIONS: Query = Query {
    name: "allSiteDescriptions",
    collection: Some("sites"),
    template: r#"{
  sites(sort: "title:asc", where: { isPublished: true }) {
    id title slug summary content siteType showToc createdAt updatedAt
    tags { name slug }
  }
}"#,
};

pub const ALL_BIOGRAPHIES: Query = Query {
    name: "allBiographies",
    collection: Some("biographies"),
    template: r#"{
  biographies(sort: "alphabetizeBy:asc", where: { isPublished: true }) {
    isPublished firstName middleName lastName boldTitle membership order slug prefix suffix title content category alphabetizeBy
    tags { name slug }
    headshot { url name }
  }
}"#,
};

pub const SINGLE_BIOGRAPHY: Query = Query {
    name: "singleBiography",
    collection: Some("biographies"),
    template: r#"{
  biographies(where: { isPublished: true, slug: $slug }) {
    isPublished firstName middleName lastName boldTitle membership order slug prefix suffix title content category alphabetizeBy
    tags { name slug }
    headshot { url name }
  }
}"#,
};

pub const ALL_MEETINGS: Query = Query {
    name: "allMeetings",
    collection: Some("meetings"),
    template: r#"{
  meetings(sort: "scheduledDate:desc", where: { isPublished: true }) {
    createdAt updatedAt title slug scheduledDate summary category content
    meetingMaterial { name summary file { name hash url } }
    tags { name slug }
  }
}"#,
};

pub const MEETINGS_BY_CATEGORY: Query = Query {
    name: "meetingsByCategory",
    collection: Some("meetings"),
    template: r#"{
  meetings(sort: "scheduledDate:desc", where: { isPublished: true, category: $category }) {
    createdAt updatedAt title slug scheduledDate summary category content
    meetingMaterial { name summary file { name hash url } }
    tags { name slug }
  }
}"#,
};

pub const SINGLE_MEETING: Query = Query {
    name: "singleMeeting",
    collection: Some("meetings"),
    template: r#"{
  meetings(where: { isPublished: true, slug: $slug }) {
    createdAt updatedAt title slug scheduledDate summary category content
    meetingMaterial { name summary file { name hash url } }
    tags { name slug }
  }
}"#,
};

pub const FRONT_PAGE_PUBLICATIONS: Query = Query {
    name: "frontPagePublications",
    collection: Some("publications"),
    template: r#"{
  publications(sort: "createdAt:desc", where: { isPublished: true, addToBanner: true }) {
    createdAt updatedAt title year isPublished slug searchMeta summary category addToBanner
    externalMediaMaterial { name summary url thumbnail { name url hash } }
    mediaMaterial { summary thumbnail { name url } file { name url hash } }
    tags { name slug }
  }
}"#,
};

pub const ALL_PUBLICATIONS: Query = Query {
    name: "allPublications",
    collection: Some("publications"),
    template: r#"{
  publications(sort: "year:desc", where: { isPublished: true }) {
    createdAt updatedAt title year isPublished slug searchMeta summary category addToBanner
    externalMediaMaterial { name summary url thumbnail { name url hash } }
    mediaMaterial { summary thumbnail { name url } file { name url hash } }
    tags { name slug }
  }
}"#,
};

pub const PUBLICATIONS_BY_CATEGORY: Query = Query {
    name: "publicationsByCategory",
    collection: Some("publications"),
    template: r#"{
  publications(sort: "year:desc", where: { isPublished: true, category: $category }) {
    createdAt updatedAt title slug year summary category addToBanner isPublished
    externalMediaMaterial { name summary url thumbnail { name url hash } }
    mediaMaterial { summary thumbnail { name url } file { name url hash } }
    tags { name slug }
  }
}"#,
};

pub const SINGLE_PUBLICATION: Query = Query {
    name: "singlePublication",
    collection: Some("publications"),
    template: r#"{
  publications(where: { isPublished: true, slug: $slug }) {
    createdAt updatedAt title slug year summary category addToBanner isPublished
    externalMediaMaterial { name summary url thumbnail { name url hash } }
    mediaMaterial { summary thumbnail { name url } file { name url hash } }
    tags { name slug }
  }
}"#,
};

/// Everything the search index needs, in one round trip.
pub const SEARCH_EXPORT: Query = Query {
    name: "searchExport",
    collection: None,
    template: r#"{
  pages(where: { isPublished: true }) {
    createdAt updatedAt title summary content slug searchMeta isPublished
    section { title slug summary searchMeta }
    tags { name slug }
  }
  news: posts(sort: "createdAt:desc", where: { isPublished: true }) {
    createdAt updatedAt title slug searchMeta content isPublished summary
    tags { name slug }
  }
  sections(where: { isPublished: true }) {
    createdAt updatedAt title slug searchMeta summary
  }
  tags {
    name slug
  }
  meetings(sort: "scheduledDate:desc", where: { isPublished: true }) {
    title createdAt updatedAt scheduledDate summary searchMeta content category slug isPublished
    tags { name slug }
  }
  biographies(where: { isPublished: true }) {
    firstName middleName lastName membership isPublished order prefix suffix slug title content category alphabetizeBy
    headshot { url name }
  }
  publications(sort: "year:desc,title:asc", where: { isPublished: true }) {
    createdAt updatedAt title slug searchMeta summary category
    tags { name slug }
  }
}"#,
};

/// Slugs and categories needed to enumerate site routes.
pub const ROUTE_EXPORT: Query = Query {
    name: "routeExport",
    collection: None,
    template: r#"{
  pages(where: { isPublished: true }) { slug section { slug } }
  sections(where: { isPublished: true }) { slug }
  news: posts(where: { isPublished: true }) { slug }
  publications(where: { isPublished: true }) { slug category }
  meetings(where: { isPublished: true }) { slug category }
  tags { slug }
}"#,
};

/// Every template, for lookup by name.
pub const ALL: &[Query] = &[
    PAGE,
    POST,
    FRONT_PAGE_NEWS,
    ALL_NEWS,
    CONTENT_BY_TAG,
    ALL_SECTIONS,
    PAGE_BY_SECTION,
    SITE_DESCRIPTION,
    ALL_SITE_DESCRIPTIONS,
    ALL_BIOGRAPHIES,
    SINGLE_BIOGRAPHY,
    ALL_MEETINGS,
    MEETINGS_BY_CATEGORY,
    SINGLE_MEETING,
    FRONT_PAGE_PUBLICATIONS,
    ALL_PUBLICATIONS,
    PUBLICATIONS_BY_CATEGORY,
    SINGLE_PUBLICATION,
    SEARCH_EXPORT,
    ROUTE_EXPORT,
];

/// Find a template by its `name`.
pub fn by_name(name: &str) -> Option<&'static Query> {
    ALL.iter().find(|q| q.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_string_param_as_literal() {
        let text = PAGE.render(&json!({ "slug": "staff" })).unwrap();
        assert!(text.contains(r#"slug: "staff""#));
        assert!(!text.contains('$'));
    }

    #[test]
    fn renders_number_param_inline() {
        let text = FRONT_PAGE_NEWS.render(&json!({ "limit": 3 })).unwrap();
        assert!(text.contains("limit: 3,"));
    }

    #[test]
    fn escapes_injection_attempts() {
        let text = POST
            .render(&json!({ "slug": r#"x" }) { users { password } } #"# }))
            .unwrap();
        assert!(text.contains(r#"slug: "x\" }) { users { password } } #""#));
    }

    #[test]
    fn missing_param_is_validation_error() {
        let err = PAGE_BY_SECTION.render(&json!({ "slug": "staff" })).unwrap_err();
        assert!(err.to_string().contains("requires parameter 'section'"));
    }

    #[test]
    fn object_param_rejected() {
        assert!(PAGE.render(&json!({ "slug": { "nested": true } })).is_err());
    }

    #[test]
    fn static_templates_render_without_params() {
        for query in ALL.iter().filter(|q| !q.template.contains('$')) {
            assert_eq!(query.render(&json!({})).unwrap(), query.template);
        }
    }

    #[test]
    fn names_are_unique() {
        for query in ALL {
            assert_eq!(by_name(query.name), Some(query));
        }
    }
}
