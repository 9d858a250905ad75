//! Listings page parsing.
//!
//! Turns the KU employment listings page into [`SummaryRecord`]s. The page is
//! normally a table with a fixed header row; when no such table exists every
//! link that looks like a posting is used instead, with only title, URL and
//! category known.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{FetchError, FetchResult, ListingError};
use crate::extract::normalize_whitespace;
use crate::record::SummaryRecord;
use crate::session::Session;

/// Origin used to resolve relative posting links.
pub const DEFAULT_BASE_URL: &str = "https://employment.ku.edu";

/// Header labels that identify the listings table.
pub const LISTINGS_HEADER_LABELS: &[&str] = &[
    "Posting Title",
    "ID",
    "Department",
    "Primary Campus",
    "Reg/Temp",
    "Review Begins",
];

lazy_static! {
    static ref CATEGORY_REGEX: Regex = Regex::new(r"/jobs/(staff|faculty|students)/").unwrap();

    static ref INTERNAL_ONLY_REGEX: Regex = Regex::new(r"(?i)^\[\*\*Internal Only\*\*\]\s*").unwrap();

    static ref TABLE: Selector = Selector::parse("table").unwrap();
    static ref HEADER_ROW: Selector = Selector::parse("thead tr").unwrap();
    static ref HEADER_CELL: Selector = Selector::parse("th").unwrap();
    static ref ROW: Selector = Selector::parse("tr").unwrap();
    static ref BODY: Selector = Selector::parse("tbody").unwrap();
    static ref CELL: Selector = Selector::parse("td, th").unwrap();
    static ref LINK: Selector = Selector::parse("a[href]").unwrap();
}

/// `staff`, `faculty` or `students`, from a posting URL's path.
pub fn category_from_url(url: &str) -> Option<String> {
    CATEGORY_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse the listings page into summary records, in page order.
///
/// Relative links are resolved against `base_url`.
pub fn parse_listings(html: &str, base_url: &str) -> Result<Vec<SummaryRecord>, ListingError> {
    let base = Url::parse(base_url)?;
    let document = Html::parse_document(html);

    let records = match document.select(&TABLE).find(|table| is_listings_table(*table)) {
        Some(table) => parse_table(table, &base),
        None => {
            debug!("No listings table found, falling back to posting links");
            parse_posting_links(&document, &base)
        }
    };

    info!(count = records.len(), "Parsed listings page");
    Ok(records)
}

/// Fetch the listings page body.
pub async fn fetch_listings<S: Session + ?Sized>(
    session: &S,
    url: &str,
    timeout: Duration,
) -> FetchResult<String> {
    info!(url = %url, "Fetching listings page");
    let response = session.get(url, &[], Some(timeout)).await?;
    if !response.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(response.body)
}

fn is_listings_table(table: ElementRef<'_>) -> bool {
    let header_text = match table.select(&HEADER_ROW).next() {
        Some(row) => row.select(&HEADER_CELL).map(cell_text).collect::<Vec<_>>(),
        None => match table.select(&ROW).next() {
            Some(row) => row.select(&CELL).map(cell_text).collect(),
            None => return false,
        },
    }
    .join(" ");

    !header_text.is_empty()
        && LISTINGS_HEADER_LABELS
            .iter()
            .all(|label| header_text.contains(label))
}

fn parse_table(table: ElementRef<'_>, base: &Url) -> Vec<SummaryRecord> {
    let body = table.select(&BODY).next().unwrap_or(table);

    body.select(&ROW)
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
            let link = cells.first()?.select(&LINK).next()?;
            let detail_url = resolve(base, link.value().attr("href")?)?;

            let title = INTERNAL_ONLY_REGEX
                .replace(&cell_text(link), "")
                .into_owned();
            let column = |n: usize| cells.get(n).map(|c| cell_text(*c)).filter(|t| !t.is_empty());

            Some(SummaryRecord {
                title,
                category: category_from_url(&detail_url),
                posting_id: column(1),
                department: column(2),
                campus: column(3),
                employment_type: column(4),
                review_begins: column(5),
                detail_url,
                skills: None,
            })
        })
        .collect()
}

fn parse_posting_links(document: &Html, base: &Url) -> Vec<SummaryRecord> {
    document
        .select(&LINK)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            if !href.starts_with("/jobs/") || !CATEGORY_REGEX.is_match(href) {
                return None;
            }
            let detail_url = resolve(base, href)?;
            let category = category_from_url(&detail_url);

            let mut record = SummaryRecord::new(cell_text(link), detail_url);
            record.category = category;
            Some(record)
        })
        .collect()
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    match base.join(href.trim()) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!(href = %href, error = %e, "Skipping unresolvable link");
            None
        }
    }
}

fn cell_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSession;

    const TABLE_PAGE: &str = r#"
        <html><body>
        <table class="nav"><tr><td>Home</td><td>Search</td></tr></table>
        <table>
          <thead><tr>
            <th>Posting Title</th><th>ID</th><th>Department</th>
            <th>Primary Campus</th><th>Reg/Temp</th><th>Review Begins</th>
          </tr></thead>
          <tbody>
            <tr>
              <td><a href="/jobs/staff/data-analyst-123">Data   Analyst</a></td>
              <td>31234</td><td>Institutional Research</td><td>Lawrence</td>
              <td>Regular</td><td>11/01/2026</td>
            </tr>
            <tr>
              <td><a href="https://employment.ku.edu/jobs/faculty/prof-9">[**Internal Only**] Professor</a></td>
              <td>31235</td><td></td><td>KU Medical Center</td><td></td><td></td>
            </tr>
            <tr><td>No link in this row</td><td>0</td></tr>
            <tr>
              <td><a href="/jobs/students/assistant-7">Student Assistant</a></td>
              <td>31236</td>
            </tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_table_rows() {
        let records = parse_listings(TABLE_PAGE, DEFAULT_BASE_URL).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.title, "Data Analyst");
        assert_eq!(
            first.detail_url,
            "https://employment.ku.edu/jobs/staff/data-analyst-123"
        );
        assert_eq!(first.posting_id.as_deref(), Some("31234"));
        assert_eq!(first.department.as_deref(), Some("Institutional Research"));
        assert_eq!(first.campus.as_deref(), Some("Lawrence"));
        assert_eq!(first.employment_type.as_deref(), Some("Regular"));
        assert_eq!(first.review_begins.as_deref(), Some("11/01/2026"));
        assert_eq!(first.category.as_deref(), Some("staff"));
        assert!(first.skills.is_none());
    }

    #[test]
    fn test_internal_only_marker_and_empty_cells() {
        let records = parse_listings(TABLE_PAGE, DEFAULT_BASE_URL).unwrap();
        let professor = &records[1];

        assert_eq!(professor.title, "Professor");
        assert_eq!(professor.category.as_deref(), Some("faculty"));
        assert_eq!(professor.department, None);
        assert_eq!(professor.employment_type, None);
    }

    #[test]
    fn test_short_rows_leave_missing_columns_empty() {
        let records = parse_listings(TABLE_PAGE, DEFAULT_BASE_URL).unwrap();
        let student = &records[2];

        assert_eq!(student.posting_id.as_deref(), Some("31236"));
        assert_eq!(student.department, None);
        assert_eq!(student.category.as_deref(), Some("students"));
    }

    #[test]
    fn test_fallback_to_posting_links() {
        let html = r#"
            <ul>
              <li><a href="/jobs/staff/1">Accountant</a></li>
              <li><a href="/jobs/search">Search</a></li>
              <li><a href="https://elsewhere.example/jobs/staff/2">Offsite</a></li>
              <li><a href="/jobs/faculty/3">Lecturer</a></li>
            </ul>
        "#;

        let records = parse_listings(html, DEFAULT_BASE_URL).unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(titles, vec!["Accountant", "Lecturer"]);
        assert_eq!(records[0].detail_url, "https://employment.ku.edu/jobs/staff/1");
        assert_eq!(records[1].category.as_deref(), Some("faculty"));
        assert!(records[0].posting_id.is_none());
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_listings("<html></html>", DEFAULT_BASE_URL)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            parse_listings(TABLE_PAGE, "not a url"),
            Err(ListingError::BaseUrl(_))
        ));
    }

    #[test]
    fn test_category_from_url() {
        assert_eq!(
            category_from_url("https://employment.ku.edu/jobs/staff/x").as_deref(),
            Some("staff")
        );
        assert_eq!(category_from_url("https://employment.ku.edu/jobs/x"), None);
    }

    #[tokio::test]
    async fn test_fetch_listings_reports_status() {
        let session = MockSession::new()
            .with_page("https://employment.ku.edu/jobs", TABLE_PAGE)
            .with_status("https://employment.ku.edu/down", 503, "");

        let body = fetch_listings(&session, "https://employment.ku.edu/jobs", Duration::from_secs(20))
            .await
            .unwrap();
        assert!(body.contains("Posting Title"));

        let err = fetch_listings(&session, "https://employment.ku.edu/down", Duration::from_secs(20))
            .await
            .unwrap_err();
        assert!(err.is_http_status());
        assert_eq!(session.calls()[0].timeout, Some(Duration::from_secs(20)));
    }
}
