//! Links to the neighbouring pages of a result, once the total row count is known.

use enum_iterator::Sequence;
use url::form_urlencoded;

use restql_configuration::HeaderNames;

use super::cursor::CursorCodec;
use super::error::Error;
use super::request::ParsedRequest;

/// A page relative to the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum PageRequest {
    Current,
    First,
    Previous,
    Next,
    Last,
}

impl PageRequest {
    /// The offset of this page, or `None` when there is no such page.
    pub fn offset(self, offset: u64, limit: u64, total: u64) -> Option<u64> {
        match self {
            PageRequest::Current => Some(offset),
            PageRequest::First => (offset != 0).then_some(0),
            PageRequest::Previous => match offset.checked_sub(limit) {
                Some(previous) if previous > 0 => Some(previous),
                _ => (offset > 0).then_some(0),
            },
            PageRequest::Next => offset
                .checked_add(limit)
                .filter(|next| *next < total),
            PageRequest::Last => total
                .checked_sub(limit)
                .filter(|last| *last > offset),
        }
    }

    pub fn header_name(self, headers: &HeaderNames) -> &str {
        match self {
            PageRequest::Current => &headers.current_page,
            PageRequest::First => &headers.first_page,
            PageRequest::Previous => &headers.previous_page,
            PageRequest::Next => &headers.next_page,
            PageRequest::Last => &headers.last_page,
        }
    }
}

/// The query string that leads to a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub page: PageRequest,
    pub header: String,
    /// `cursor=<token>`, the echoed parameters, or empty when there are none.
    pub query: String,
}

/// Builds the page links of a parsed request.
#[derive(Debug, Clone, Copy)]
pub struct PaginationController<'a> {
    codec: &'a CursorCodec,
    headers: &'a HeaderNames,
}

impl<'a> PaginationController<'a> {
    pub fn new(codec: &'a CursorCodec, headers: &'a HeaderNames) -> Self {
        PaginationController { codec, headers }
    }

    /// Links to the current, first, previous, next and last pages, leaving out the
    /// pages that do not exist. Without a page size there is only the current page,
    /// described by its parameters instead of a cursor.
    pub fn links(&self, request: &ParsedRequest, total: u64) -> Result<Vec<PageLink>, Error> {
        let _span = tracing::info_span!("Build pagination headers", total).entered();

        let Some(limit) = request.limit else {
            return Ok(vec![PageLink {
                page: PageRequest::Current,
                header: self.headers.current_page.clone(),
                query: self.codec.canonical(&request.parameters).to_query_string(),
            }]);
        };

        enum_iterator::all::<PageRequest>()
            .filter_map(|page| {
                page.offset(request.offset, limit, total)
                    .map(|offset| (page, offset))
            })
            .map(|(page, offset)| {
                let token = self.codec.encode_page(&request.parameters, offset)?;
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(self.codec.cursor_name(), &token)
                    .finish();
                Ok(PageLink {
                    page,
                    header: page.header_name(self.headers).to_string(),
                    query,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn offsets(offset: u64, limit: u64, total: u64) -> Vec<(PageRequest, u64)> {
        enum_iterator::all::<PageRequest>()
            .filter_map(|page| page.offset(offset, limit, total).map(|o| (page, o)))
            .collect()
    }

    #[test]
    fn middle_page() {
        assert_eq!(
            offsets(40, 20, 95),
            vec![
                (PageRequest::Current, 40),
                (PageRequest::First, 0),
                (PageRequest::Previous, 20),
                (PageRequest::Next, 60),
                (PageRequest::Last, 75),
            ]
        );
    }

    #[test]
    fn first_page_has_no_previous_page() {
        assert_eq!(
            offsets(0, 20, 95),
            vec![
                (PageRequest::Current, 0),
                (PageRequest::Next, 20),
                (PageRequest::Last, 75),
            ]
        );
    }

    #[test]
    fn last_page_has_no_next_page() {
        assert_eq!(
            offsets(80, 20, 95),
            vec![
                (PageRequest::Current, 80),
                (PageRequest::First, 0),
                (PageRequest::Previous, 60),
            ]
        );
    }

    #[test]
    fn previous_page_stops_at_zero() {
        assert_eq!(PageRequest::Previous.offset(10, 20, 95), Some(0));
        assert_eq!(PageRequest::Previous.offset(20, 20, 95), Some(0));
    }

    #[test]
    fn small_results_fit_one_page() {
        assert_eq!(offsets(0, 20, 5), vec![(PageRequest::Current, 0)]);
        assert_eq!(offsets(0, 20, 0), vec![(PageRequest::Current, 0)]);
    }

    #[test]
    fn offsets_do_not_overflow() {
        assert_eq!(PageRequest::Next.offset(u64::MAX, 20, u64::MAX), None);
    }
}
