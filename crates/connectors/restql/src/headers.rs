//! Turn page links into response headers.

use http::header::{HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_EXPOSE_HEADERS};
use http::Uri;

use query_engine_translation::translation::pagination::PageLink;

use crate::error::Error;

/// One header per link, holding the absolute URI of the page, and an
/// `Access-Control-Expose-Headers` header naming them.
pub fn pagination_headers(uri: &Uri, links: &[PageLink]) -> Result<HeaderMap, Error> {
    let base = base_uri(uri);
    let mut headers = HeaderMap::with_capacity(links.len() + 1);

    for link in links {
        let target = if link.query.is_empty() {
            base.clone()
        } else {
            format!("{base}?{}", link.query)
        };
        headers.insert(
            HeaderName::from_bytes(link.header.as_bytes())?,
            HeaderValue::from_str(&target)?,
        );
    }

    let exposed = links
        .iter()
        .map(|link| link.header.as_str())
        .collect::<Vec<_>>()
        .join(",");
    headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_str(&exposed)?);

    Ok(headers)
}

/// The scheme, authority and path of the request. Relative when the request URI is.
fn base_uri(uri: &Uri) -> String {
    match (uri.scheme_str(), uri.authority()) {
        (Some(scheme), Some(authority)) => format!("{scheme}://{authority}{}", uri.path()),
        _ => uri.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_translation::translation::pagination::PageRequest;
    use similar_asserts::assert_eq;

    fn link(page: PageRequest, header: &str, query: &str) -> PageLink {
        PageLink {
            page,
            header: header.to_string(),
            query: query.to_string(),
        }
    }

    #[test]
    fn links_are_absolute() {
        let uri: Uri = "https://shop.example:8443/v1/orders?limit=10&cursor=abc"
            .parse()
            .unwrap();
        let headers = pagination_headers(
            &uri,
            &[
                link(PageRequest::Current, "Current-Page", "cursor=Y3Vy"),
                link(PageRequest::Next, "Next-Page", "cursor=bmV4dA"),
            ],
        )
        .unwrap();

        assert_eq!(
            headers["Current-Page"],
            "https://shop.example:8443/v1/orders?cursor=Y3Vy"
        );
        assert_eq!(
            headers["Next-Page"],
            "https://shop.example:8443/v1/orders?cursor=bmV4dA"
        );
        assert_eq!(
            headers[ACCESS_CONTROL_EXPOSE_HEADERS],
            "Current-Page,Next-Page"
        );
    }

    #[test]
    fn empty_queries_leave_the_path_alone() {
        let uri: Uri = "/v1/orders".parse().unwrap();
        let headers =
            pagination_headers(&uri, &[link(PageRequest::Current, "Current-Page", "")]).unwrap();

        assert_eq!(headers["Current-Page"], "/v1/orders");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn invalid_header_names_are_errors() {
        let uri: Uri = "/v1/orders".parse().unwrap();
        let result = pagination_headers(&uri, &[link(PageRequest::Current, "Current Page", "")]);
        assert!(matches!(result, Err(Error::InvalidHeaderName(_))));
    }
}
