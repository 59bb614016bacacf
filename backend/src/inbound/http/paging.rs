//! Page query parameters and the paged response envelope.

use pagination::{Page, PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::Error;

/// `?page=&size=` query string; both optional.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    /// Validate into a [`PageRequest`], defaulting to the first page of ten.
    pub fn to_request(self) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.page, self.size).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "size",
                "code": "invalid_page_size",
            }))
        })
    }
}

/// Items of one page plus its metadata, flattened into one object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    #[serde(flatten)]
    pub page: PageInfo,
}

impl<T> PageResponse<T> {
    /// Convert every item of `page` with `convert`.
    pub fn from_page<U>(page: Page<U>, convert: impl FnMut(U) -> T) -> Self {
        let info = page.info();
        Self {
            content: page.into_items().into_iter().map(convert).collect(),
            page: info,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn empty_query_uses_defaults() {
        let request = PageQuery::default().to_request().expect("valid defaults");
        assert_eq!(request.page(), 0);
        assert_eq!(request.size(), 10);
    }

    #[rstest]
    #[case(0)]
    #[case(101)]
    fn out_of_range_sizes_are_bad_requests(#[case] size: u32) {
        let query = PageQuery {
            page: None,
            size: Some(size),
        };
        assert!(query.to_request().is_err());
    }

    #[rstest]
    fn envelope_flattens_metadata() {
        let request = PageRequest::new(0, 2).expect("valid request");
        let page = Page::new(vec![1, 2], request, 3);

        let body = serde_json::to_value(PageResponse::from_page(page, |n: i32| n * 10))
            .expect("serialisable");

        assert_eq!(body["content"], json!([10, 20]));
        assert_eq!(body["totalElements"], 3);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["hasNext"], true);
    }
}
