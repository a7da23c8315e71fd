//! Pagination primitives shared by backend list endpoints.
//!
//! List endpoints accept `limit`/`offset` query parameters and answer with a
//! [`Page`] envelope carrying the window, the items, and the total row count.
//! [`PageRequest`] normalises raw query values: absent values fall back to
//! defaults, oversized limits are clamped rather than rejected, so clients can
//! never request an unbounded result set.
//!
//! An opaque [`PageToken`] rendering is provided for clients that prefer a
//! single cursor string over explicit numeric parameters.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Default window size applied when a request omits `limit`.
pub const DEFAULT_LIMIT: u32 = 20;

/// Hard ceiling for a single page regardless of the requested `limit`.
pub const MAX_LIMIT: u32 = 100;

/// Normalised pagination window for a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    limit: u32,
    offset: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Build a window from raw query values, applying defaults and clamping.
    ///
    /// A `limit` of zero falls back to [`DEFAULT_LIMIT`]; values above
    /// [`MAX_LIMIT`] are clamped down to it.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, MAX_LIMIT};
    ///
    /// let page = PageRequest::from_raw(Some(500), Some(40));
    /// assert_eq!(page.limit(), MAX_LIMIT);
    /// assert_eq!(page.offset(), 40);
    /// ```
    #[must_use]
    pub fn from_raw(limit: Option<u32>, offset: Option<u32>) -> Self {
        let limit = match limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(value) => value.min(MAX_LIMIT),
        };
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }

    /// Window size for this request.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows skipped before the window starts.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Window positioned immediately after this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

/// Envelope returned by paginated list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items within the requested window.
    pub items: Vec<T>,
    /// Window size that produced this page.
    pub limit: u32,
    /// Offset of the first item in this page.
    pub offset: u32,
    /// Total number of rows matching the query across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Assemble an envelope from a window, its items, and the total count.
    #[must_use]
    pub fn new(request: PageRequest, items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            limit: request.limit(),
            offset: request.offset(),
            total,
        }
    }

    /// Whether rows remain beyond this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.offset).saturating_add(u64::from(self.limit)) < self.total
    }

    /// Map the items of this page, preserving the window metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            limit: self.limit,
            offset: self.offset,
            total: self.total,
        }
    }
}

/// Failures raised when decoding an opaque page token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageTokenError {
    /// The token is not valid URL-safe base64.
    #[error("page token is not valid base64")]
    Encoding,
    /// The decoded token does not describe a pagination window.
    #[error("page token payload is malformed")]
    Payload,
}

/// Opaque cursor rendering of a [`PageRequest`].
///
/// The encoding is URL-safe base64 over a small JSON payload. It is a
/// convenience for clients, not a capability: decoded windows go through the
/// same clamping as raw query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken(String);

#[derive(Serialize, Deserialize)]
struct TokenPayload {
    l: u32,
    o: u32,
}

impl PageToken {
    /// Encode a window as an opaque token.
    #[must_use]
    pub fn encode(request: PageRequest) -> Self {
        let payload = TokenPayload {
            l: request.limit(),
            o: request.offset(),
        };
        // Serialising two u32 fields cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        Self(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a token back into a clamped window.
    pub fn decode(token: &str) -> Result<PageRequest, PageTokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| PageTokenError::Encoding)?;
        let payload: TokenPayload =
            serde_json::from_slice(&bytes).map_err(|_| PageTokenError::Payload)?;
        Ok(PageRequest::from_raw(Some(payload.l), Some(payload.o)))
    }

    /// The token's string form for embedding in responses.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, DEFAULT_LIMIT, 0)]
    #[case(Some(0), Some(10), DEFAULT_LIMIT, 10)]
    #[case(Some(50), None, 50, 0)]
    #[case(Some(MAX_LIMIT + 1), Some(5), MAX_LIMIT, 5)]
    fn from_raw_applies_defaults_and_clamps(
        #[case] limit: Option<u32>,
        #[case] offset: Option<u32>,
        #[case] expected_limit: u32,
        #[case] expected_offset: u32,
    ) {
        let page = PageRequest::from_raw(limit, offset);
        assert_eq!(page.limit(), expected_limit);
        assert_eq!(page.offset(), expected_offset);
    }

    #[rstest]
    fn next_advances_by_limit() {
        let page = PageRequest::from_raw(Some(25), Some(50));
        let next = page.next();
        assert_eq!(next.limit(), 25);
        assert_eq!(next.offset(), 75);
    }

    #[rstest]
    #[case(20, 0, 100, true)]
    #[case(20, 80, 100, false)]
    #[case(20, 90, 100, false)]
    fn has_more_compares_window_to_total(
        #[case] limit: u32,
        #[case] offset: u32,
        #[case] total: u64,
        #[case] expected: bool,
    ) {
        let page = Page::new(
            PageRequest::from_raw(Some(limit), Some(offset)),
            vec![(); 1],
            total,
        );
        assert_eq!(page.has_more(), expected);
    }

    #[rstest]
    fn map_preserves_window_metadata() {
        let page = Page::new(PageRequest::from_raw(Some(5), Some(10)), vec![1, 2, 3], 42);
        let mapped = page.map(|n| n * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.limit, 5);
        assert_eq!(mapped.offset, 10);
        assert_eq!(mapped.total, 42);
    }

    #[rstest]
    fn page_token_round_trips() {
        let request = PageRequest::from_raw(Some(30), Some(60));
        let token = PageToken::encode(request);
        let decoded = PageToken::decode(token.as_str()).expect("token decodes");
        assert_eq!(decoded, request);
    }

    #[rstest]
    #[case("not base64!!", PageTokenError::Encoding)]
    #[case("bm90LWpzb24", PageTokenError::Payload)]
    fn page_token_rejects_malformed_input(#[case] token: &str, #[case] expected: PageTokenError) {
        let error = PageToken::decode(token).expect_err("token must be rejected");
        assert_eq!(error, expected);
    }

    #[rstest]
    fn page_serialises_camel_case() {
        let page = Page::new(PageRequest::default(), vec!["a"], 1);
        let value = serde_json::to_value(&page).expect("page serialises");
        assert!(value.get("items").is_some());
        assert!(value.get("total").is_some());
        assert!(value.get("Limit").is_none());
    }
}
