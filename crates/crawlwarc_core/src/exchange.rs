//! Request and response values handed over by the crawling framework.

use crawlwarc_codec::WarcDate;
use std::borrow::Cow;

/// Per-request metadata slot owned by the crawling framework.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    /// `WARC-Date` shared by the request record and its response record.
    pub warc_date: Option<WarcDate>,
}

/// An HTTP request exactly as transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method, e.g. `GET`.
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Protocol version, e.g. `HTTP/1.1`.
    pub version: String,
    /// Header fields in transmission order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Vec<u8>,
    /// Framework metadata.
    pub meta: RequestMeta,
}

impl HttpRequest {
    /// Creates a request with no headers and an empty body.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
            meta: RequestMeta::default(),
        }
    }

    /// Creates a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Appends a header field.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Sets a pre-assigned `WARC-Date`.
    #[must_use]
    pub fn warc_date(mut self, date: WarcDate) -> Self {
        self.meta.warc_date = Some(date);
        self
    }

    /// Stamps the current time into the metadata slot if it is still empty.
    ///
    /// Called by the framework when the request is scheduled, so the date
    /// reflects when the request went out rather than when it was archived.
    pub fn stamp_warc_date(&mut self) -> &WarcDate {
        self.meta.warc_date.get_or_insert_with(WarcDate::now)
    }

    /// Returns the origin-form request target (`/path?query`) of the URL.
    #[must_use]
    pub fn request_target(&self) -> Cow<'_, str> {
        let url = self.url.split('#').next().unwrap_or_default();
        let Some((_, rest)) = url.split_once("://") else {
            return Cow::Borrowed(url);
        };
        match rest.find(['/', '?']) {
            Some(i) if rest[i..].starts_with('/') => Cow::Borrowed(&rest[i..]),
            Some(i) => Cow::Owned(format!("/{}", &rest[i..])),
            None => Cow::Borrowed("/"),
        }
    }
}

/// An HTTP response exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response URL.
    pub url: String,
    /// Protocol version, e.g. `HTTP/1.1`.
    pub version: String,
    /// Status code.
    pub status: u16,
    /// Reason phrase (may be empty).
    pub reason: String,
    /// Header fields in reception order.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with no headers and an empty body.
    #[must_use]
    pub fn new(url: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            version: "HTTP/1.1".to_string(),
            status,
            reason: reason.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header field.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_target_forms() {
        assert_eq!(HttpRequest::get("http://a.example/x/y?q=1").request_target(), "/x/y?q=1");
        assert_eq!(HttpRequest::get("https://a.example").request_target(), "/");
        assert_eq!(HttpRequest::get("https://a.example:8080?q").request_target(), "/?q");
        assert_eq!(HttpRequest::get("http://a.example/p#frag").request_target(), "/p");
    }

    #[test]
    fn stamp_only_fills_empty_slot() {
        let preset = WarcDate::parse("2024-01-01T00:00:00.000000Z").unwrap();
        let mut request = HttpRequest::get("http://a.example/").warc_date(preset.clone());
        assert_eq!(request.stamp_warc_date(), &preset);

        let mut fresh = HttpRequest::get("http://a.example/");
        let stamped = fresh.stamp_warc_date().clone();
        assert_eq!(fresh.meta.warc_date, Some(stamped));
    }
}
