//! Record construction for warcinfo, request and response records.

use crate::error::{WriteError, WriteResult};
use crate::exchange::{HttpRequest, HttpResponse};
use crate::settings::Settings;
use crawlwarc_codec::{Digester, RecordId, WarcDate, WarcRecord, WarcRecordType, CRLF};

const WARC_FIELDS: &str = "application/warc-fields";
const HTTP_REQUEST: &str = "application/http; msgtype=request";
const HTTP_RESPONSE: &str = "application/http; msgtype=response";

/// A response paired with the request that produced it.
///
/// The `WARC-Date` is resolved once, when the exchange is assembled, and is
/// then shared by both records.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    /// The originating request.
    pub request: &'a HttpRequest,
    /// The response.
    pub response: &'a HttpResponse,
    date: &'a WarcDate,
}

impl<'a> Exchange<'a> {
    /// Pairs a request and response under `date`.
    #[must_use]
    pub fn new(request: &'a HttpRequest, response: &'a HttpResponse, date: &'a WarcDate) -> Self {
        Self {
            request,
            response,
            date,
        }
    }

    /// Returns the shared `WARC-Date`.
    #[must_use]
    pub fn date(&self) -> &WarcDate {
        self.date
    }
}

/// Builds immutable [`WarcRecord`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder {
    digester: Digester,
}

impl RecordBuilder {
    /// Creates a builder digesting with `digester`.
    #[must_use]
    pub const fn new(digester: Digester) -> Self {
        Self { digester }
    }

    /// Builds the per-file metadata record.
    ///
    /// The content block lists the run's settings as `application/warc-fields`.
    #[must_use]
    pub fn build_warcinfo(&self, settings: &Settings, date: WarcDate) -> WarcRecord {
        let fields = [
            ("software", settings.software.as_str()),
            ("format", "WARC file version 1.0"),
            ("conformsTo", settings.warc_spec.as_str()),
            ("operator", settings.operator.as_str()),
            ("isPartOf", settings.collection.as_str()),
            ("description", settings.description.as_str()),
            ("robots", settings.robots.as_str()),
            ("http-header-user-agent", settings.user_agent.as_str()),
        ];

        let mut block = String::with_capacity(256);
        for (name, value) in fields {
            block.push_str(name);
            block.push_str(": ");
            // warc-fields values are single-line
            block.push_str(&value.replace(['\r', '\n'], " "));
            block.push_str(CRLF);
        }

        WarcRecord::new(
            WarcRecordType::Warcinfo,
            date,
            WARC_FIELDS,
            block.into_bytes(),
            &self.digester,
        )
    }

    /// Builds the request record of an exchange.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::RecordBuild`] if the URL or method is missing or
    /// a header field cannot be framed.
    pub fn build_request(&self, exchange: &Exchange<'_>) -> WriteResult<WarcRecord> {
        let request = exchange.request;
        check_target_uri(&request.url)?;
        check_token("request method", &request.method)?;
        check_token("request version", &request.version)?;

        let start_line = format!(
            "{} {} {}",
            request.method,
            request.request_target(),
            request.version
        );
        let block = http_block(&start_line, &request.headers, &request.body)?;

        Ok(WarcRecord::new(
            WarcRecordType::Request,
            exchange.date().clone(),
            HTTP_REQUEST,
            block,
            &self.digester,
        )
        .with_target_uri(request.url.as_str()))
    }

    /// Builds the response record of an exchange, linked to its request.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::RecordBuild`] if the URL is missing, the status
    /// is not a three-digit code, or a header field cannot be framed.
    pub fn build_response(
        &self,
        exchange: &Exchange<'_>,
        request_record_id: &RecordId,
    ) -> WriteResult<WarcRecord> {
        let response = exchange.response;
        check_target_uri(&response.url)?;
        check_token("response version", &response.version)?;
        if !(100..=999).contains(&response.status) {
            return Err(WriteError::record_build(format!(
                "invalid status code: {}",
                response.status
            )));
        }
        if response.reason.contains(['\r', '\n']) {
            return Err(WriteError::record_build("reason phrase contains a line break"));
        }

        let start_line = if response.reason.is_empty() {
            format!("{} {}", response.version, response.status)
        } else {
            format!("{} {} {}", response.version, response.status, response.reason)
        };
        let block = http_block(&start_line, &response.headers, &response.body)?;

        Ok(WarcRecord::new(
            WarcRecordType::Response,
            exchange.date().clone(),
            HTTP_RESPONSE,
            block,
            &self.digester,
        )
        .with_target_uri(response.url.as_str())
        .with_concurrent_to(request_record_id.clone()))
    }
}

fn check_target_uri(url: &str) -> WriteResult<()> {
    if url.is_empty() {
        return Err(WriteError::record_build("target URI is empty"));
    }
    if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(WriteError::record_build(format!(
            "target URI contains whitespace or control characters: {url:?}"
        )));
    }
    Ok(())
}

fn check_token(what: &str, value: &str) -> WriteResult<()> {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(WriteError::record_build(format!("invalid {what}: {value:?}")));
    }
    Ok(())
}

/// Start line, CRLF-terminated header fields, blank line, body.
fn http_block(
    start_line: &str,
    headers: &[(String, String)],
    body: &[u8],
) -> WriteResult<Vec<u8>> {
    let mut head = String::with_capacity(start_line.len() + headers.len() * 32 + 4);
    head.push_str(start_line);
    head.push_str(CRLF);

    for (name, value) in headers {
        if name.is_empty()
            || name.contains(':')
            || name.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(WriteError::record_build(format!(
                "invalid header name: {name:?}"
            )));
        }
        if value.contains(['\r', '\n']) {
            return Err(WriteError::record_build(format!(
                "header {name} contains a line break"
            )));
        }
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str(CRLF);
    }
    head.push_str(CRLF);

    let mut block = Vec::with_capacity(head.len() + body.len());
    block.extend_from_slice(head.as_bytes());
    block.extend_from_slice(body);
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn date() -> WarcDate {
        WarcDate::parse("2024-01-01T00:00:00.000000Z").unwrap()
    }

    fn get_pair() -> (HttpRequest, HttpResponse) {
        let request = HttpRequest::get("http://quotes.example/page/1?x=2")
            .header("Host", "quotes.example")
            .header("Accept", "*/*");
        let response = HttpResponse::new("http://quotes.example/page/1?x=2", 200, "OK")
            .header("Content-Type", "text/plain")
            .body(b"hello".to_vec());
        (request, response)
    }

    #[test]
    fn request_block_is_raw_http() {
        let (request, response) = get_pair();
        let date = date();
        let exchange = Exchange::new(&request, &response, &date);

        let record = RecordBuilder::default().build_request(&exchange).unwrap();

        assert_eq!(record.record_type(), WarcRecordType::Request);
        assert_eq!(record.target_uri(), Some("http://quotes.example/page/1?x=2"));
        assert_eq!(record.content_type(), "application/http; msgtype=request");
        assert_eq!(
            record.content_block(),
            b"GET /page/1?x=2 HTTP/1.1\r\nHost: quotes.example\r\nAccept: */*\r\n\r\n"
        );
        assert_eq!(record.content_length(), record.content_block().len() as u64);
    }

    #[test]
    fn response_links_to_request() {
        let (request, response) = get_pair();
        let date = date();
        let exchange = Exchange::new(&request, &response, &date);
        let builder = RecordBuilder::default();

        let req = builder.build_request(&exchange).unwrap();
        let resp = builder.build_response(&exchange, req.record_id()).unwrap();

        assert_eq!(resp.concurrent_to(), Some(req.record_id()));
        assert_ne!(resp.record_id(), req.record_id());
        assert_eq!(resp.date(), req.date());
        assert_eq!(resp.content_type(), "application/http; msgtype=response");
        assert_eq!(
            resp.content_block(),
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello"
        );
    }

    #[test]
    fn empty_reason_omitted_from_status_line() {
        let request = HttpRequest::get("http://a.example/");
        let response = HttpResponse::new("http://a.example/", 204, "");
        let date = date();
        let exchange = Exchange::new(&request, &response, &date);

        let resp = RecordBuilder::default()
            .build_response(&exchange, &RecordId::generate())
            .unwrap();
        assert_eq!(resp.content_block(), b"HTTP/1.1 204\r\n\r\n");
    }

    #[test]
    fn empty_target_uri_fails_fast() {
        let request = HttpRequest::get("");
        let response = HttpResponse::new("", 200, "OK");
        let date = date();
        let exchange = Exchange::new(&request, &response, &date);
        let builder = RecordBuilder::default();

        let err = builder.build_request(&exchange).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordBuild);
        let err = builder
            .build_response(&exchange, &RecordId::generate())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordBuild);
    }

    #[test]
    fn header_injection_is_rejected() {
        let request = HttpRequest::get("http://a.example/").header("X-Evil", "a\r\nInjected: 1");
        let response = HttpResponse::new("http://a.example/", 200, "OK");
        let date = date();
        let exchange = Exchange::new(&request, &response, &date);

        assert!(RecordBuilder::default().build_request(&exchange).is_err());
    }

    #[test]
    fn bad_status_is_rejected() {
        let request = HttpRequest::get("http://a.example/");
        let response = HttpResponse::new("http://a.example/", 42, "Odd");
        let date = date();
        let exchange = Exchange::new(&request, &response, &date);

        assert!(RecordBuilder::default()
            .build_response(&exchange, &RecordId::generate())
            .is_err());
    }

    #[test]
    fn warcinfo_lists_settings() {
        let settings = Settings::new("/tmp")
            .collection("quotes")
            .operator("john@doe.nl")
            .description("multi\nline")
            .user_agent("crawlbot/1.0");

        let record = RecordBuilder::default().build_warcinfo(&settings, date());
        let text = String::from_utf8(record.content_block().to_vec()).unwrap();

        assert_eq!(record.record_type(), WarcRecordType::Warcinfo);
        assert_eq!(record.content_type(), "application/warc-fields");
        assert!(record.target_uri().is_none());
        assert!(text.contains("format: WARC file version 1.0\r\n"));
        assert!(text.contains("isPartOf: quotes\r\n"));
        assert!(text.contains("operator: john@doe.nl\r\n"));
        assert!(text.contains("description: multi line\r\n"));
        assert!(text.contains("robots: obey\r\n"));
        assert!(text.contains("http-header-user-agent: crawlbot/1.0\r\n"));
        assert!(text.contains(&format!("conformsTo: {}\r\n", settings.warc_spec)));
    }

    #[test]
    fn digest_covers_content_block() {
        let (request, response) = get_pair();
        let date = date();
        let exchange = Exchange::new(&request, &response, &date);
        let digester = Digester::default();

        let record = RecordBuilder::new(digester).build_request(&exchange).unwrap();
        assert_eq!(record.payload_digest(), &digester.digest(record.content_block()));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn response_block_accounts_for_body(
                body in prop::collection::vec(any::<u8>(), 0..512),
                status in 100u16..=999,
            ) {
                let request = HttpRequest::get("http://a.example/");
                let response = HttpResponse::new("http://a.example/", status, "X").body(body.clone());
                let date = date();
                let exchange = Exchange::new(&request, &response, &date);

                let record = RecordBuilder::default()
                    .build_response(&exchange, &RecordId::generate())
                    .unwrap();

                let head = format!("HTTP/1.1 {status} X\r\n\r\n");
                prop_assert_eq!(record.content_length(), (head.len() + body.len()) as u64);
                prop_assert!(record.content_block().starts_with(head.as_bytes()));
                prop_assert!(record.content_block().ends_with(&body));
            }
        }
    }
}
