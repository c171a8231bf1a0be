//! Property-based test generators using proptest.
//!
//! Every generated exchange is well formed, so the writer must accept it.

use crawlwarc_core::{HttpRequest, HttpResponse, WarcDate};
use proptest::prelude::*;

/// Strategy for absolute `http`/`https` URLs.
pub fn url_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("http"), Just("https")],
        prop::string::string_regex("[a-z][a-z0-9]{0,15}\\.example").expect("Invalid regex"),
        prop::string::string_regex("(/[a-zA-Z0-9._~-]{0,12}){0,4}").expect("Invalid regex"),
        prop::option::of(
            prop::string::string_regex("[a-z]{1,8}=[a-zA-Z0-9]{0,8}").expect("Invalid regex"),
        ),
    )
        .prop_map(|(scheme, host, path, query)| {
            let mut url = format!("{scheme}://{host}{path}");
            if let Some(query) = query {
                url.push('?');
                url.push_str(&query);
            }
            url
        })
}

/// Strategy for header fields that can be framed on one line.
pub fn header_strategy() -> impl Strategy<Value = (String, String)> {
    (
        prop::string::string_regex("[A-Za-z][A-Za-z0-9-]{0,20}").expect("Invalid regex"),
        prop::string::string_regex("[ -~]{0,40}").expect("Invalid regex"),
    )
}

/// Strategy for arbitrary bodies.
pub fn body_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..2048)
}

/// Strategy for status codes the response builder accepts.
pub fn status_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(200u16),
        Just(204),
        Just(301),
        Just(404),
        Just(500),
        100u16..=599,
    ]
}

/// Strategy for UTC dates with microsecond precision.
pub fn warc_date_strategy() -> impl Strategy<Value = WarcDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000)
        .prop_map(|(y, mo, d, h, mi, s, us)| {
            let text = format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}.{us:06}Z");
            WarcDate::parse(&text).expect("Generated date must parse")
        })
}

/// Strategy for complete exchanges, returned as `(response, request)`.
pub fn exchange_strategy() -> impl Strategy<Value = (HttpResponse, HttpRequest)> {
    (
        url_strategy(),
        prop::collection::vec(header_strategy(), 0..6),
        prop::collection::vec(header_strategy(), 0..6),
        status_strategy(),
        prop::string::string_regex("[A-Za-z ]{0,12}").expect("Invalid regex"),
        body_strategy(),
        prop::option::of(warc_date_strategy()),
    )
        .prop_map(
            |(url, request_headers, response_headers, status, reason, body, date)| {
                let mut request = HttpRequest::get(url.clone());
                request.headers = request_headers;
                request.meta.warc_date = date;

                let mut response = HttpResponse::new(url, status, reason);
                response.headers = response_headers;
                response.body = body;
                (response, request)
            },
        )
}
