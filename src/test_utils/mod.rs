#![allow(missing_docs)]

mod api;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use api::FakeExpenseApi;
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, assert_status_ok, get_header};
