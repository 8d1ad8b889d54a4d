//! UUID request-id generation for the tower-http request-id layers.

use http::{HeaderMap, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request id set by `SetRequestIdLayer`, for attaching to error responses.
pub fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Generates a fresh UUID v4 for each incoming request, attached via
/// `SetRequestIdLayer` and echoed back via `PropagateRequestIdLayer`.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_request_id_header() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, "req-42".parse().unwrap());
        assert_eq!(request_id_from_headers(&headers).as_deref(), Some("req-42"));
        assert_eq!(request_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn generates_parseable_request_id() {
        let mut maker = UuidRequestId;
        let request = Request::builder().body(()).unwrap();
        let id = maker.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
