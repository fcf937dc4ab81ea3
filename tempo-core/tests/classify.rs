use tempo_core::{HttpError, classify};

fn bad_request(status: u16, body: &str) -> (u16, String) {
    match classify(status, body) {
        Err(HttpError::BadRequest { code, message }) => (code, message),
        other => panic!("expected BadRequest for {status}, got {other:?}"),
    }
}

fn server_error(status: u16, body: &str) -> (u16, String) {
    match classify(status, body) {
        Err(HttpError::ServerError { code, message }) => (code, message),
        other => panic!("expected ServerError for {status}, got {other:?}"),
    }
}

#[test]
fn ok_status_passes() {
    assert_eq!(classify(200, ""), Ok(()));
}

#[test]
fn client_statuses_map_to_bad_request_with_label() {
    let table = [
        (401, "Unauthorized"),
        (403, "Forbidden"),
        (404, "Not Found"),
        (408, "Time-out"),
        (413, "Too Large"),
        (414, "Too Long"),
        (429, "Too Many Requests"),
    ];
    for (status, needle) in table {
        let (code, message) = bad_request(status, "");
        assert_eq!(code, status);
        assert!(message.contains(needle), "{status}: {message:?} lacks {needle:?}");
    }
}

#[test]
fn bad_request_includes_structured_error() {
    let body = r#"{"error":"invalid_request","error_description":"Bad request details"}"#;
    let (code, message) = bad_request(400, body);
    assert_eq!(code, 400);
    assert!(message.contains("invalid_request"));
    assert!(message.contains("Bad request details"));
}

#[test]
fn bad_request_falls_back_to_raw_body() {
    let (code, message) = bad_request(400, "Invalid JSON");
    assert_eq!(code, 400);
    assert!(message.contains("Invalid JSON"));

    let (_, message) = bad_request(400, r#"{"other_key":"value"}"#);
    assert!(message.contains("other_key"));
}

#[test]
fn server_statuses_map_to_server_error_with_label() {
    let body = r#"{"error":"internal_error","error_description":"boom"}"#;
    let (code, message) = server_error(500, body);
    assert_eq!(code, 500);
    assert!(message.contains("internal_error"));

    let (code, message) = server_error(503, "");
    assert_eq!(code, 503);
    assert!(message.contains("Service Unavailable"));

    let (code, message) = server_error(509, "");
    assert_eq!(code, 509);
    assert!(message.contains("Bandwidth"));

    let (_, message) = server_error(500, "not json at all");
    assert!(message.contains("not json at all"));
}

#[test]
fn other_statuses_are_unexpected_with_raw_body() {
    for status in [201, 302, 418, 502, 504] {
        match classify(status, "I'm a teapot") {
            Err(HttpError::Unexpected { code, body }) => {
                assert_eq!(code, status);
                assert_eq!(body, "I'm a teapot");
            }
            other => panic!("expected Unexpected for {status}, got {other:?}"),
        }
    }
}
