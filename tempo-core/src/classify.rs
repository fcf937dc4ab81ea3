//! Mapping of non-200 HTTP responses to typed failures.

use serde::Deserialize;
use tempo_types::HttpError;

/// Structured error body returned by the remote API and its token endpoint.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    error_description: String,
}

/// Short label for each status code of the documented table.
fn status_label(status: u16) -> Option<&'static str> {
    Some(match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Time-out",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        509 => "Bandwidth Limit Exceeded",
        _ => return None,
    })
}

/// Extract a human-readable detail from an error body.
///
/// Prefers the structured `error`/`error_description` pair and falls back to
/// the raw body text when the body is not that JSON shape.
#[must_use]
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => format!("{}: {}", parsed.error, parsed.error_description),
        Err(_) => body.trim().to_string(),
    }
}

/// Classify an HTTP status and body.
///
/// Returns `Ok(())` for 200. Every other status yields the `HttpError` kind
/// of the status table; unknown codes become `Unexpected` with the raw body.
///
/// # Errors
/// Returns the classified `HttpError` for any status other than 200.
pub fn classify(status: u16, body: &str) -> Result<(), HttpError> {
    if status == 200 {
        return Ok(());
    }
    let Some(label) = status_label(status) else {
        return Err(HttpError::Unexpected {
            code: status,
            body: body.to_string(),
        });
    };
    let detail = error_detail(body);
    let message = if detail.is_empty() {
        label.to_string()
    } else {
        format!("{label}: {detail}")
    };
    if status >= 500 {
        Err(HttpError::ServerError {
            code: status,
            message,
        })
    } else {
        Err(HttpError::BadRequest {
            code: status,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_falls_back_when_keys_missing() {
        assert_eq!(error_detail(r#"{"other_key": "value"}"#), r#"{"other_key": "value"}"#);
    }

    #[test]
    fn detail_uses_structured_fields() {
        let body = r#"{"error":"invalid_client","error_description":"bad secret"}"#;
        assert_eq!(error_detail(body), "invalid_client: bad secret");
    }
}
