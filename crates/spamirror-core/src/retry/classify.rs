//! Map curl errors and HTTP statuses onto retry failure kinds.

use crate::error::FetchError;
use crate::retry::policy::FailureKind;

pub fn classify_http_status(code: u32) -> FailureKind {
    match code {
        429 | 503 => FailureKind::Throttled,
        500..=599 => FailureKind::Transient,
        _ => FailureKind::Permanent,
    }
}

pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        FailureKind::Timeout
    } else if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        FailureKind::Transient
    } else {
        FailureKind::Permanent
    }
}

/// Storage and URL errors never retry.
pub fn classify(e: &FetchError) -> FailureKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Storage(_) | FetchError::InvalidUrl(_) => FailureKind::Permanent,
    }
}
