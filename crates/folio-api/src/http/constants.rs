//! Shared HTTP constants (headers, cookies, problem URIs).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const HEADER_LAST_EVENT_ID: &str = "last-event-id";
pub(crate) const HEADER_FILE_NAME: &str = "x-file-name";
pub(crate) const SESSION_COOKIE: &str = "folio_session";
pub(crate) const SSE_KEEP_ALIVE_SECS: u64 = 20;
pub(crate) const REDIRECT_EVENT: &str = "redirect";
pub(crate) const UPLOAD_FOLDER: &str = "uploads";

pub(crate) const PROBLEM_INTERNAL: &str = "https://folio.dev/problems/internal";
pub(crate) const PROBLEM_UNAUTHORIZED: &str = "https://folio.dev/problems/unauthorized";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://folio.dev/problems/bad-request";
pub(crate) const PROBLEM_CONFLICT: &str = "https://folio.dev/problems/conflict";
pub(crate) const PROBLEM_CONFIRMATION_REQUIRED: &str =
    "https://folio.dev/problems/confirmation-required";
pub(crate) const PROBLEM_VALIDATION: &str = "https://folio.dev/problems/validation";
pub(crate) const PROBLEM_NOT_FOUND: &str = "https://folio.dev/problems/not-found";
pub(crate) const PROBLEM_UPLOAD_TOO_LARGE: &str = "https://folio.dev/problems/upload-too-large";
pub(crate) const PROBLEM_UNSUPPORTED_MEDIA: &str =
    "https://folio.dev/problems/unsupported-media-type";
pub(crate) const PROBLEM_SERVICE_UNAVAILABLE: &str =
    "https://folio.dev/problems/service-unavailable";
