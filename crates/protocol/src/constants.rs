//! API endpoints and protocol constants.

/// Base URL of the MirrorAce v1 API.
pub const API_BASE_URL: &str = "https://mirrorace.com/api/v1";

/// Path of the upload-negotiation endpoint (also the direct upload target
/// until negotiation returns a dedicated `server_file` URL).
pub const FILE_UPLOAD_PATH: &str = "/file/upload";

/// Path of the file-info endpoint.
pub const FILE_INFO_PATH: &str = "/file/info";

/// Status value marking a successful response envelope.
pub const STATUS_SUCCESS: &str = "success";

/// Form key the upload endpoints expect the mirror selection under.
pub const MIRRORS_FIELD: &str = "mirrors[]";

/// Form key for the optional download password.
pub const PASSWORD_FIELD: &str = "file_password";
