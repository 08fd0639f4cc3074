pub mod constants;
mod errors;
mod text;
mod timeout;

pub use errors::{CredentialRejected, ExtractionError, RenderError, ScrapeError};
pub use text::{strip_code_fences, truncate_to_char_boundary};
pub use timeout::{MAX_NAVIGATION_TIMEOUT_MS, validate_navigation_timeout};
