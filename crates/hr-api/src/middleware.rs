//! Middleware shared by the binary's server setup.

use actix_web::middleware::Logger;

/// Returns the standard request logger:
/// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}
