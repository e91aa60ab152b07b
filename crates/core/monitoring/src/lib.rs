//! Logging setup shared by the workspace binaries.

pub mod logging;

/// Initializes process-wide logging.
///
/// Safe to call more than once; only the first call installs the subscriber.
pub fn init() {
    logging::init();
}
