//! Capture session management
//!
//! - `CaptureSession`: session topology and the configuration bracket
//! - `SessionDelegate`: notification sink for the embedding UI
//! - `SessionManager`: single owner of the session, its device inputs, and
//!   the capture/recording entry points

mod capture_session;
mod delegate;
mod manager;

pub use capture_session::{CaptureSession, SessionSnapshot};
pub use delegate::{NullDelegate, SessionDelegate};
pub use manager::SessionManager;
