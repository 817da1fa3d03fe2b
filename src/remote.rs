//! Remote session management: browser process, isolated contexts and pages.
//!
//! The orchestrator talks to the design tool only through the traits in
//! [`driver`]; [`chromium`] implements them over the Chrome DevTools Protocol
//! and `fake` (tests and the `test-util` feature) is a scripted in-memory stand-in.

pub mod chromium;
pub mod driver;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod session;

pub use chromium::ChromiumLauncher;
pub use driver::{BrowserLauncher, BrowserProcess, UiPage};
pub use session::{Session, SessionManager};
