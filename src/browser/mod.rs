pub mod chromium;
pub mod cookies;
pub mod http_session;
pub mod mock_session;
pub mod page_session;
pub mod session;

pub use chromium::{ChromiumLauncher, ChromiumSession};
pub use cookies::{CookieFile, StoredCookie};
pub use http_session::{HttpLauncher, HttpSession};
pub use mock_session::{MockLauncher, MockPageResponse, MockSession};
pub use page_session::PageSession;
pub use session::{BrowserPage, BrowserSession, SessionLauncher, SessionProfile};

use crate::core::config::Backend;

pub fn launcher_for(backend: Backend) -> Box<dyn SessionLauncher> {
    match backend {
        Backend::Chromium => Box::new(ChromiumLauncher),
        Backend::Http => Box::new(HttpLauncher),
    }
}
