pub mod headless;
pub mod session;

pub use headless::ChromiumBackend;
pub use session::{with_session, BrowserBackend, BrowserSession, DownloadedFile, LaunchOptions};
