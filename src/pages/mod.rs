//! Pages
//!
//! One component per shell page; the remote pages wrap their surface in a
//! load boundary.

mod clients;
mod selected;
mod welcome;

pub use clients::ClientsPage;
pub use selected::SelectedPage;
pub use welcome::WelcomePage;
