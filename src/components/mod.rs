//! UI Components
//!
//! Shell chrome around the remote surfaces.

mod layout;
mod notice_banner;
mod remote_surface;

pub use layout::Layout;
pub use notice_banner::{flash_notice, NoticeBanner};
pub use remote_surface::RemoteSurface;
