//! Shared Widgets
//!
//! Building blocks used by both remote surfaces.

mod client_card;
mod client_modal;
mod confirm_delete_modal;
mod page_size_selector;
mod pagination;
mod search_input;

pub use client_card::ClientCard;
pub use client_modal::ClientModal;
pub use confirm_delete_modal::ConfirmDeleteModal;
pub use page_size_selector::PageSizeSelector;
pub use pagination::Pagination;
pub use search_input::SearchInput;
