pub mod inspect;
pub mod offsets;
pub mod page_store;
