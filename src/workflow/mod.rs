pub mod filter;
pub mod form;
pub mod list;
pub mod page;
