pub mod insight;
pub mod sales;
pub mod store;
