pub mod github;
pub mod iterable;
pub mod store;
