mod store;
mod joins;
pub mod credentials;
pub mod seed;

pub use store::StoreService;
