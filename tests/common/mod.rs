pub mod builders;
pub mod mock_store;
pub mod strategies;

pub use builders::*;
pub use mock_store::*;
