pub mod account;
pub mod market;
pub mod order;
pub mod page;
pub mod portfolio;
pub mod response;

pub use account::*;
pub use market::*;
pub use order::*;
pub use page::*;
pub use portfolio::*;
pub use response::*;
