pub mod clock;
pub mod enums;
pub mod error;
pub mod money;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use clock::{Clock, FixedClock, SystemClock};
pub use enums::{ApprovalStatus, Granularity, ReportScope};
pub use error::CoreError;
pub use money::{round_money, safe_div};
pub use structs::{
    NormalizedItem, NormalizedOrder, Order, OrderLineItem, Product, RawLineItem, RawOrder, Seller,
};
