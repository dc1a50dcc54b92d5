// Read-side views of store records. Only the fields access decisions depend
// on are decoded; everything else in a record is ignored.
pub mod reference;
pub mod user;
pub mod product;
pub mod order;

pub use reference::{RecordRef, Ref};
pub use user::Role;
pub use product::Product;
pub use order::Order;
