// Route handlers, grouped by resource
//
// Every handler runs behind `identity_middleware`, so a `RequestIdentity`
// extension is always present. Authorization is decided by the service
// layer, not here.
pub mod auth;
pub mod health;
pub mod product_files;
