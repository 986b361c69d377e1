pub mod get;
pub mod list;

pub use get::GetBovidError;
pub use list::{ListBovidsError, ListBovidsQuery};
