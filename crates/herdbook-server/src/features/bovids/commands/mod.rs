pub mod create;
pub mod delete;
pub mod update;
pub mod upload_image;

pub use create::CreateBovidError;
pub use delete::DeleteBovidError;
pub use update::{UpdateBovidCommand, UpdateBovidError};
pub use upload_image::{UploadImageCommand, UploadImageError};
