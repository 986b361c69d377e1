pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use commands::{
    CreateBovidError, DeleteBovidError, UpdateBovidCommand, UpdateBovidError, UploadImageCommand,
    UploadImageError,
};
pub use queries::{GetBovidError, ListBovidsError, ListBovidsQuery};
pub use types::{BovidDetailResponse, BovidImageResponse, BovidPayload, BovidResponse};

pub use routes::bovids_routes;
