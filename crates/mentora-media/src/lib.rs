//! # mentora-media
//!
//! Uploads learner and course media to a remote object store:
//! - `ObjectStore`: upload / delete capability of a storage backend
//! - `CloudinaryStore`: signed HTTP implementation of `ObjectStore`
//! - `UploadService`: per-attempt timeout, always-retry with linear backoff,
//!   and fail-fast behavior when credentials are missing
//! - `public_id_from_url`: recovers the stored object id from a delivery URL

mod cloudinary;
mod credentials;
mod error;
mod locator;
mod service;
mod store;

pub use cloudinary::{sign_params, CloudinaryStore};
pub use credentials::Credentials;
pub use error::{MediaError, Result};
pub use locator::public_id_from_url;
pub use service::{UploadOptions, UploadService};
pub use store::{ObjectStore, UploadRequest, UploadedAsset};
