//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Methods that must run inside the conversion job's transaction accept
//! `&mut PgConnection`; marker bookkeeping accepts `&PgPool` because it
//! must survive a rolled-back job transaction.

pub mod annotation_repo;
pub mod image_repo;
pub mod user_repo;
pub mod volume_repo;

pub use annotation_repo::AnnotationRepo;
pub use image_repo::ImageRepo;
pub use user_repo::UserRepo;
pub use volume_repo::VolumeRepo;
