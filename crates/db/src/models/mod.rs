//! Row models and DTOs.

pub mod annotation;
pub mod user;
pub mod volume;

pub use annotation::{
    InsertedAnnotation, NewAnnotationLabel, NewPolygonAnnotation, PointAnnotation,
};
pub use user::User;
pub use volume::Volume;
