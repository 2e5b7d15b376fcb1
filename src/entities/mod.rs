pub mod postmeta;
pub mod posts;

pub use postmeta::{MetaRow, PostMetaRow};
pub use posts::{JobRecord, PostRow};
