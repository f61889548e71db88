pub mod hit_testing;

pub use hit_testing::{ResizeHandle, SelectionHit, hit_test};
