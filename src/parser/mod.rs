//! Document indexing: raw block lists become an addressable, typed index.

mod index;

pub use index::BlockIndex;

/// Error handling mode during indexing.
///
/// Controls the dangling-relationship policy: in [`ErrorMode::Strict`]
/// (the default) a relationship pointing at an id absent from the input
/// aborts the conversion with a schema error; in [`ErrorMode::Lenient`]
/// the reference is dropped and reported as a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on dangling relationships
    #[default]
    Strict,
    /// Drop dangling relationships and continue
    Lenient,
}
