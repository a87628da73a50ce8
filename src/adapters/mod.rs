// Adapters - External system implementations

pub mod mock;

// Re-export adapters
pub use mock::{MockChatAdapter, MockExtractorAdapter, MockResolverAdapter, MockUploaderAdapter};
