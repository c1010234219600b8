//! Query encoding and vector search for fisibot.
//!
//! - [`BertEncoder`]: sentence encoder running locally via Candle (feature `local`)
//! - [`QdrantIndex`]: Qdrant collection queried over its REST API
//! - [`InMemoryIndex`]: brute-force cosine index for tests and offline runs
//! - [`VectorRetriever`]: encoder + index, producing ranked [`Fragment`]s
//!
//! [`Fragment`]: fisibot_core::Fragment

#[cfg(feature = "local")]
pub mod encoder;
pub mod in_memory;
pub mod qdrant;
pub mod retriever;
pub mod similarity;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(feature = "local")]
pub use encoder::BertEncoder;
pub use in_memory::InMemoryIndex;
pub use qdrant::QdrantIndex;
pub use retriever::VectorRetriever;
