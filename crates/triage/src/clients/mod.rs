//! Clients for the external collaborators: the embedding service, the
//! vector index, and the archive object store. Each sits behind an async
//! trait with one HTTP implementation and one in-memory double so the
//! pipelines can be exercised without the network.

pub mod archive;
pub mod embedding;
pub mod index;

pub use archive::{HttpObjectArchive, MemoryArchive, ObjectArchive};
pub use embedding::{EmbeddingService, HttpEmbeddingService, StaticEmbeddingService};
pub use index::{HttpVectorIndex, IndexDatapoint, MemoryVectorIndex, Neighbor, VectorIndex};
