pub mod storage;

pub use storage::InMemoryPreferenceRepository;
