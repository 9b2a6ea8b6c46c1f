//! Storage backends
//!
//! Two concerns live here: the single-slot key-value store backing the
//! daily forecast cache, and the per-user birth record store. Both are
//! capability traits so services can run against in-memory fakes in tests.

pub mod kv;
pub mod profile;

pub use kv::{select_kv_store, FileKvStore, KvStore, MemoryKvStore, PostgresKvStore};
pub use profile::{MemoryProfileStore, PgProfileStore, ProfileStore};
