//! Repository 実装
//!
//! - `inmemory`: HashMap を使ったインメモリ実装（プロセス単位、永続化なし）

pub mod inmemory;

pub use inmemory::InMemoryRoomRepository;
