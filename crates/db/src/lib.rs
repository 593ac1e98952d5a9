pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod stores;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{DemoSeedDataset, SeedResult, VerificationResult};
pub use stores::{
    AuthorDirectory, EventStore, InMemoryAuthorDirectory, InMemoryEventStore,
    InMemoryTrafficStore, SqlAuthorDirectory, SqlEventStore, SqlTrafficStore, StoreError,
    TrafficStore,
};
