//! Example: store a few values in Redis and replay the recorded calls.
//!
//! Run with a Redis server reachable at `REDIS_URL` (default `redis://localhost:6379`):
//!
//! ```text
//! RUST_LOG=tally_cache=debug cargo run --example replay
//! ```

use std::sync::Arc;
use tally_cache::{Cache, RedisStore, RedisStoreConfig, Store, replay};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let store: Arc<dyn Store> = Arc::new(RedisStore::new(RedisStoreConfig::from_env()).await?);

    // The cache clears the database on construction.
    let cache = Cache::new(store).await?;

    let foo = cache.store("foo").await?;
    let bar = cache.store(b"bar".to_vec()).await?;
    let answer = cache.store(42).await?;

    println!("{:?}", cache.retrieve_str(&foo).await?);
    println!("{:?}", cache.retrieve(&bar).await?);
    println!("{:?}", cache.retrieve_int(&answer).await?);
    println!("{:?}", cache.retrieve_int("nonexistent-key").await?);

    replay(&cache.store_handle()).await?;

    Ok(())
}
