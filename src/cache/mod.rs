/*!
 * Caching for tool results.
 *
 * - `store`: generic TTL key/value store with observer hooks and a background sweep
 * - `keys`: deterministic key derivation and the per-operation TTL tiers
 */

pub use self::keys::{KeyBuilder, generate_key, ttl};
pub use self::store::{CacheObserver, CacheSize, CacheStats, CacheStore, LoggingObserver, SweeperHandle};

pub mod keys;
pub mod store;
