//! Property-Based Tests for the Cache Client
//!
//! Uses proptest, driving the async client with `tokio_test::block_on`.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use crate::backend::MemoryBackend;
use crate::cache::CacheClient;
use crate::config::ClientConfig;
use crate::error::CacheError;

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}"
}

fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,256}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
    Remove { key: String },
}

/// Keys drawn from a small pool so operations collide.
fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    let key = "[a-d]";
    prop_oneof![
        (key, valid_value_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Remove { key }),
    ]
}

fn new_client() -> CacheClient<MemoryBackend> {
    CacheClient::new(MemoryBackend::default(), ClientConfig::default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A value read back before expiration equals the value written.
    #[test]
    fn prop_put_then_get_returns_value(key in valid_key_strategy(), value in valid_value_strategy()) {
        let client = new_client();
        let read: Option<String> = tokio_test::block_on(async {
            client.put(&key, &value, None).await.unwrap();
            client.get(&key).await.unwrap()
        });
        prop_assert_eq!(read, Some(value));
    }

    #[test]
    fn prop_get_before_put_misses(key in valid_key_strategy()) {
        let client = new_client();
        let read: Option<String> = tokio_test::block_on(client.get(&key)).unwrap();
        prop_assert!(read.is_none());
    }

    // Remove leaves the key absent, whether or not it existed, and repeats cleanly.
    #[test]
    fn prop_remove_is_idempotent(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        stored in any::<bool>()
    ) {
        let client = new_client();
        tokio_test::block_on(async {
            if stored {
                client.put(&key, &value, None).await.unwrap();
            }
            prop_assert!(client.remove(&key).await.is_ok());
            prop_assert!(client.remove(&key).await.is_ok());
            prop_assert!(client.get::<String>(&key).await.unwrap().is_none());
            Ok(())
        })?;
    }

    #[test]
    fn prop_overwrite_returns_latest(
        key in valid_key_strategy(),
        first in valid_value_strategy(),
        second in valid_value_strategy()
    ) {
        let client = new_client();
        let read: Option<String> = tokio_test::block_on(async {
            client.put(&key, &first, None).await.unwrap();
            client.put(&key, &second, None).await.unwrap();
            client.get(&key).await.unwrap()
        });
        prop_assert_eq!(read, Some(second));
    }

    // The client agrees with a plain HashMap model for any operation sequence.
    #[test]
    fn prop_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let client = new_client();
        let mut model: HashMap<String, String> = HashMap::new();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        tokio_test::block_on(async {
            for op in ops {
                match op {
                    CacheOp::Put { key, value } => {
                        client.put(&key, &value, None).await.unwrap();
                        model.insert(key, value);
                    }
                    CacheOp::Get { key } => {
                        let read: Option<String> = client.get(&key).await.unwrap();
                        if read.is_some() {
                            expected_hits += 1;
                        } else {
                            expected_misses += 1;
                        }
                        prop_assert_eq!(read.as_ref(), model.get(&key));
                    }
                    CacheOp::Remove { key } => {
                        client.remove(&key).await.unwrap();
                        model.remove(&key);
                    }
                }
            }
            Ok(())
        })?;

        let stats = client.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
    }

    #[test]
    fn prop_closed_client_rejects_everything(key in valid_key_strategy(), value in valid_value_strategy()) {
        let client = new_client();
        tokio_test::block_on(async {
            client.close().await.unwrap();
            prop_assert!(matches!(client.put(&key, &value, None).await, Err(CacheError::ClientClosed)));
            prop_assert!(matches!(client.get::<String>(&key).await, Err(CacheError::ClientClosed)));
            prop_assert!(matches!(client.remove(&key).await, Err(CacheError::ClientClosed)));
            prop_assert!(matches!(client.close().await, Err(CacheError::ClientClosed)));
            Ok(())
        })?;
    }
}

// Fewer cases for the time-sensitive expiry property
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    #[test]
    fn prop_entry_absent_after_ttl(key in valid_key_strategy(), value in valid_value_strategy()) {
        let client = new_client();
        tokio_test::block_on(async {
            client.put(&key, &value, Some(Duration::from_millis(200))).await.unwrap();
            let before: Option<String> = client.get(&key).await.unwrap();
            prop_assert_eq!(before, Some(value.clone()));

            tokio::time::sleep(Duration::from_millis(300)).await;

            let after: Option<String> = client.get(&key).await.unwrap();
            prop_assert!(after.is_none(), "Entry should not be found after TTL expires");
            Ok(())
        })?;
    }
}
