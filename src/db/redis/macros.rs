/// A macro to simplify read-through caching against Redis.
///
/// Checks the cache first and returns a hit directly. On a miss, runs the
/// provided block, hands the result to the background cache writer, and
/// returns it.
///
/// # Arguments
/// * `$cache`: The cache instance. Must provide `get_from_cache` and
///   `set_in_background`.
/// * `$key`: The cache key for the value.
/// * `$ttl`: The time-to-live for the cached value in seconds.
/// * `$block`: The block to execute when the value is not in cache.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
