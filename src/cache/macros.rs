/// Read-through caching over an optional [`Cache`](crate::cache::Cache).
///
/// Looks the key up first and returns the cached value on a hit. On a miss,
/// or when no cache is configured, awaits `$block`, schedules a background
/// write of the result, and returns it. Lookup failures count as misses.
///
/// # Arguments
/// * `$cache`: an `Option<Cache>`.
/// * `$key`: the [`CacheKey`](crate::cache::CacheKey) for the value.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: a future yielding `AppResult<T>`.
///
/// # Example
/// ```rust,ignore
/// let details = cached!(self.cache, CacheKey::MovieDetails(id, lang), TTL, async move {
///     fetch_from_api(id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.as_ref() {
            Some(cache) => cache.lookup(&key).await,
            None => None,
        };

        match hit {
            Some(cached) => Ok(cached),
            None => {
                let value = $block.await?;
                if let Some(cache) = $cache.as_ref() {
                    cache.set_in_background(&key, &value, $ttl);
                }
                Ok(value)
            }
        }
    }};
}
