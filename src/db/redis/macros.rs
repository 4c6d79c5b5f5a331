/// Read-through caching around an async computation.
///
/// Looks `$key` up in `$cache`; on a hit the cached value is returned. On a miss
/// `$block` is awaited, its value is queued for storage with `$ttl` seconds to live,
/// and then returned. Errors from the lookup or the block propagate with `?`.
///
/// # Example
/// ```rust,ignore
/// let details: MediaDetails = cached!(
///     self.cache,
///     CacheKey::Details(kind, id),
///     DETAILS_CACHE_TTL,
///     async move { self.fetch(&path, &[]).await }
/// )?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get_from_cache(&key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
