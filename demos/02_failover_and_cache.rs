use std::time::Duration;

use marketplace_api::{ApiClientBuilder, ApiRequest, CacheMode, CachePolicy, RetryConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    marketplace_api::init_tracing_for_tests();

    // e.g. MARKETPLACE_API_BASE_URLS="https://api.example.com,https://api-backup.example.com"
    let client = ApiClientBuilder::from_env()?
        .retry_config(RetryConfig::fixed(2, Duration::from_millis(300)))
        .fallback_retry_config(RetryConfig::fixed(0, Duration::ZERO))
        .cache_ttl(Duration::from_secs(30))
        .timeout(Duration::from_secs(10))
        .build()?;

    println!("--- Hosts (primary first) ---");
    for url in client.base_urls().iter() {
        println!("  {url}");
    }
    println!();

    let agenda = ApiRequest::get("/agenda").cache(CachePolicy::enabled(Duration::from_secs(5)));

    println!("--- First read goes to the network ---");
    let started = std::time::Instant::now();
    let first = client.request::<serde_json::Value>(agenda.clone()).await;
    println!("  {:?} in {:?}", first.as_ref().map(|_| "ok"), started.elapsed());

    println!("--- Second read is served from cache ---");
    let started = std::time::Instant::now();
    let _ = client.request::<serde_json::Value>(agenda.clone()).await;
    println!("  done in {:?}", started.elapsed());

    println!("--- Forced refresh ---");
    let refreshed = client
        .request::<serde_json::Value>(agenda.cache(CachePolicy::default().mode(CacheMode::Refresh)))
        .await;
    if let Err(e) = refreshed {
        println!("  refresh failed: {} [{}]", e.message, e.code.unwrap_or_default());
    }

    Ok(())
}
