//! marketplace-api: resilient REST client for the marketplace backend.
//!
//! Every call goes through [`ApiClient::request`], which layers a TTL response
//! cache, fixed-delay retries, ordered multi-host failover, and error
//! normalization over a pluggable [`Transport`].
//!
//! ```no_run
//! use marketplace_api::{ApiClient, ApiRequest};
//! use url::Url;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::builder()
//!     .base_url(Url::parse("https://api.example.com")?)
//!     .build()?;
//!
//! let offers: serde_json::Value = client
//!     .request(ApiRequest::get("/ofertas").bearer("token"))
//!     .await?;
//! println!("{offers}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod payments;
pub mod trainings;

pub use crate::core::client::{
    Backoff, BaseUrls, CacheMode, CachePolicy, ConnectivityStatus, ProbeMode, RetryConfig,
};
pub use crate::core::{
    ApiClient, ApiClientBuilder, ApiError, ApiRequest, BuildError, ErrorKind, SessionEvent,
    Transport,
};
pub use payments::{PaymentGateway, PaymentOutcome, PaymentReceipt, PaymentRequest};
pub use trainings::{NewTraining, Training, TrainingCreated, TrainingStatus, Trainings};

/// Install a `tracing` subscriber honoring `RUST_LOG`. Intended for demos and tests.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
