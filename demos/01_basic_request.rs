use marketplace_api::{ApiClient, ApiRequest, ErrorKind, Trainings};
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    marketplace_api::init_tracing_for_tests();

    let client = ApiClient::builder()
        .base_url(Url::parse("https://api.example.com")?)
        .on_session_event(|event| println!("  session event: {event:?}"))
        .build()?;

    println!("--- Connectivity ---");
    println!("  online: {}", client.check_connectivity().await);
    println!();

    println!("--- Raw request ---");
    match client
        .request::<serde_json::Value>(ApiRequest::get("/ofertas").bearer("demo-token"))
        .await
    {
        Ok(offers) => println!("  offers: {offers}"),
        Err(e) if e.kind == ErrorKind::AuthTokenExpired => println!("  please sign in again"),
        Err(e) => println!("  request failed ({}): {e}", e.kind),
    }
    println!();

    println!("--- Typed trainings ---");
    let trainings = Trainings::new(&client).token("demo-token");
    match trainings.list().await {
        Ok(list) => {
            for t in list {
                println!("  - {} ({:?}) {:.2}", t.title, t.status, t.price);
            }
        }
        Err(e) => println!("  could not list trainings: {e}"),
    }

    Ok(())
}
