//! Client demo: logs in to student-api with form credentials, then lists students with the token.
//!
//! Run from repo root: `cargo run -p client-demo`
//! Settings: `API_BASE` (default http://127.0.0.1:8000), `API_USERNAME` / `API_PASSWORD` (default admin / admin).

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("client_demo=info")))
        .init();

    let base = std::env::var("API_BASE").unwrap_or_else(|_| "http://127.0.0.1:8000".into());
    let username = std::env::var("API_USERNAME").unwrap_or_else(|_| "admin".into());
    let password = std::env::var("API_PASSWORD").unwrap_or_else(|_| "admin".into());
    let client = reqwest::Client::new();

    let auth_url = format!("{}/api/auth", base.trim_end_matches('/'));
    tracing::info!(url = %auth_url, "requesting token");
    let auth_response = client
        .post(&auth_url)
        .form(&[("username", username.as_str()), ("password", password.as_str())])
        .send()
        .await?;
    let auth_text = auth_response.text().await?;
    println!("{}", auth_text);

    let token = serde_json::from_str::<serde_json::Value>(&auth_text)
        .ok()
        .and_then(|v| v.get("token").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_default();
    if token.is_empty() {
        tracing::warn!("no token in auth response; the list request will be rejected");
    }

    let url = format!("{}/api/student_list", base.trim_end_matches('/'));
    let response = client
        .get(&url)
        .header(reqwest::header::AUTHORIZATION, format!("Token {}", token))
        .send()
        .await?;
    println!("{}", response.text().await?);
    Ok(())
}
