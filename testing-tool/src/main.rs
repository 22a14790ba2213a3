use anyhow::{bail, Context, Result};
use colored::*;
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<()> {
    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("API_URL").ok())
        .unwrap_or_else(|| "http://localhost:4000".to_string());
    let base_url = base_url.trim_end_matches('/').to_string();

    println!("{}", "🚗 Rental Pricing Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!("{} {}", "📤 API:".bright_blue(), base_url);
    println!();

    let client = reqwest::Client::new();
    let mut failures = 0;

    let checks: [(&str, _); 4] = [
        ("GET /health", check_health(&client, &base_url).await),
        ("GET /features", check_features(&client, &base_url).await),
        ("GET /preview", check_preview(&client, &base_url).await),
        ("POST /predict", check_predict(&client, &base_url).await),
    ];

    for (name, result) in checks {
        match result {
            Ok(detail) => println!("{} {} {}", "✅".green(), name.bright_green().bold(), detail),
            Err(e) => {
                failures += 1;
                println!("{} {} {}", "❌".red(), name.bright_red().bold(), e);
            }
        }
    }

    println!();
    if failures > 0 {
        bail!("{} comprobaciones fallidas", failures);
    }
    println!("{}", "👋 Todo correcto".bright_green());
    Ok(())
}

async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value> {
    let response = client.get(url).send().await.with_context(|| format!("GET {}", url))?;
    let status = response.status();
    let body: Value = response.json().await.context("response is not JSON")?;
    if !status.is_success() {
        bail!("status {}: {}", status, body);
    }
    Ok(body)
}

async fn check_health(client: &reqwest::Client, base_url: &str) -> Result<String> {
    let body = get_json(client, &format!("{}/health", base_url)).await?;
    if body["status"] != "ok" {
        bail!("unexpected status {}", body["status"]);
    }
    Ok(format!("{} filas en el dataset", body["dataset_rows"]))
}

async fn check_features(client: &reqwest::Client, base_url: &str) -> Result<String> {
    let body = get_json(client, &format!("{}/features?feature=fuel", base_url)).await?;
    let values = body.as_array().context("expected a JSON array")?;
    if values.is_empty() {
        bail!("no values for 'fuel'");
    }
    Ok(format!("{} valores de fuel", values.len()))
}

async fn check_preview(client: &reqwest::Client, base_url: &str) -> Result<String> {
    let body = get_json(client, &format!("{}/preview?rows=3", base_url)).await?;
    let columns = body.as_object().context("expected a JSON object")?;
    for (column, cells) in columns {
        let rows = cells.as_object().with_context(|| format!("column '{}' is not an object", column))?;
        if rows.len() > 3 {
            bail!("column '{}' has {} rows", column, rows.len());
        }
    }
    Ok(format!("{} columnas", columns.len()))
}

async fn check_predict(client: &reqwest::Client, base_url: &str) -> Result<String> {
    let payload = json!({
        "model_key": "Renault",
        "mileage": 50000,
        "engine_power": 120,
        "fuel": "diesel",
        "paint_color": "black",
        "car_type": "sedan",
        "private_parking_available": false,
        "has_gps": false,
        "has_air_conditioning": false,
        "automatic_car": false,
        "has_getaround_connect": false,
        "has_speed_regulator": false,
        "winter_tires": false
    });
    let url = format!("{}/predict", base_url);
    let response = client.post(&url).json(&payload).send().await.with_context(|| format!("POST {}", url))?;
    let status = response.status();
    let body: Value = response.json().await.context("response is not JSON")?;
    if !status.is_success() {
        bail!("status {}: {}", status, body);
    }
    let prediction = body["prediction"].as_f64().context("missing numeric 'prediction'")?;
    if !prediction.is_finite() {
        bail!("non-finite prediction {}", prediction);
    }
    Ok(format!("{:.2} €/día", prediction))
}
