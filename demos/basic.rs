use swapi_http::{Resource, SwapiClient, WindowRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let swapi = SwapiClient::from_env().map_err(anyhow::Error::msg)?;

    let window = swapi
        .window_of(Resource::People, &WindowRequest::new(2, 25))
        .await?;

    println!(
        "{} people on page 2 (total {})",
        window.len(),
        window
            .total
            .map_or_else(|| "unknown".to_owned(), |total| total.to_string())
    );
    for person in &window.items {
        println!("{}", person["name"]);
    }

    Ok(())
}
