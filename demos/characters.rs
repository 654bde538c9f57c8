use std::time::Duration;

use swapi_http::{filter_by_name, Resource, SwapiClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let film_id: u64 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(1);
    let term = std::env::args().nth(2).unwrap_or_default();

    let swapi = SwapiClient::from_env().map_err(anyhow::Error::msg)?;
    let path = Resource::Films.item_path(film_id);

    let characters = tokio::time::timeout(
        Duration::from_secs(10),
        swapi.resolve_references(&path, "characters"),
    )
    .await??;

    for character in filter_by_name(characters, &term) {
        println!("#{} {}", character["id"], character["name"]);
    }

    Ok(())
}
