//! Example: Search for an image by URL with the async client.

use sauce_search::{Database, Hide, SauceNao, SearchConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://saucenao.com/images/static/banner.gif".to_string());

    let config = SearchConfig::new()
        .with_db(Database::All)
        .with_numres(8)
        .with_hide(Hide::Suspected);
    let sauce = SauceNao::new(config);

    println!("Searching for: {}", url);
    println!();

    let results = sauce.from_url(&url).await?;

    println!("{}", results);
    println!();

    for (i, result) in results.iter().enumerate() {
        println!("{}. {}", i + 1, result);
        println!("   Index: {}", result.index_name);
        if let Some(author) = &result.author {
            println!("   Author: {}", author);
        }
        for url in &result.urls {
            println!("   {}", url);
        }
        println!();
    }

    sauce.close();
    Ok(())
}
