//! Example: Upload a local image with the blocking client.

use sauce_search::{BlockingSauceNao, SauceError, SearchConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: blocking_file_search <image>"))?;
    let bytes = std::fs::read(&path)?;

    let sauce = BlockingSauceNao::new(SearchConfig::new());

    match sauce.from_file(bytes) {
        Ok(results) => {
            println!("{}", results);
            for result in &results {
                println!("  {} -> {:?}", result, result.urls);
            }
        }
        Err(e) if e.is_limit_reached() => {
            println!("Quota exhausted, try again later: {}", e);
        }
        Err(SauceError::FileTooLarge) => {
            println!("{} is too large to upload", path);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
