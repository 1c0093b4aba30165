use curfew_core::{Config, NewsClient};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let client = NewsClient::from_config(&config.news)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let items = runtime.block_on(client.fetch_or_empty());

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        eprintln!("No news available right now.");
        return Ok(());
    }
    for item in &items {
        println!("{}", item.title.as_deref().unwrap_or("(untitled)"));
        if let Some(date) = &item.pub_date {
            println!("  {date}");
        }
        if let Some(link) = &item.link {
            println!("  {link}");
        }
    }
    Ok(())
}
