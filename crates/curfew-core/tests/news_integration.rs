//! Integration tests for the news feed client against a local HTTP server.

use std::time::Duration;

use curfew_core::{FeedError, NewsClient};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Local news</title>
    <item>
      <title>Curfew hours unchanged this week</title>
      <link>https://news.example/curfew</link>
      <description>City administration statement.</description>
      <pubDate>Tue, 04 Jun 2024 08:00:00 +0300</pubDate>
    </item>
    <item>
      <title>Metro schedule update</title>
      <link>https://news.example/metro</link>
    </item>
    <item>
      <title>Night curfew: what you need to know</title>
    </item>
  </channel>
</rss>"#;

fn client(url: String, keywords: &[&str]) -> NewsClient {
    NewsClient::new(
        &url,
        keywords.iter().map(|k| k.to_string()).collect(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_returns_items_in_document_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rss")
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(FEED)
        .create_async()
        .await;

    let items = client(format!("{}/rss", server.url()), &[])
        .fetch()
        .await
        .unwrap();

    mock.assert_async().await;
    let titles: Vec<_> = items.iter().filter_map(|i| i.title.as_deref()).collect();
    assert_eq!(
        titles,
        vec![
            "Curfew hours unchanged this week",
            "Metro schedule update",
            "Night curfew: what you need to know"
        ]
    );
    assert_eq!(items[1].description, None);
    assert_eq!(items[2].link, None);
}

#[tokio::test]
async fn test_keyword_filter_applies_to_titles() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rss")
        .with_status(200)
        .with_body(FEED)
        .create_async()
        .await;

    let items = client(format!("{}/rss", server.url()), &["curfew"])
        .fetch()
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rss")
        .with_status(503)
        .create_async()
        .await;

    let news = client(format!("{}/rss", server.url()), &[]);
    assert!(matches!(
        news.fetch().await,
        Err(FeedError::Status { status: 503 })
    ));
    assert!(news.fetch_or_empty().await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_reads_as_empty() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rss")
        .with_status(200)
        .with_body("<rss><channel><item><title>broken")
        .create_async()
        .await;

    let news = client(format!("{}/rss", server.url()), &[]);
    assert!(matches!(news.fetch().await, Err(FeedError::Parse(_))));
    assert!(news.fetch_or_empty().await.is_empty());
}

#[tokio::test]
async fn test_unreachable_host_reads_as_empty() {
    // Nothing listens on port 9 (discard) on test machines.
    let news = client("http://127.0.0.1:9/rss".to_string(), &[]);
    assert!(news.fetch_or_empty().await.is_empty());
}
