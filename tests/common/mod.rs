//! Common test utilities for bandcamp-dl integration tests

use bandcamp_dl::{Config, DownloadDescriptor};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Escape a JSON document the way the storefront escapes its pagedata blob
#[allow(dead_code)]
pub fn escape_blob(json: &str) -> String {
    json.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A minimal storefront page embedding `blob_json` as its pagedata
#[allow(dead_code)]
pub fn pagedata_html(blob_json: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>fixture</title></head>
<body>
<div id="pagedata" data-blob="{}"></div>
</body>
</html>"#,
        escape_blob(blob_json)
    )
}

/// Serve a pagedata page at `page_path`
#[allow(dead_code)]
pub async fn mount_pagedata(server: &MockServer, page_path: &str, blob_json: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(pagedata_html(blob_json)))
        .mount(server)
        .await;
}

/// Serve a download page whose single item offers the given format/url pairs
#[allow(dead_code)]
pub async fn mount_download_page(
    server: &MockServer,
    page_path: &str,
    artist: &str,
    title: &str,
    downloads: &[(&str, &str)],
) {
    let options: Vec<String> = downloads
        .iter()
        .map(|(format, url)| format!(r#""{format}": {{"url": "{url}"}}"#))
        .collect();
    let blob = format!(
        r#"{{"download_items": [{{"artist": "{artist}", "title": "{title}", "type": "a", "downloads": {{{}}}}}]}}"#,
        options.join(", ")
    );
    mount_pagedata(server, page_path, &blob).await;
}

/// Serve `size` bytes of content at `content_path`, for both GET and HEAD
#[allow(dead_code)]
pub async fn mount_content(server: &MockServer, content_path: &str, size: usize) {
    Mock::given(method("GET"))
        .and(path(content_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; size]))
        .mount(server)
        .await;
    // HEAD gets the same template; the server advertises content-length, the
    // client never reads a body.
    Mock::given(method("HEAD"))
        .and(path(content_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; size]))
        .mount(server)
        .await;
}

/// Config rooted at a test directory
#[allow(dead_code)]
pub fn test_config(root: &Path, worker_count: usize) -> Config {
    Config {
        destination_root: root.to_path_buf(),
        worker_count,
        ..Default::default()
    }
}

/// Descriptor pointing at `content_path` on the mock server, with the
/// production destination layout under `root`
#[allow(dead_code)]
pub fn descriptor(
    server: &MockServer,
    content_path: &str,
    root: &Path,
    title: &str,
    expected_size: Option<u64>,
) -> DownloadDescriptor {
    DownloadDescriptor {
        artist: "Test Artist".to_string(),
        title: title.to_string(),
        source_url: format!("{}{content_path}", server.uri()),
        destination_path: root
            .join("Test Artist")
            .join(format!("{title} [mp3-320].zip")),
        expected_size,
    }
}
