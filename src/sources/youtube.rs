use serde::Deserialize;

use crate::config::SourceConfig;
use crate::sources::{SourceError, SourceResult};
use crate::trends::VideoRecord;

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const MAX_RESULTS: usize = 50;

/// YouTube Data API v3 client. Search results only carry snippets, so every
/// lookup is two calls: search for IDs, then a videos.list for statistics.
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YouTubeClient {
    pub fn new(api_key: String, config: Option<&SourceConfig>) -> Self {
        let base_url = config
            .and_then(|c| c.base_url.clone())
            .unwrap_or_else(|| YOUTUBE_API_BASE.to_string());
        Self {
            api_key,
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> SourceResult<serde_json::Value> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(SourceError::Upstream(format!(
                "YouTube API returned {}: {}",
                status, text
            )));
        }
        Ok(resp.json()?)
    }

    /// Recent videos matching a keyword, with view and like counts.
    pub fn search_videos(
        &self,
        keyword: &str,
        locale: &str,
        days: i64,
    ) -> SourceResult<Vec<VideoRecord>> {
        let published_after = (chrono::Utc::now() - chrono::Duration::days(days))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        let max = MAX_RESULTS.to_string();

        let search = self.get_json(
            "search",
            &[
                ("part", "snippet"),
                ("type", "video"),
                ("q", keyword),
                ("regionCode", locale),
                ("publishedAfter", &published_after),
                ("order", "viewCount"),
                ("maxResults", &max),
            ],
        )?;

        let ids: Vec<String> = search
            .get("items")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.pointer("/id/videoId"))
                    .filter_map(|v| v.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.videos_by_id(&ids)
    }

    /// Current most-popular videos for a region, optionally narrowed to a
    /// category.
    pub fn trending_videos(
        &self,
        category: Option<&str>,
        locale: &str,
    ) -> SourceResult<Vec<VideoRecord>> {
        let max = MAX_RESULTS.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("part", "snippet,statistics"),
            ("chart", "mostPopular"),
            ("regionCode", locale),
            ("maxResults", &max),
        ];
        let cat_id = category.and_then(category_id);
        if let Some(id) = cat_id {
            query.push(("videoCategoryId", id));
        }

        let json = self.get_json("videos", &query)?;
        parse_video_items(&json)
    }

    fn videos_by_id(&self, ids: &[String]) -> SourceResult<Vec<VideoRecord>> {
        let joined = ids.join(",");
        let json = self.get_json(
            "videos",
            &[("part", "snippet,statistics"), ("id", &joined)],
        )?;
        parse_video_items(&json)
    }
}

/// YouTube category IDs for the categories the trending dashboard exposes.
/// Politics, economy and society all map to News & Politics.
pub fn category_id(category: &str) -> Option<&'static str> {
    match category {
        "politics" | "economy" | "society" => Some("25"),
        "culture" => Some("24"),
        "tech" => Some("28"),
        "sports" => Some("17"),
        "gaming" => Some("20"),
        "education" => Some("27"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Option<VideoSnippet>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct VideoStatistics {
    // counts arrive as decimal strings
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
}

fn parse_video_items(json: &serde_json::Value) -> SourceResult<Vec<VideoRecord>> {
    let items = json
        .get("items")
        .cloned()
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
    let items: Vec<VideoItem> = serde_json::from_value(items)?;

    Ok(items
        .into_iter()
        .map(|item| {
            let snippet = item.snippet.unwrap_or(VideoSnippet {
                title: None,
                channel_title: None,
                published_at: None,
                tags: None,
            });
            let stats = item.statistics.unwrap_or(VideoStatistics {
                view_count: None,
                like_count: None,
            });
            VideoRecord {
                title: snippet.title.unwrap_or_else(|| "Untitled".to_string()),
                channel_title: snippet.channel_title.unwrap_or_default(),
                view_count: parse_count(stats.view_count.as_deref()),
                like_count: parse_count(stats.like_count.as_deref()),
                published_at: snippet.published_at.unwrap_or_default(),
                tags: snippet.tags.unwrap_or_default(),
            }
        })
        .collect())
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_map_covers_dashboard_categories() {
        assert_eq!(category_id("politics"), Some("25"));
        assert_eq!(category_id("economy"), Some("25"));
        assert_eq!(category_id("society"), Some("25"));
        assert_eq!(category_id("culture"), Some("24"));
        assert_eq!(category_id("tech"), Some("28"));
        assert_eq!(category_id("sports"), Some("17"));
        assert_eq!(category_id("gaming"), Some("20"));
        assert_eq!(category_id("education"), Some("27"));
        assert_eq!(category_id("all"), None);
    }

    #[test]
    fn parse_video_items_reads_string_counts() {
        let json = serde_json::json!({
            "items": [{
                "snippet": {
                    "title": "Rust in 10 minutes",
                    "channelTitle": "devchan",
                    "publishedAt": "2026-08-01T00:00:00Z",
                    "tags": ["rust", "tutorial"]
                },
                "statistics": { "viewCount": "123456", "likeCount": "789" }
            }]
        });
        let videos = parse_video_items(&json).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].title, "Rust in 10 minutes");
        assert_eq!(videos[0].view_count, 123_456);
        assert_eq!(videos[0].like_count, 789);
        assert_eq!(videos[0].tags, vec!["rust", "tutorial"]);
    }

    #[test]
    fn parse_video_items_tolerates_missing_fields() {
        let json = serde_json::json!({ "items": [{ "snippet": { "title": "bare" } }] });
        let videos = parse_video_items(&json).unwrap();
        assert_eq!(videos[0].title, "bare");
        assert_eq!(videos[0].view_count, 0);
        assert!(videos[0].tags.is_empty());
    }

    #[test]
    fn parse_video_items_empty_response() {
        let json = serde_json::json!({});
        assert!(parse_video_items(&json).unwrap().is_empty());
    }
}
