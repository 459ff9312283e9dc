use crate::config::SourceConfig;
use crate::sources::{SourceError, SourceResult};

const NEWS_RSS_BASE: &str = "https://news.google.com/rss";

/// Google News RSS reader. No API key needed; the feed is plain XML and the
/// only thing we want from it is headline text, so a CDATA-title regex is
/// enough instead of a full XML parser.
pub struct NewsClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl NewsClient {
    pub fn new(config: Option<&SourceConfig>) -> Self {
        let base_url = config
            .and_then(|c| c.base_url.clone())
            .unwrap_or_else(|| NEWS_RSS_BASE.to_string());
        Self {
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Headlines for a category in a locale. The first title in a Google
    /// News feed is the feed's own name, so it is dropped.
    pub fn headlines(&self, category: Option<&str>, locale: &str) -> SourceResult<Vec<String>> {
        let (hl, gl, ceid) = locale_params(locale);
        let base = self.base_url.trim_end_matches('/');
        let url = match category.and_then(topic_code) {
            Some(topic) => format!(
                "{}/headlines/section/topic/{}?hl={}&gl={}&ceid={}",
                base, topic, hl, gl, ceid
            ),
            None => format!("{}?hl={}&gl={}&ceid={}", base, hl, gl, ceid),
        };

        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Upstream(format!(
                "Google News returned {}",
                status
            )));
        }
        let body = resp.text()?;
        Ok(extract_titles(&body))
    }
}

/// Google News topic codes for the dashboard categories.
fn topic_code(category: &str) -> Option<&'static str> {
    match category {
        "politics" | "society" => Some("NATION"),
        "economy" => Some("BUSINESS"),
        "culture" => Some("ENTERTAINMENT"),
        "tech" | "gaming" => Some("TECHNOLOGY"),
        "sports" => Some("SPORTS"),
        "education" => Some("SCIENCE"),
        _ => None,
    }
}

fn locale_params(locale: &str) -> (&'static str, &'static str, &'static str) {
    match locale {
        "KR" => ("ko", "KR", "KR:ko"),
        "JP" => ("ja", "JP", "JP:ja"),
        _ => ("en-US", "US", "US:en"),
    }
}

/// Pull CDATA-wrapped item titles out of an RSS body, skipping the leading
/// channel title.
fn extract_titles(body: &str) -> Vec<String> {
    let re = match regex::Regex::new(r"<title><!\[CDATA\[(.*?)\]\]></title>") {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.captures_iter(body)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .skip(1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_titles_skips_channel_title() {
        let body = r#"<rss><channel>
            <title><![CDATA[Top stories - Google News]]></title>
            <item><title><![CDATA[First headline]]></title></item>
            <item><title><![CDATA[Second headline]]></title></item>
        </channel></rss>"#;
        let titles = extract_titles(body);
        assert_eq!(titles, vec!["First headline", "Second headline"]);
    }

    #[test]
    fn extract_titles_empty_feed() {
        assert!(extract_titles("<rss></rss>").is_empty());
    }

    #[test]
    fn topic_codes_cover_categories() {
        assert_eq!(topic_code("economy"), Some("BUSINESS"));
        assert_eq!(topic_code("tech"), Some("TECHNOLOGY"));
        assert_eq!(topic_code("all"), None);
    }

    #[test]
    fn locale_params_default_to_english() {
        assert_eq!(locale_params("KR"), ("ko", "KR", "KR:ko"));
        assert_eq!(locale_params("DE"), ("en-US", "US", "US:en"));
    }
}
