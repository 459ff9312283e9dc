//! Trend scoring engine: keyword extraction from video titles and news
//! headlines, frequency- and engagement-weighted ranking, volatility and
//! seasonality estimation, and the Go/Wait/Seasonal recommendation table.
//!
//! Every scoring function operates on plain records, so it behaves
//! identically whether the input came from the YouTube API, an RSS feed, or
//! the synthetic generator. The shape is the contract, not the source.

pub mod cache;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::generate::phrases;
use crate::generate::random::RandomSource;

/// One point of a 0-100 interest series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedQuery {
    pub query: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RisingQuery {
    pub query: String,
    pub growth: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Go,
    Wait,
    Seasonal,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Go => "Go",
            Recommendation::Wait => "Wait",
            Recommendation::Seasonal => "Seasonal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seasonality {
    Low,
    Medium,
    High,
}

impl Seasonality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seasonality::Low => "low",
            Seasonality::Medium => "medium",
            Seasonality::High => "high",
        }
    }
}

/// A video row from the YouTube connector or the synthetic generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub title: String,
    pub channel_title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub published_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Full analysis for one keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub keyword: String,
    pub volume_index: Vec<VolumePoint>,
    pub related_queries_top: Vec<RelatedQuery>,
    pub related_queries_rising: Vec<RisingQuery>,
    /// Coefficient of variation of the volume index, in percent.
    pub volatility: f64,
    pub avg_volume: f64,
    pub recent_volume: f64,
    pub seasonality: Seasonality,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    /// "youtube" for live data, "synthetic" for the fallback generator.
    pub source: String,
    pub total_videos: usize,
    pub top_videos: Vec<VideoRecord>,
}

/// Aggregated engagement stats for one keyword candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeywordStats {
    pub count: u32,
    pub total_views: u64,
    pub total_likes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// One ranked keyword. Ephemeral: produced per request, cached at most.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRank {
    pub keyword: String,
    pub rank: usize,
    pub count: u32,
    pub avg_views: u64,
    pub total_views: u64,
    pub score: f64,
    pub trend: TrendDirection,
}

/// Stopwords filtered from video titles.
pub const VIDEO_STOPWORDS: &[&str] = &[
    "영상", "동영상", "이번", "오늘", "어제", "내일", "처음", "마지막", "그리고", "하지만",
    "그래서", "있는", "없는", "하는", "되는", "좋은", "나쁜", "the", "a", "an", "and", "or",
    "but", "in", "on", "at",
];

/// Stopwords filtered from news headlines.
pub const NEWS_STOPWORDS: &[&str] = &[
    "기자", "뉴스", "속보", "발표", "관련", "대한", "통해", "가능", "위해", "의원", "장관",
    "대통령", "시장",
];

/// Split a title into candidate keywords: Unicode alphanumerics only,
/// lowercased, tokens of length > 1 that are not stopwords, plus every
/// adjacent two-token phrase. Both the video and headline paths lowercase;
/// bigrams count separately from their unigrams.
pub fn tokenize_title(title: &str, stopwords: &HashSet<&str>) -> Vec<String> {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let words: Vec<String> = cleaned
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 1 && !stopwords.contains(w))
        .map(|w| w.to_string())
        .collect();

    let mut tokens = words.clone();
    for pair in words.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens
}

/// Keyword frequency across a batch of titles (headline path).
pub fn extract_keywords(titles: &[String], stopwords: &HashSet<&str>) -> Vec<(String, u32)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();
    for title in titles {
        for token in tokenize_title(title, stopwords) {
            let entry = counts.entry(token.clone()).or_insert_with(|| {
                order.push(token);
                0
            });
            *entry += 1;
        }
    }
    order
        .into_iter()
        .map(|kw| {
            let count = counts[&kw];
            (kw, count)
        })
        .collect()
}

/// Keyword stats accumulated across a batch of videos, weighted by views and
/// likes. Returned in first-seen order so ranking ties stay stable.
pub fn accumulate_video_stats(videos: &[VideoRecord]) -> Vec<(String, KeywordStats)> {
    let stopwords: HashSet<&str> = VIDEO_STOPWORDS.iter().copied().collect();
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, KeywordStats> = HashMap::new();

    for video in videos {
        for token in tokenize_title(&video.title, &stopwords) {
            let entry = stats.entry(token.clone()).or_insert_with(|| {
                order.push(token);
                KeywordStats::default()
            });
            entry.count += 1;
            entry.total_views += video.view_count;
            entry.total_likes += video.like_count;
        }
    }

    order
        .into_iter()
        .map(|kw| {
            let s = stats[&kw];
            (kw, s)
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Rank keyword candidates: score = count*2 + views/1M + likes/10K, stable
/// sort by descending score, top 20, dense 1-based ranks.
pub fn rank_keywords(entries: Vec<(String, KeywordStats)>) -> Vec<KeywordRank> {
    let mut ranked: Vec<KeywordRank> = entries
        .into_iter()
        .map(|(keyword, s)| {
            let score = round2(
                s.count as f64 * 2.0
                    + s.total_views as f64 / 1_000_000.0
                    + s.total_likes as f64 / 10_000.0,
            );
            KeywordRank {
                keyword,
                rank: 0,
                count: s.count,
                avg_views: if s.count > 0 {
                    ((s.total_views as f64) / (s.count as f64)).round() as u64
                } else {
                    0
                },
                total_views: s.total_views,
                score,
                trend: TrendDirection::Up,
            }
        })
        .collect();

    // sort_by is stable: equal scores keep first-seen order
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(20);
    for (i, kw) in ranked.iter_mut().enumerate() {
        kw.rank = i + 1;
    }
    ranked
}

/// Rank headline keywords by raw frequency (score = count * 10).
pub fn rank_headline_keywords(titles: &[String]) -> Vec<KeywordRank> {
    let stopwords: HashSet<&str> = NEWS_STOPWORDS.iter().copied().collect();
    let mut ranked: Vec<KeywordRank> = extract_keywords(titles, &stopwords)
        .into_iter()
        .map(|(keyword, count)| KeywordRank {
            keyword,
            rank: 0,
            count,
            avg_views: 0,
            total_views: 0,
            score: count as f64 * 10.0,
            trend: TrendDirection::Up,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(20);
    for (i, kw) in ranked.iter_mut().enumerate() {
        kw.rank = i + 1;
    }
    ranked
}

/// Population standard deviation over mean, as a percentage. Zero for an
/// empty series or a zero mean (no division by zero).
pub fn volatility(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / mean * 100.0
}

/// Go/Wait/Seasonal decision table, evaluated strictly in order. Volatility
/// is on the index-unit scale (coefficient of variation %), so the Seasonal
/// threshold is 30. The `recent == avg * 0.7` boundary is NOT a decline:
/// the comparison is strict, so it falls through to the stable branch.
pub fn recommend(avg_volume: f64, recent_volume: f64, volatility_pct: f64) -> (Recommendation, &'static str) {
    if volatility_pct > 30.0 {
        (Recommendation::Seasonal, "high volatility - consider timing")
    } else if recent_volume < avg_volume * 0.7 {
        (Recommendation::Wait, "recent interest declining")
    } else if recent_volume > avg_volume * 1.3 {
        (Recommendation::Go, "interest rising - start now")
    } else {
        (Recommendation::Go, "strong and stable interest")
    }
}

/// Seasonality bucket from index-scale volatility.
pub fn seasonality_for(volatility_pct: f64) -> Seasonality {
    if volatility_pct > 25.0 {
        Seasonality::High
    } else if volatility_pct > 15.0 {
        Seasonality::Medium
    } else {
        Seasonality::Low
    }
}

/// 30-day synthetic interest series: base 50-80, linear drift, per-point
/// noise, clamped to [0, 100].
pub fn synthetic_series(days: usize, rng: &mut dyn RandomSource) -> Vec<VolumePoint> {
    let base = 50.0 + rng.unit() * 30.0;
    let slope = (rng.unit() - 0.5) * 2.0;
    let today = chrono::Utc::now().date_naive();

    (0..days)
        .map(|i| {
            let noise = (rng.unit() - 0.5) * 20.0;
            let value = (base + slope * i as f64 + noise).clamp(0.0, 100.0).round();
            let date = today - chrono::Duration::days((days - i) as i64);
            VolumePoint {
                date: date.format("%Y-%m-%d").to_string(),
                value,
            }
        })
        .collect()
}

/// Five synthetic "top" related queries with fixed per-position value ranges.
pub fn synthetic_related_top(keyword: &str, rng: &mut dyn RandomSource) -> Vec<RelatedQuery> {
    let entries = [
        (format!("{keyword} tutorial"), 70.0, 100.0),
        (format!("best {keyword}"), 60.0, 90.0),
        (format!("{keyword} guide"), 50.0, 80.0),
        (format!("how to use {keyword}"), 40.0, 70.0),
        (format!("{keyword} tips"), 30.0, 60.0),
    ];
    entries
        .into_iter()
        .map(|(query, lo, hi)| RelatedQuery {
            query,
            value: rng.range(lo, hi).round(),
        })
        .collect()
}

/// Five synthetic "rising" related queries with fixed per-position growth
/// ranges.
pub fn synthetic_related_rising(keyword: &str, rng: &mut dyn RandomSource) -> Vec<RisingQuery> {
    let suffix = rng.pick(phrases::RISING_SUFFIXES);
    let prefix = rng.pick(phrases::RISING_PREFIXES);
    let related = rng.pick(phrases::RISING_RELATED);

    let entries = [
        (format!("{keyword} {suffix}"), 100.0, 500.0),
        (format!("{prefix} {keyword}"), 100.0, 400.0),
        (format!("{keyword} {related}"), 80.0, 280.0),
        (format!("{keyword} vs"), 60.0, 210.0),
        (format!("free {keyword}"), 50.0, 150.0),
    ];
    entries
        .into_iter()
        .map(|(query, lo, hi)| RisingQuery {
            query,
            growth: format!("+{}%", rng.range(lo, hi).round()),
        })
        .collect()
}

/// Full synthetic trend analysis, used when no live source is configured or
/// a live call fails. Tagged source = "synthetic".
pub fn synthetic_trend(keyword: &str, rng: &mut dyn RandomSource) -> TrendResult {
    let series = synthetic_series(30, rng);
    build_result(
        keyword,
        series,
        synthetic_related_top(keyword, rng),
        synthetic_related_rising(keyword, rng),
        "synthetic",
        0,
        Vec::new(),
    )
}

/// Analysis over live video records: engagement averages drive the volume
/// index, video tags drive the related queries.
pub fn analyze_videos(
    keyword: &str,
    videos: &[VideoRecord],
    rng: &mut dyn RandomSource,
) -> TrendResult {
    let series = video_volume_index(videos, rng);

    // Top related queries come from the most frequent video tags.
    let mut tag_order: Vec<String> = Vec::new();
    let mut tag_counts: HashMap<String, u32> = HashMap::new();
    for video in videos {
        for tag in &video.tags {
            let entry = tag_counts.entry(tag.clone()).or_insert_with(|| {
                tag_order.push(tag.clone());
                0
            });
            *entry += 1;
        }
    }
    let mut top_tags: Vec<RelatedQuery> = tag_order
        .into_iter()
        .map(|tag| {
            let count = tag_counts[&tag];
            RelatedQuery {
                query: tag,
                value: count as f64,
            }
        })
        .collect();
    top_tags.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    top_tags.truncate(10);

    let mut top_videos: Vec<VideoRecord> = videos.to_vec();
    top_videos.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    top_videos.truncate(5);

    let mut result = build_result(
        keyword,
        series,
        top_tags,
        Vec::new(), // rising queries are not derivable from the video API
        "youtube",
        videos.len(),
        top_videos,
    );

    // Recent-vs-average on raw engagement: newest ten videos against the
    // whole batch. Scale-invariant, so the same decision table applies.
    if !videos.is_empty() {
        let avg_views =
            videos.iter().map(|v| v.view_count).sum::<u64>() as f64 / videos.len() as f64;
        let mut by_date: Vec<&VideoRecord> = videos.iter().collect();
        by_date.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        let recent: Vec<&VideoRecord> = by_date.into_iter().take(10).collect();
        let recent_views =
            recent.iter().map(|v| v.view_count).sum::<u64>() as f64 / recent.len() as f64;

        result.avg_volume = avg_views.round();
        result.recent_volume = recent_views.round();
        let (rec, reason) = recommend(avg_views, recent_views, result.volatility);
        result.recommendation = rec;
        result.recommendation_reason = reason.to_string();
    }

    result
}

/// Project a video batch's average engagement onto a 0-100 index series so
/// volatility and seasonality read in one consistent unit.
fn video_volume_index(videos: &[VideoRecord], rng: &mut dyn RandomSource) -> Vec<VolumePoint> {
    if videos.is_empty() {
        return Vec::new();
    }
    let avg_views = videos.iter().map(|v| v.view_count).sum::<u64>() as f64 / videos.len() as f64;
    let base = (avg_views / 10_000.0).clamp(1.0, 100.0);
    let today = chrono::Utc::now().date_naive();

    (0..30)
        .map(|i| {
            let noise = (rng.unit() - 0.5) * base * 0.2;
            let date = today - chrono::Duration::days((30 - i) as i64);
            VolumePoint {
                date: date.format("%Y-%m-%d").to_string(),
                value: (base + noise).clamp(0.0, 100.0).round(),
            }
        })
        .collect()
}

fn build_result(
    keyword: &str,
    series: Vec<VolumePoint>,
    related_top: Vec<RelatedQuery>,
    related_rising: Vec<RisingQuery>,
    source: &str,
    total_videos: usize,
    top_videos: Vec<VideoRecord>,
) -> TrendResult {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let avg = if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    };
    let recent_window = &values[values.len().saturating_sub(7)..];
    let recent = if recent_window.is_empty() {
        0.0
    } else {
        recent_window.iter().sum::<f64>() / recent_window.len() as f64
    };
    let vol = round2(volatility(&values));
    let (recommendation, reason) = recommend(avg, recent, vol);

    TrendResult {
        keyword: keyword.to_string(),
        volume_index: series,
        related_queries_top: related_top,
        related_queries_rising: related_rising,
        volatility: vol,
        avg_volume: avg.round(),
        recent_volume: recent.round(),
        seasonality: seasonality_for(vol),
        recommendation,
        recommendation_reason: reason.to_string(),
        source: source.to_string(),
        total_videos,
        top_videos,
    }
}

/// Synthetic trending videos for the dashboard when no live source is
/// available.
pub fn synthetic_trending_videos(category: &str, rng: &mut dyn RandomSource) -> Vec<VideoRecord> {
    let base_titles: &[&str] = match category {
        "politics" => &[
            "Election debate highlights",
            "New policy announcement explained",
            "Parliament session key takeaways",
            "Local election results breakdown",
        ],
        "economy" => &[
            "Stock market outlook analysis",
            "Housing policy changes summarized",
            "Interest rate hike explained",
            "Economic indicators recap",
        ],
        "culture" => &[
            "Drama best scenes compilation",
            "K-POP comeback stage fancam",
            "Movie trailer reaction",
            "Variety show best cuts",
        ],
        "tech" => &[
            "Latest smartphone review",
            "AI trends to watch",
            "New game playthrough",
            "Semiconductor industry analysis",
        ],
        _ => &[
            "Today's top 10 hot issues",
            "Number one trending search",
            "Viral video compilation",
            "Latest trends recap",
        ],
    };

    (0..20)
        .map(|i| {
            let days_ago = rng.unit() * 7.0;
            let published = chrono::Utc::now() - chrono::Duration::hours((days_ago * 24.0) as i64);
            VideoRecord {
                title: format!("{} #{}", base_titles[i % base_titles.len()], i + 1),
                channel_title: format!("Channel {}", (b'A' + (i % 10) as u8) as char),
                view_count: (rng.range(100_000.0, 1_100_000.0)) as u64,
                like_count: (rng.range(5_000.0, 55_000.0)) as u64,
                published_at: published.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                tags: Vec::new(),
            }
        })
        .collect()
}

/// Outcome of a `trend` lookup.
pub struct TrendReport {
    pub result: TrendResult,
    pub cached: bool,
    /// True when a configured live source failed and synthetic data was
    /// substituted.
    pub fallback: bool,
}

/// Full trend lookup: cache first, then the YouTube API if a key is
/// configured, then the synthetic generator. Results are cached under
/// (keyword, locale, range); `refresh` skips the cache read but still
/// overwrites the entry.
pub fn run_trend_query(
    db: &crate::db::Database,
    config: &crate::config::VidplanConfig,
    keyword: &str,
    locale: &str,
    range: &str,
    refresh: bool,
    rng: &mut dyn RandomSource,
    clock: &dyn cache::Clock,
) -> anyhow::Result<TrendReport> {
    use anyhow::bail;
    use tracing::warn;

    let keyword = keyword.trim();
    if keyword.is_empty() {
        bail!("Keyword must not be empty");
    }
    let days = parse_range_days(range)?;

    let trend_cache = cache::TrendCache::new(db, clock);
    if !refresh {
        if let Some(row) = trend_cache.get(keyword, locale, range)? {
            return Ok(TrendReport {
                result: row.result,
                cached: true,
                fallback: false,
            });
        }
    }

    let mut fallback = false;
    let result = match crate::config::resolve_credential(
        None,
        "YOUTUBE_API_KEY",
        config.youtube.as_ref(),
    ) {
        Ok(api_key) => {
            let client =
                crate::sources::youtube::YouTubeClient::new(api_key, config.youtube.as_ref());
            match client.search_videos(keyword, locale, days) {
                Ok(videos) if !videos.is_empty() => analyze_videos(keyword, &videos, rng),
                Ok(_) => {
                    warn!(keyword, "no videos found; using synthetic trend data");
                    fallback = true;
                    synthetic_trend(keyword, rng)
                }
                Err(e) => {
                    warn!("YouTube lookup failed ({e}); using synthetic trend data");
                    fallback = true;
                    synthetic_trend(keyword, rng)
                }
            }
        }
        Err(e) => {
            // No key configured: quiet synthetic mode.
            tracing::debug!("no YouTube credential ({e}); using synthetic trend data");
            synthetic_trend(keyword, rng)
        }
    };

    trend_cache.put(keyword, locale, range, &result)?;
    Ok(TrendReport {
        result,
        cached: false,
        fallback,
    })
}

/// Outcome of a `trending` lookup.
pub struct TrendingReport {
    pub ranks: Vec<KeywordRank>,
    /// "youtube", "news", or "synthetic" when a live source was unavailable.
    pub source: String,
    /// True when a configured live source failed and synthetic data was
    /// substituted.
    pub fallback: bool,
}

/// Trending keyword dashboard: rank keywords out of trending videos or news
/// headlines. Any source failure degrades to synthetic data, tagged as such
/// in the report.
pub fn run_trending(
    config: &crate::config::VidplanConfig,
    category: Option<&str>,
    source: &str,
    locale: &str,
    rng: &mut dyn RandomSource,
) -> anyhow::Result<TrendingReport> {
    use anyhow::bail;
    use tracing::warn;

    match source {
        "news" => {
            let client = crate::sources::news::NewsClient::new(config.news.as_ref());
            match client.headlines(category, locale) {
                Ok(headlines) if !headlines.is_empty() => Ok(TrendingReport {
                    ranks: rank_headline_keywords(&headlines),
                    source: "news".to_string(),
                    fallback: false,
                }),
                Ok(_) => {
                    warn!("no headlines returned; using synthetic data");
                    Ok(synthetic_headline_report(category, rng))
                }
                Err(e) => {
                    warn!("news fetch failed ({e}); using synthetic data");
                    Ok(synthetic_headline_report(category, rng))
                }
            }
        }
        "youtube" => {
            let mut fallback = false;
            let videos = match crate::config::resolve_credential(
                None,
                "YOUTUBE_API_KEY",
                config.youtube.as_ref(),
            ) {
                Ok(api_key) => {
                    let client = crate::sources::youtube::YouTubeClient::new(
                        api_key,
                        config.youtube.as_ref(),
                    );
                    match client.trending_videos(category, locale) {
                        Ok(videos) if !videos.is_empty() => Some(videos),
                        Ok(_) => {
                            warn!("no trending videos returned; using synthetic data");
                            fallback = true;
                            None
                        }
                        Err(e) => {
                            warn!("YouTube trending failed ({e}); using synthetic data");
                            fallback = true;
                            None
                        }
                    }
                }
                Err(e) => {
                    // No key configured: quiet synthetic mode.
                    tracing::debug!("no YouTube credential ({e}); using synthetic data");
                    None
                }
            };
            let (videos, label) = match videos {
                Some(v) => (v, "youtube"),
                None => (
                    synthetic_trending_videos(category.unwrap_or("all"), rng),
                    "synthetic",
                ),
            };
            Ok(TrendingReport {
                ranks: rank_keywords(accumulate_video_stats(&videos)),
                source: label.to_string(),
                fallback,
            })
        }
        _ => bail!("Unknown trend source: {}. Supported: youtube, news", source),
    }
}

/// Headline-style ranks from synthetic video titles, used when the news
/// feed is unreachable or empty.
fn synthetic_headline_report(
    category: Option<&str>,
    rng: &mut dyn RandomSource,
) -> TrendingReport {
    let titles: Vec<String> = synthetic_trending_videos(category.unwrap_or("all"), rng)
        .into_iter()
        .map(|v| v.title)
        .collect();
    TrendingReport {
        ranks: rank_headline_keywords(&titles),
        source: "synthetic".to_string(),
        fallback: true,
    }
}

/// Parse a range like "7d" or "30d" into days.
fn parse_range_days(range: &str) -> anyhow::Result<i64> {
    let digits = range.trim_end_matches('d');
    match digits.parse::<i64>() {
        Ok(days) if days > 0 => Ok(days),
        _ => anyhow::bail!("Invalid range: {}. Use a day count like 7d or 30d", range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::random::SeededRandom;

    fn stops(words: &[&'static str]) -> HashSet<&'static str> {
        words.iter().copied().collect()
    }

    #[test]
    fn tokenize_strips_punctuation_and_stopwords() {
        let stopwords = stops(&["the", "and"]);
        let tokens = tokenize_title("The Quick, Brown Fox!", &stopwords);
        assert!(tokens.contains(&"quick".to_string()));
        assert!(tokens.contains(&"brown".to_string()));
        assert!(tokens.contains(&"fox".to_string()));
        assert!(!tokens.iter().any(|t| t == "the"));
    }

    #[test]
    fn tokenize_emits_bigrams() {
        let stopwords = stops(&[]);
        let tokens = tokenize_title("rust async runtime", &stopwords);
        assert!(tokens.contains(&"rust async".to_string()));
        assert!(tokens.contains(&"async runtime".to_string()));
        // unigrams and bigrams both present
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn tokenize_keeps_hangul() {
        let stopwords = stops(&[]);
        let tokens = tokenize_title("고양이 영상 모음", &stopwords);
        assert!(tokens.contains(&"고양이".to_string()));
        assert!(tokens.contains(&"고양이 영상".to_string()));
    }

    #[test]
    fn tokenize_drops_single_char_tokens() {
        let stopwords = stops(&[]);
        let tokens = tokenize_title("a big thing", &stopwords);
        assert!(!tokens.iter().any(|t| t == "a"));
        assert!(tokens.contains(&"big".to_string()));
    }

    #[test]
    fn rank_keywords_sorted_dense_and_truncated() {
        let entries: Vec<(String, KeywordStats)> = (0..30)
            .map(|i| {
                (
                    format!("kw{i}"),
                    KeywordStats {
                        count: (30 - i) as u32,
                        total_views: 1_000_000 * (30 - i) as u64,
                        total_likes: 10_000,
                    },
                )
            })
            .collect();

        let ranked = rank_keywords(entries);
        assert_eq!(ranked.len(), 20);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        let ranks: Vec<usize> = ranked.iter().map(|k| k.rank).collect();
        assert_eq!(ranks, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn rank_keywords_score_formula() {
        let entries = vec![(
            "ai".to_string(),
            KeywordStats {
                count: 3,
                total_views: 2_500_000,
                total_likes: 45_000,
            },
        )];
        let ranked = rank_keywords(entries);
        // 3*2 + 2.5 + 4.5 = 13.0
        assert_eq!(ranked[0].score, 13.0);
        assert_eq!(ranked[0].avg_views, 833_333);
    }

    #[test]
    fn rank_keywords_ties_keep_first_seen_order() {
        let same = KeywordStats {
            count: 2,
            total_views: 0,
            total_likes: 0,
        };
        let entries = vec![
            ("first".to_string(), same),
            ("second".to_string(), same),
            ("third".to_string(), same),
        ];
        let ranked = rank_keywords(entries);
        let order: Vec<&str> = ranked.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn volatility_of_constant_series_is_zero() {
        assert_eq!(volatility(&[42.0, 42.0, 42.0]), 0.0);
    }

    #[test]
    fn volatility_guards_zero_mean_and_empty() {
        assert_eq!(volatility(&[]), 0.0);
        assert_eq!(volatility(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn volatility_is_cv_percent() {
        // mean 50, population stddev 10 -> 20%
        let v = volatility(&[40.0, 60.0, 40.0, 60.0]);
        assert!((v - 20.0).abs() < 1e-9);
    }

    #[test]
    fn recommend_decision_table() {
        assert_eq!(recommend(50.0, 50.0, 31.0).0, Recommendation::Seasonal);
        assert_eq!(recommend(50.0, 30.0, 10.0).0, Recommendation::Wait);
        assert_eq!(recommend(50.0, 70.0, 10.0).0, Recommendation::Go);
        let (rec, reason) = recommend(50.0, 50.0, 10.0);
        assert_eq!(rec, Recommendation::Go);
        assert_eq!(reason, "strong and stable interest");
    }

    #[test]
    fn recommend_boundary_resolves_to_stable_branch() {
        // recent == avg * 0.7 exactly: strict comparison, not a decline
        let (rec, reason) = recommend(100.0, 70.0, 0.0);
        assert_eq!(rec, Recommendation::Go);
        assert_eq!(reason, "strong and stable interest");
        // volatility priority beats the rising branch
        assert_eq!(recommend(100.0, 200.0, 31.0).0, Recommendation::Seasonal);
    }

    #[test]
    fn recommend_is_pure() {
        for _ in 0..3 {
            assert_eq!(
                recommend(80.0, 90.0, 12.5),
                recommend(80.0, 90.0, 12.5)
            );
        }
    }

    #[test]
    fn synthetic_series_is_clamped_and_dated() {
        let mut rng = SeededRandom::new(21);
        let series = synthetic_series(30, &mut rng);
        assert_eq!(series.len(), 30);
        for point in &series {
            assert!(point.value >= 0.0 && point.value <= 100.0);
            assert_eq!(point.date.len(), 10);
        }
        // dates ascend
        for pair in series.windows(2) {
            assert!(pair[1].date > pair[0].date);
        }
    }

    #[test]
    fn synthetic_related_batches_of_five() {
        let mut rng = SeededRandom::new(22);
        let top = synthetic_related_top("ai", &mut rng);
        assert_eq!(top.len(), 5);
        assert!(top.iter().all(|q| q.query.contains("ai")));
        assert!(top.iter().all(|q| (30.0..=100.0).contains(&q.value)));

        let rising = synthetic_related_rising("ai", &mut rng);
        assert_eq!(rising.len(), 5);
        assert!(rising.iter().all(|q| q.growth.starts_with('+')));
        assert!(rising.iter().all(|q| q.growth.ends_with('%')));
    }

    #[test]
    fn synthetic_trend_is_tagged_and_consistent() {
        let mut rng = SeededRandom::new(23);
        let result = synthetic_trend("ai tools", &mut rng);
        assert_eq!(result.source, "synthetic");
        assert_eq!(result.keyword, "ai tools");
        assert_eq!(result.volume_index.len(), 30);
        let values: Vec<f64> = result.volume_index.iter().map(|p| p.value).collect();
        assert_eq!(result.volatility, round2(volatility(&values)));
        assert!(!result.recommendation_reason.is_empty());
    }

    #[test]
    fn analyze_videos_uses_engagement_and_tags() {
        let mut rng = SeededRandom::new(24);
        let videos: Vec<VideoRecord> = (0..20)
            .map(|i| VideoRecord {
                title: format!("rust tutorial part {i}"),
                channel_title: "chan".into(),
                view_count: 500_000,
                like_count: 10_000,
                published_at: format!("2026-08-{:02}T00:00:00Z", i + 1),
                tags: vec!["rust".into(), "programming".into()],
            })
            .collect();

        let result = analyze_videos("rust", &videos, &mut rng);
        assert_eq!(result.source, "youtube");
        assert_eq!(result.total_videos, 20);
        assert_eq!(result.avg_volume, 500_000.0);
        assert_eq!(result.recent_volume, 500_000.0);
        assert_eq!(result.top_videos.len(), 5);
        assert!(result
            .related_queries_top
            .iter()
            .any(|q| q.query == "rust" && q.value == 20.0));
    }

    #[test]
    fn headline_ranking_scores_by_frequency() {
        let titles = vec![
            "ChatGPT update changes everything".to_string(),
            "ChatGPT rivals respond".to_string(),
            "Markets rally on tech news".to_string(),
        ];
        let ranked = rank_headline_keywords(&titles);
        let top = &ranked[0];
        assert_eq!(top.keyword, "chatgpt");
        assert_eq!(top.count, 2);
        assert_eq!(top.score, 20.0);
        assert_eq!(top.rank, 1);
    }

    #[test]
    fn parse_range_accepts_day_counts() {
        assert_eq!(parse_range_days("7d").unwrap(), 7);
        assert_eq!(parse_range_days("30d").unwrap(), 30);
        assert!(parse_range_days("month").is_err());
        assert!(parse_range_days("0d").is_err());
    }

    #[test]
    fn run_trend_query_caches_and_replays() {
        let dir = tempfile::tempdir().unwrap();
        let db = crate::db::Database::open(&dir.path().join("trend.db")).unwrap();
        let config = crate::config::VidplanConfig::default();
        let clock = cache::SystemClock;
        let mut rng = SeededRandom::new(31);

        let first =
            run_trend_query(&db, &config, "ai tools", "KR", "30d", false, &mut rng, &clock)
                .unwrap();
        assert!(!first.cached);

        let second =
            run_trend_query(&db, &config, "ai tools", "KR", "30d", false, &mut rng, &clock)
                .unwrap();
        assert!(second.cached);
        assert_eq!(second.result.avg_volume, first.result.avg_volume);
        assert_eq!(second.result.volume_index, first.result.volume_index);
    }

    #[test]
    fn run_trend_query_rejects_blank_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let db = crate::db::Database::open(&dir.path().join("trend.db")).unwrap();
        let config = crate::config::VidplanConfig::default();
        let mut rng = SeededRandom::new(32);
        assert!(run_trend_query(
            &db,
            &config,
            "  ",
            "KR",
            "30d",
            false,
            &mut rng,
            &cache::SystemClock
        )
        .is_err());
    }

    #[test]
    fn news_failure_falls_back_to_synthetic_ranks() {
        // Point the feed at a closed local port so the fetch fails fast.
        let config = crate::config::VidplanConfig {
            news: Some(crate::config::SourceConfig {
                api_key: None,
                api_key_command: None,
                base_url: Some("http://127.0.0.1:1".to_string()),
            }),
            ..Default::default()
        };
        let mut rng = SeededRandom::new(33);

        let report = run_trending(&config, Some("tech"), "news", "KR", &mut rng).unwrap();
        assert!(report.fallback);
        assert_eq!(report.source, "synthetic");
        assert!(!report.ranks.is_empty());
        assert_eq!(report.ranks[0].rank, 1);
    }

    #[test]
    fn trending_rejects_unknown_source() {
        let config = crate::config::VidplanConfig::default();
        let mut rng = SeededRandom::new(34);
        assert!(run_trending(&config, None, "twitter", "KR", &mut rng).is_err());
    }

    #[test]
    fn synthetic_trending_videos_batch_of_twenty() {
        let mut rng = SeededRandom::new(25);
        let videos = synthetic_trending_videos("tech", &mut rng);
        assert_eq!(videos.len(), 20);
        assert!(videos.iter().all(|v| v.view_count >= 100_000));
        assert!(videos.iter().all(|v| !v.title.is_empty()));
    }
}
