use unicode_width::UnicodeWidthStr;

use crate::db::models::*;
use crate::trends::{KeywordRank, TrendResult, VideoRecord};

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

fn format_timestamp(seconds: f64) -> String {
    let total = seconds as u64;
    let m = total / 60;
    let s = total % 60;
    format!("{m:02}:{s:02}")
}

fn format_views(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K", views as f64 / 1_000.0)
    } else {
        format!("{views}")
    }
}

/// Format project list as a table.
pub fn print_project_list(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }

    println!(
        "{} project{}:\n",
        projects.len(),
        if projects.len() == 1 { "" } else { "s" }
    );

    println!(
        "  {:<42} {:<12} {:<10} {:<12}",
        "TOPIC", "STATUS", "LENGTH", "UPDATED"
    );
    println!("  {}", "-".repeat(80));

    for p in projects {
        let updated_short = p.updated_at.get(..10).unwrap_or(&p.updated_at);
        println!(
            "  {:<42} {:<12} {:<10} {:<12}",
            truncate(&p.topic, 40),
            p.status.as_str(),
            p.length.as_str(),
            updated_short,
        );
        println!("  id: {}\n", p.id);
    }
}

/// Full project detail for `vidplan show`.
pub fn print_project_detail(
    project: &Project,
    script: Option<&Script>,
    angles: &[Angle],
    ctas: &[Cta],
    seo: Option<&SeoMeta>,
    hints: Option<&AssetHints>,
    shorts: &[Short],
    products: &[Product],
) {
    println!("Project: {}", project.topic);
    println!("  ID:       {}", project.id);
    println!("  Audience: {}", project.audience);
    println!("  Tone:     {}", project.tone.as_str());
    println!("  Length:   {}", project.length.as_str());
    println!("  Status:   {}", project.status.as_str());
    println!("  Created:  {}", project.created_at);
    println!("  Updated:  {}", project.updated_at);

    if let Some(s) = script {
        println!(
            "\nScript (v{}, {} words, {} steps):",
            s.version,
            s.word_count,
            s.body.len()
        );
        println!("  Opening: {}", truncate(&s.opening, 72));
        for step in &s.body {
            println!("  [{}] {}", format_timestamp(step.t), truncate(&step.line, 66));
        }
        println!("  Ending:  {}", truncate(&s.ending, 72));
    } else {
        println!("\nScript: (none)");
    }

    if !angles.is_empty() {
        println!("\nAngles ({}):", angles.len());
        for a in angles {
            println!("  [{}] {}", a.persona, truncate(&a.angle_title, 60));
            println!("      hook: {}", truncate(&a.hook, 66));
            println!("      thumbnail: {}", truncate(&a.thumbnail_copy, 62));
        }
    }

    if !ctas.is_empty() {
        println!("\nCTAs ({}):", ctas.len());
        for c in ctas {
            println!(
                "  {:<8} {} [{}]",
                c.timing.as_str(),
                truncate(&c.text, 56),
                c.on_screen_text
            );
        }
    }

    if let Some(seo) = seo {
        println!("\nSEO:");
        println!("  Title A:  {}", truncate(&seo.title_a, 68));
        println!("  Title B:  {}", truncate(&seo.title_b, 68));
        println!("  Hashtags: {}", seo.hashtags.join(" "));
        println!("  Chapters:");
        for ch in &seo.chapters {
            println!("    [{}] {}", format_timestamp(ch.t), ch.label);
        }
    }

    if let Some(hints) = hints {
        println!("\nAsset hints:");
        println!("  B-roll:   {}", truncate(&hints.broll_keywords.join(", "), 68));
        println!("  Subtitle cues:");
        for cue in &hints.subtitle_cues {
            println!(
                "    [{}] {} ({})",
                format_timestamp(cue.t),
                cue.cue_type,
                cue.emphasis
            );
        }
    }

    if !shorts.is_empty() {
        println!("\nShorts ({}):", shorts.len());
        for sh in shorts {
            println!("  {}s  {}", sh.duration_sec, truncate(&sh.hook, 64));
        }
    }

    if !products.is_empty() {
        println!("\nProducts ({}):", products.len());
        for pr in products {
            println!("  {} -> {}", truncate(&pr.name, 40), truncate(&pr.url, 50));
        }
    }
}

/// Shorts detail for `vidplan shorts`.
pub fn print_shorts(shorts: &[Short]) {
    if shorts.is_empty() {
        println!("No shorts generated.");
        return;
    }

    println!(
        "{} short{}:\n",
        shorts.len(),
        if shorts.len() == 1 { "" } else { "s" }
    );

    for sh in shorts {
        println!("  {}s short (id: {})", sh.duration_sec, sh.id);
        println!("  Hook: {}", truncate(&sh.hook, 70));
        for cap in &sh.captions {
            println!("    [{}] {}", format_timestamp(cap.t), truncate(&cap.text, 64));
        }
        println!("  Overlays: {}\n", sh.overlay_texts.join(" / "));
    }
}

/// Trend analysis summary for `vidplan trend`.
pub fn print_trend_result(result: &TrendResult, cached: bool) {
    println!("Trend: {}", result.keyword);
    println!(
        "  Source:         {}{}",
        result.source,
        if cached { " (cached)" } else { "" }
    );
    println!("  Avg volume:     {}", result.avg_volume);
    println!("  Recent volume:  {}", result.recent_volume);
    println!("  Volatility:     {:.2}%", result.volatility);
    println!("  Seasonality:    {}", result.seasonality.as_str());
    println!(
        "  Recommendation: {} ({})",
        result.recommendation.as_str(),
        result.recommendation_reason
    );

    if !result.related_queries_top.is_empty() {
        println!("\n  Top related queries:");
        for q in &result.related_queries_top {
            println!("    {:<40} {}", truncate(&q.query, 38), q.value);
        }
    }

    if !result.related_queries_rising.is_empty() {
        println!("\n  Rising queries:");
        for q in &result.related_queries_rising {
            println!("    {:<40} {}", truncate(&q.query, 38), q.growth);
        }
    }

    if !result.top_videos.is_empty() {
        println!("\n  Top videos:");
        print_video_rows(&result.top_videos);
    }
}

/// Keyword ranking table for `vidplan trending`.
pub fn print_keyword_ranks(ranks: &[KeywordRank], category: &str, source: &str) {
    if ranks.is_empty() {
        println!("No trending keywords found.");
        return;
    }

    println!("Trending keywords ({category}, {source}):\n");
    println!(
        "  {:<4} {:<32} {:>6} {:>10} {:>8}",
        "#", "KEYWORD", "COUNT", "AVG VIEWS", "SCORE"
    );
    println!("  {}", "-".repeat(64));

    for r in ranks {
        println!(
            "  {:<4} {:<32} {:>6} {:>10} {:>8.2}",
            r.rank,
            truncate(&r.keyword, 30),
            r.count,
            format_views(r.avg_views),
            r.score,
        );
    }
}

fn print_video_rows(videos: &[VideoRecord]) {
    for v in videos {
        println!(
            "    {:<46} {:<18} {:>8}",
            truncate(&v.title, 44),
            truncate(&v.channel_title, 16),
            format_views(v.view_count),
        );
    }
}

/// Print database stats.
pub fn print_stats(stats: &DbStats) {
    println!("Database Statistics:");
    println!("  Projects:      {}", stats.projects);
    println!("  Scripts:       {}", stats.scripts);
    println!("  Angles:        {}", stats.angles);
    println!("  CTAs:          {}", stats.ctas);
    println!("  Shorts:        {}", stats.shorts);
    println!("  Products:      {}", stats.products);
    println!("  Trend queries: {}", stats.trend_queries);
    println!("  DB Size:       {}", format_bytes(stats.db_size_bytes));
    println!("\n  Statuses:");
    for sc in &stats.statuses {
        println!("    {:<12} {}", sc.status, sc.count);
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_wide_chars() {
        let truncated = truncate("고양이 영상 모음집", 8);
        assert!(UnicodeWidthStr::width(truncated.as_str()) <= 8);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncate_leaves_short_strings_alone() {
        assert_eq!(truncate("short", 40), "short");
    }

    #[test]
    fn format_views_scales_units() {
        assert_eq!(format_views(950), "950");
        assert_eq!(format_views(12_500), "12.5K");
        assert_eq!(format_views(3_400_000), "3.4M");
    }

    #[test]
    fn format_timestamp_minutes_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(125.0), "02:05");
    }
}
