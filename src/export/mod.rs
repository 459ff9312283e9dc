//! Script export to plain text and SubRip subtitles.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::db::models::{Project, Script};
use crate::db::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Srt,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "txt" => Ok(ExportFormat::Txt),
            "srt" => Ok(ExportFormat::Srt),
            _ => bail!("Unknown export format: {}. Supported: txt, srt", s),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Srt => "srt",
        }
    }
}

/// Seconds the opening cue occupies before the first body cue may start.
const OPENING_SECS: f64 = 10.0;
/// Duration of the final body cue, which has no successor to end at.
const FINAL_CUE_SECS: f64 = 40.0;

/// Export a project's script to a file. Returns the path written.
pub fn export_script(
    db: &Database,
    project_id: &str,
    format: ExportFormat,
    out: Option<&Path>,
) -> Result<PathBuf> {
    let project = db
        .get_project(project_id)?
        .with_context(|| format!("Project not found: {}", project_id))?;
    let script = db
        .get_script(project_id)?
        .with_context(|| format!("Project has no script: {}", project_id))?;

    let content = match format {
        ExportFormat::Txt => render_txt(&script),
        ExportFormat::Srt => render_srt(&script),
    };

    let path = match out {
        Some(p) => p.to_path_buf(),
        None => default_export_path(&project, format),
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;
    Ok(path)
}

fn default_export_path(project: &Project, format: ExportFormat) -> PathBuf {
    PathBuf::from(format!(
        "{}.{}",
        sanitize_filename(&project.topic),
        format.extension()
    ))
}

/// Lowercase the name and replace anything outside [a-z0-9_-] with an
/// underscore, so topics in any script become safe filenames.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = sanitized.trim_matches('_');
    if trimmed.is_empty() {
        "script".to_string()
    } else {
        trimmed.to_string()
    }
}

fn render_txt(script: &Script) -> String {
    let mut out = script.full_markdown.clone();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Render SubRip cues: the opening holds the first ten seconds, then body
/// cues chain so each one ends exactly where the next begins. A body
/// timestamp earlier than the previous cue's end is pushed forward rather
/// than overlapped.
fn render_srt(script: &Script) -> String {
    let mut starts: Vec<f64> = Vec::with_capacity(script.body.len());
    let mut prev = OPENING_SECS;
    for step in &script.body {
        let start = step.t.max(prev);
        starts.push(start);
        prev = start;
    }

    let mut entries: Vec<(f64, f64, &str)> = Vec::with_capacity(script.body.len() + 1);
    entries.push((0.0, OPENING_SECS, script.opening.as_str()));
    for (i, step) in script.body.iter().enumerate() {
        let start = starts[i];
        let end = starts.get(i + 1).copied().unwrap_or(start + FINAL_CUE_SECS);
        entries.push((start, end, step.line.as_str()));
    }

    let mut out = String::new();
    for (i, (start, end, text)) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_srt_time(*start),
            format_srt_time(*end),
            text
        ));
    }
    out
}

fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as i64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let s = total_secs % 60;
    let m = (total_secs / 60) % 60;
    let h = total_secs / 3600;
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{BodyStep, Script};

    fn script_with_body(body: Vec<BodyStep>) -> Script {
        Script {
            id: "s1".into(),
            project_id: "p1".into(),
            opening: "Welcome to the show.".into(),
            body,
            ending: "Thanks for watching!".into(),
            full_markdown: "## Opening\n\nWelcome to the show.".into(),
            word_count: 10,
            version: 1,
            created_at: "2026-08-30T00:00:00Z".into(),
        }
    }

    #[test]
    fn srt_opening_holds_first_ten_seconds() {
        let script = script_with_body(vec![
            BodyStep { t: 0.0, line: "Step one.".into() },
            BodyStep { t: 20.0, line: "Step two.".into() },
        ]);
        let srt = render_srt(&script);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:10,000\nWelcome to the show.\n"));
        assert!(srt.contains("2\n00:00:10,000 --> 00:00:20,000\nStep one.\n"));
        assert!(srt.contains("3\n00:00:20,000 --> 00:01:00,000\nStep two.\n"));
    }

    #[test]
    fn srt_cues_are_contiguous_and_monotone() {
        let script = script_with_body(vec![
            BodyStep { t: 0.0, line: "a".into() },
            BodyStep { t: 40.0, line: "b".into() },
            BodyStep { t: 80.0, line: "c".into() },
        ]);
        let srt = render_srt(&script);
        let lines: Vec<&str> = srt.lines().collect();
        // every cue's end equals the next cue's start
        let times: Vec<&str> = lines
            .iter()
            .filter(|l| l.contains(" --> "))
            .copied()
            .collect();
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            let end = pair[0].split(" --> ").nth(1).unwrap();
            let start = pair[1].split(" --> ").next().unwrap();
            assert_eq!(end, start);
        }
    }

    #[test]
    fn srt_final_cue_gets_forty_seconds() {
        let script = script_with_body(vec![BodyStep { t: 120.0, line: "last".into() }]);
        let srt = render_srt(&script);
        assert!(srt.contains("00:02:00,000 --> 00:02:40,000"));
    }

    #[test]
    fn srt_empty_body_is_opening_only() {
        let script = script_with_body(Vec::new());
        let srt = render_srt(&script);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:10,000\nWelcome to the show.\n\n"
        );
    }

    #[test]
    fn format_srt_time_rolls_over_units() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(61.5), "00:01:01,500");
        assert_eq!(format_srt_time(3661.001), "01:01:01,001");
    }

    #[test]
    fn sanitize_filename_replaces_unsafe_chars() {
        assert_eq!(sanitize_filename("My Video: Part 2!"), "my_video__part_2");
        assert_eq!(sanitize_filename("already-safe_name"), "already-safe_name");
        assert_eq!(sanitize_filename("고양이 영상"), "script");
    }

    #[test]
    fn txt_export_ends_with_newline() {
        let script = script_with_body(Vec::new());
        let txt = render_txt(&script);
        assert!(txt.ends_with('\n'));
        assert!(txt.contains("## Opening"));
    }
}
