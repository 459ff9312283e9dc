//! Rule-based template engine. Every generator here is a pure function of a
//! project's attributes plus an injected [`RandomSource`]; structure is
//! deterministic, only the phrase selection varies. Works fully offline.

use crate::db::models::{BodyStep, Caption, Chapter, CtaTiming, Length, SubtitleCue, Tone};
use crate::generate::phrases;
use crate::generate::random::RandomSource;

/// A generated script before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDraft {
    pub opening: String,
    pub body: Vec<BodyStep>,
    pub ending: String,
    pub full_markdown: String,
    pub word_count: usize,
}

impl ScriptDraft {
    /// Build a draft from its parts, deriving markdown and word count.
    /// Used both by the generator and by `revise`, so the derived fields
    /// can never drift from the parts.
    pub fn compose(opening: String, body: Vec<BodyStep>, ending: String) -> Self {
        let body_markdown = body
            .iter()
            .map(|step| format!("**[{}]** {}", format_time(step.t), step.line))
            .collect::<Vec<_>>()
            .join("\n\n");
        let full_markdown = format!(
            "## Opening\n\n{opening}\n\n## Body\n\n{body_markdown}\n\n## Ending\n\n{ending}"
        );
        let word_count = word_count(&opening)
            + body.iter().map(|s| word_count(&s.line)).sum::<usize>()
            + word_count(&ending);

        ScriptDraft {
            opening,
            body,
            ending,
            full_markdown,
            word_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AngleDraft {
    pub persona: String,
    pub angle_title: String,
    pub hook: String,
    pub thumbnail_copy: String,
}

#[derive(Debug, Clone)]
pub struct CtaDraft {
    pub timing: CtaTiming,
    pub text: String,
    pub on_screen_text: String,
    pub destination: String,
}

#[derive(Debug, Clone)]
pub struct SeoDraft {
    pub title_a: String,
    pub title_b: String,
    pub description: String,
    pub hashtags: Vec<String>,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone)]
pub struct AssetHintsDraft {
    pub broll_keywords: Vec<String>,
    pub subtitle_cues: Vec<SubtitleCue>,
}

#[derive(Debug, Clone)]
pub struct ShortDraft {
    pub duration_sec: i64,
    pub hook: String,
    pub captions: Vec<Caption>,
    pub overlay_texts: Vec<String>,
}

/// Whitespace-delimited token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Seconds to MM:SS.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Char-boundary-safe truncation with ellipsis.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Generate a complete script. Total for all valid enum inputs; the Tone and
/// Length parsers already degrade unknown values to their defaults.
pub fn generate_script(
    topic: &str,
    tone: Tone,
    length: Length,
    audience: &str,
    rng: &mut dyn RandomSource,
) -> ScriptDraft {
    let opening = generate_opening(topic, tone, audience, rng);
    let body = generate_body(topic, length);
    let ending = generate_ending(rng);
    ScriptDraft::compose(opening, body, ending)
}

fn generate_opening(topic: &str, tone: Tone, audience: &str, rng: &mut dyn RandomSource) -> String {
    let hook = rng.pick(phrases::hooks(tone));
    let audience = if audience.trim().is_empty() {
        "someone interested in this topic"
    } else {
        audience
    };
    let frame = rng.pick(phrases::OPENING_FRAMES);
    frame
        .replace("{hook}", hook)
        .replace("{topic}", topic)
        .replace("{audience}", audience)
}

fn generate_body(topic: &str, length: Length) -> Vec<BodyStep> {
    let seconds_per_step = length.seconds_per_step();
    (0..length.step_count())
        .map(|i| BodyStep {
            t: i as f64 * seconds_per_step,
            line: format!(
                "Step {}: [Key point about {topic}]. Here's what you need to do. \
                 Make sure you understand this part before moving on.",
                i + 1
            ),
        })
        .collect()
}

fn generate_ending(rng: &mut dyn RandomSource) -> String {
    let cta = rng.pick(phrases::ENDING_CTAS);
    let bridge = rng.pick(phrases::PRODUCT_BRIDGES);
    format!("{cta} {bridge} Thanks for watching!")
}

/// One angle per fixed persona: Beginner, Power User, Professional.
pub fn generate_angles(topic: &str) -> Vec<AngleDraft> {
    phrases::PERSONAS
        .iter()
        .map(|persona| AngleDraft {
            persona: persona.to_string(),
            angle_title: format!("{topic} for {persona}s"),
            hook: format!(
                "Are you a {} looking to master {topic}?",
                persona.to_lowercase()
            ),
            thumbnail_copy: format!("{persona}'s Guide"),
        })
        .collect()
}

/// Three CTAs at fixed timings with fixed copy.
pub fn generate_ctas() -> Vec<CtaDraft> {
    vec![
        CtaDraft {
            timing: CtaTiming::Opening,
            text: "Make sure you save this video because we're covering everything.".into(),
            on_screen_text: "SAVE THIS".into(),
            destination: "Save button".into(),
        },
        CtaDraft {
            timing: CtaTiming::Mid,
            text: "If you're getting value from this, drop a comment below.".into(),
            on_screen_text: "COMMENT".into(),
            destination: "Comments".into(),
        },
        CtaDraft {
            timing: CtaTiming::Ending,
            text: "Subscribe for more content like this every week.".into(),
            on_screen_text: "SUBSCRIBE".into(),
            destination: "Subscribe button".into(),
        },
    ]
}

/// SEO metadata: two title variants, a description embedding the chapter
/// list, hashtags, and exactly five chapter markers at fixed timestamps.
pub fn generate_seo(topic: &str) -> SeoDraft {
    let chapters = vec![
        Chapter { t: 0.0, label: "Introduction".into() },
        Chapter { t: 30.0, label: "Overview".into() },
        Chapter { t: 120.0, label: "Main Content".into() },
        Chapter { t: 300.0, label: "Advanced Tips".into() },
        Chapter { t: 420.0, label: "Conclusion".into() },
    ];

    let chapter_lines = chapters
        .iter()
        .map(|c| format!("{} - {}", format_time(c.t), c.label))
        .collect::<Vec<_>>()
        .join("\n");

    let description = format!(
        "Learn everything about {topic}. In this comprehensive guide, we'll walk you \
         through the essential steps, tips, and tricks. Perfect for beginners and \
         advanced users alike.\n\nChapters:\n{chapter_lines}\n\nResources mentioned:\n\
         [Links in description]\n\nDon't forget to subscribe for more!"
    );

    let mut hashtags = vec![format!("#{}", topic.split_whitespace().collect::<String>())];
    hashtags.extend(phrases::GENERIC_HASHTAGS.iter().map(|t| t.to_string()));

    SeoDraft {
        title_a: format!("{topic} - Complete Guide"),
        title_b: format!("How to Master {topic} in 5 Simple Steps"),
        description,
        hashtags,
        chapters,
    }
}

/// B-roll keywords plus one subtitle cue per body step. The first cue gets
/// high emphasis, the rest medium.
pub fn generate_asset_hints(topic: &str, body: &[BodyStep]) -> AssetHintsDraft {
    let mut broll_keywords = vec![topic.to_string()];
    broll_keywords.extend(phrases::BROLL_GENERIC.iter().map(|k| k.to_string()));

    let subtitle_cues = body
        .iter()
        .enumerate()
        .map(|(i, step)| SubtitleCue {
            t: step.t,
            cue_type: "caption".into(),
            emphasis: if i == 0 { "high" } else { "medium" }.into(),
        })
        .collect();

    AssetHintsDraft {
        broll_keywords,
        subtitle_cues,
    }
}

/// Exactly three short-form variants at 15/30/45 seconds, in that order:
/// a hook cut, a step-by-step cut, and a problem-solution cut.
pub fn generate_shorts(topic: &str, body: &[BodyStep]) -> Vec<ShortDraft> {
    let first_line = body
        .first()
        .map(|s| truncate_chars(&s.line, 50))
        .unwrap_or_else(|| "Key insight".to_string());

    let hook_short = ShortDraft {
        duration_sec: 15,
        hook: format!("{topic} in 15 seconds!"),
        captions: vec![
            Caption { t: 0.0, text: "Quick tip!".into() },
            Caption { t: 3.0, text: first_line.clone() },
            Caption { t: 10.0, text: "Save for later!".into() },
        ],
        overlay_texts: vec!["QUICK TIP".into(), "SAVE THIS".into()],
    };

    let step_short = ShortDraft {
        duration_sec: 30,
        hook: format!("3 steps to master {topic}"),
        captions: body
            .iter()
            .take(3)
            .enumerate()
            .map(|(i, step)| Caption {
                t: i as f64 * 10.0,
                text: format!("{}. {}", i + 1, truncate_chars(&step.line, 40)),
            })
            .collect(),
        overlay_texts: vec!["STEP 1".into(), "STEP 2".into(), "STEP 3".into(), "DONE".into()],
    };

    let problem_short = ShortDraft {
        duration_sec: 45,
        hook: format!("Struggling with {topic}? Here's the fix."),
        captions: vec![
            Caption { t: 0.0, text: "The problem:".into() },
            Caption { t: 5.0, text: "Most people get this wrong".into() },
            Caption { t: 15.0, text: "Here's what actually works:".into() },
            Caption { t: 20.0, text: first_line },
            Caption { t: 35.0, text: "Try this today!".into() },
        ],
        overlay_texts: vec!["PROBLEM".into(), "SOLUTION".into(), "RESULTS".into()],
    };

    vec![hook_short, step_short, problem_short]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::random::SeededRandom;

    #[test]
    fn body_step_count_matches_length_category() {
        let mut rng = SeededRandom::new(1);
        for (length, expected) in [
            (Length::Short, 3),
            (Length::Medium, 5),
            (Length::Long, 7),
        ] {
            let script =
                generate_script("topic", Tone::Professional, length, "viewers", &mut rng);
            assert_eq!(script.body.len(), expected);
        }
    }

    #[test]
    fn body_timestamps_strictly_increase() {
        let mut rng = SeededRandom::new(2);
        let script = generate_script("topic", Tone::Casual, Length::Long, "", &mut rng);
        for pair in script.body.windows(2) {
            assert!(pair[1].t > pair[0].t);
        }
    }

    #[test]
    fn word_count_matches_recomputation() {
        let mut rng = SeededRandom::new(3);
        let script = generate_script("baking bread", Tone::Energetic, Length::Medium, "", &mut rng);
        let recomputed = word_count(&script.opening)
            + script.body.iter().map(|s| word_count(&s.line)).sum::<usize>()
            + word_count(&script.ending);
        assert_eq!(script.word_count, recomputed);
    }

    #[test]
    fn markdown_has_three_section_headers_in_order() {
        let mut rng = SeededRandom::new(4);
        let script = generate_script("topic", Tone::Educational, Length::Short, "", &mut rng);
        let opening_pos = script.full_markdown.find("## Opening").unwrap();
        let body_pos = script.full_markdown.find("## Body").unwrap();
        let ending_pos = script.full_markdown.find("## Ending").unwrap();
        assert!(opening_pos < body_pos);
        assert!(body_pos < ending_pos);
    }

    #[test]
    fn korean_topic_short_length_end_to_end() {
        let mut rng = SeededRandom::new(5);
        let script = generate_script("고양이 영상", Tone::Casual, Length::Short, "", &mut rng);
        assert_eq!(script.body.len(), 3);
        assert_eq!(script.body[0].t, 0.0);
        assert_eq!(script.body[1].t, 20.0);
        assert_eq!(script.body[2].t, 40.0);
        assert!(script.opening.contains("고양이 영상"));
        assert!(script.word_count > 0);
    }

    #[test]
    fn angles_are_three_distinct_personas() {
        let angles = generate_angles("gardening");
        assert_eq!(angles.len(), 3);
        let personas: std::collections::HashSet<_> =
            angles.iter().map(|a| a.persona.as_str()).collect();
        assert_eq!(personas.len(), 3);
        for angle in &angles {
            assert!(angle.angle_title.contains("gardening"));
            assert!(!angle.hook.is_empty());
        }
    }

    #[test]
    fn ctas_cover_all_three_timings() {
        let ctas = generate_ctas();
        assert_eq!(ctas.len(), 3);
        assert_eq!(ctas[0].timing, CtaTiming::Opening);
        assert_eq!(ctas[1].timing, CtaTiming::Mid);
        assert_eq!(ctas[2].timing, CtaTiming::Ending);
    }

    #[test]
    fn seo_has_five_chapters_at_fixed_offsets() {
        let seo = generate_seo("video editing");
        assert_eq!(seo.chapters.len(), 5);
        let offsets: Vec<f64> = seo.chapters.iter().map(|c| c.t).collect();
        assert_eq!(offsets, vec![0.0, 30.0, 120.0, 300.0, 420.0]);
        assert_eq!(seo.hashtags.len(), 5);
        assert_eq!(seo.hashtags[0], "#videoediting");
        assert!(seo.description.contains("video editing"));
    }

    #[test]
    fn asset_hints_one_cue_per_step_first_high() {
        let mut rng = SeededRandom::new(6);
        let script = generate_script("topic", Tone::Professional, Length::Medium, "", &mut rng);
        let hints = generate_asset_hints("topic", &script.body);
        assert_eq!(hints.subtitle_cues.len(), script.body.len());
        assert_eq!(hints.subtitle_cues[0].emphasis, "high");
        assert!(hints.subtitle_cues[1..]
            .iter()
            .all(|c| c.emphasis == "medium"));
        assert_eq!(hints.broll_keywords[0], "topic");
    }

    #[test]
    fn shorts_are_fixed_duration_triple_in_order() {
        let mut rng = SeededRandom::new(7);
        let script = generate_script("cooking", Tone::Casual, Length::Medium, "", &mut rng);
        let shorts = generate_shorts("cooking", &script.body);
        assert_eq!(shorts.len(), 3);
        let durations: Vec<i64> = shorts.iter().map(|s| s.duration_sec).collect();
        assert_eq!(durations, vec![15, 30, 45]);
        for short in &shorts {
            assert!(!short.hook.is_empty());
            assert!(!short.captions.is_empty() && short.captions.len() <= 5);
            assert!(short.overlay_texts.len() >= 2 && short.overlay_texts.len() <= 4);
            for pair in short.captions.windows(2) {
                assert!(pair[1].t >= pair[0].t);
            }
        }
    }

    #[test]
    fn shorts_with_empty_body_still_produce_captions() {
        let shorts = generate_shorts("topic", &[]);
        assert_eq!(shorts.len(), 3);
        assert!(shorts[0].captions.iter().any(|c| c.text == "Key insight"));
        // step variant has no body steps to cut from
        assert!(shorts[1].captions.is_empty());
    }

    #[test]
    fn format_time_is_zero_padded() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65.0), "01:05");
        assert_eq!(format_time(420.0), "07:00");
    }
}
