use serde::{Deserialize, Serialize};

/// Delivery tone of a project's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Casual,
    Professional,
    Energetic,
    Educational,
}

impl Tone {
    /// Parse a stored value. Unrecognized tones degrade to Professional;
    /// generation never fails on a bad enum.
    pub fn parse(s: &str) -> Self {
        match s {
            "casual" => Tone::Casual,
            "professional" => Tone::Professional,
            "energetic" => Tone::Energetic,
            "educational" => Tone::Educational,
            _ => Tone::Professional,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Casual => "casual",
            Tone::Professional => "professional",
            Tone::Energetic => "energetic",
            Tone::Educational => "educational",
        }
    }
}

/// Target video length category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    Medium,
    Long,
}

impl Length {
    pub fn parse(s: &str) -> Self {
        match s {
            "short" => Length::Short,
            "medium" => Length::Medium,
            "long" => Length::Long,
            _ => Length::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
        }
    }

    /// Number of body steps for this length category.
    pub fn step_count(&self) -> usize {
        match self {
            Length::Short => 3,
            Length::Medium => 5,
            Length::Long => 7,
        }
    }

    /// Seconds allotted per body step.
    pub fn seconds_per_step(&self) -> f64 {
        match self {
            Length::Short => 20.0,
            Length::Medium => 40.0,
            Length::Long => 60.0,
        }
    }
}

/// Project lifecycle. Ordering matters: status only advances forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Draft,
    InEditing,
    Ready,
    Published,
}

impl Status {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(Status::Draft),
            "InEditing" => Some(Status::InEditing),
            "Ready" => Some(Status::Ready),
            "Published" => Some(Status::Published),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "Draft",
            Status::InEditing => "InEditing",
            Status::Ready => "Ready",
            Status::Published => "Published",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub topic: String,
    pub audience: String,
    pub tone: Tone,
    pub length: Length,
    pub status: Status,
    pub created_at: String,
    pub updated_at: String,
}

/// One timestamped line of the script body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyStep {
    pub t: f64,
    pub line: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub id: String,
    pub project_id: String,
    pub opening: String,
    pub body: Vec<BodyStep>,
    pub ending: String,
    pub full_markdown: String,
    pub word_count: i64,
    pub version: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Angle {
    pub id: String,
    pub project_id: String,
    pub persona: String,
    pub angle_title: String,
    pub hook: String,
    pub thumbnail_copy: String,
}

/// Placement of a call-to-action within the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaTiming {
    Opening,
    Mid,
    Ending,
}

impl CtaTiming {
    pub fn parse(s: &str) -> Self {
        match s {
            "opening" => CtaTiming::Opening,
            "ending" => CtaTiming::Ending,
            _ => CtaTiming::Mid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CtaTiming::Opening => "opening",
            CtaTiming::Mid => "mid",
            CtaTiming::Ending => "ending",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cta {
    pub id: String,
    pub project_id: String,
    pub timing: CtaTiming,
    pub text: String,
    pub on_screen_text: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub t: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoMeta {
    pub id: String,
    pub project_id: String,
    pub title_a: String,
    pub title_b: String,
    pub description: String,
    pub hashtags: Vec<String>,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    pub t: f64,
    #[serde(rename = "type")]
    pub cue_type: String,
    pub emphasis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetHints {
    pub id: String,
    pub project_id: String,
    pub broll_keywords: Vec<String>,
    pub subtitle_cues: Vec<SubtitleCue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub t: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Short {
    pub id: String,
    pub project_id: String,
    pub duration_sec: i64,
    pub hook: String,
    pub captions: Vec<Caption>,
    pub overlay_texts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub button_text: String,
    pub utm: String,
}

/// A cached trend analysis, keyed by (keyword, locale, range).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendQueryRow {
    pub id: String,
    pub keyword: String,
    pub locale: String,
    pub range: String,
    pub result: crate::trends::TrendResult,
    pub created_at: String,
}

/// Stats returned by `vidplan stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStats {
    pub projects: i64,
    pub scripts: i64,
    pub angles: i64,
    pub ctas: i64,
    pub shorts: i64,
    pub products: i64,
    pub trend_queries: i64,
    pub statuses: Vec<StatusCount>,
    pub db_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
