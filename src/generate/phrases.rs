//! Fixed phrase pools for the template engine. All selection is uniform;
//! the pools themselves are the only source of variation.

use crate::db::models::Tone;

/// Tone-keyed opening hooks.
pub fn hooks(tone: Tone) -> &'static [&'static str] {
    match tone {
        Tone::Casual => &[
            "Hey! Quick question...",
            "So here's something cool...",
            "Let me tell you about...",
            "You know what's crazy?",
            "Real talk...",
        ],
        Tone::Professional => &[
            "Today I'm going to show you...",
            "In this video, we'll explore...",
            "Let's dive into...",
            "Here's what you need to know about...",
            "I'm going to break down...",
        ],
        Tone::Energetic => &[
            "Alright, let's GO!",
            "This is HUGE!",
            "Get ready for this...",
            "You won't BELIEVE...",
            "Let's jump right in!",
        ],
        Tone::Educational => &[
            "Welcome back. Today's lesson...",
            "Let's understand...",
            "I'll explain how...",
            "Here's a comprehensive guide to...",
            "Step by step, we'll learn...",
        ],
    }
}

/// Opening frames. `{hook}`, `{topic}` and `{audience}` are interpolated by
/// the engine; only the first frame uses the audience.
pub const OPENING_FRAMES: &[&str] = &[
    "{hook} {topic}. If you're {audience}, this is for you.",
    "{hook} {topic}. This will save you hours of frustration.",
    "{hook} {topic}. By the end of this video, you'll know exactly what to do.",
    "{hook} the top secrets about {topic}. Let's get started.",
];

pub const ENDING_CTAS: &[&str] = &[
    "If you found this helpful, don't forget to save this video for later.",
    "Drop a comment below if you have questions.",
    "Subscribe for more content like this.",
    "Share this with someone who needs to see it.",
    "Hit that like button if this helped you out.",
];

pub const PRODUCT_BRIDGES: &[&str] = &[
    "And if you want to dive deeper, check out the link in the description.",
    "I've also included some resources below that can help you further.",
    "For a complete guide, visit the link in the description.",
];

/// Generic B-roll shoot hints appended after the topic itself.
pub const BROLL_GENERIC: &[&str] = &[
    "workspace",
    "computer screen",
    "hands typing",
    "close-up",
    "transition effect",
];

/// Generic hashtags appended after the topic tag.
pub const GENERIC_HASHTAGS: &[&str] = &["#Tutorial", "#HowTo", "#Guide", "#Tips"];

/// The three fixed audience personas for angle generation.
pub const PERSONAS: &[&str] = &["Beginner", "Power User", "Professional"];

/// Suffixes used by the synthetic related-query generator ("rising" kind).
pub const RISING_SUFFIXES: &[&str] = &["2026", "for beginners", "tutorial", "guide", "tips", "tricks", "hacks"];
pub const RISING_PREFIXES: &[&str] = &["how to", "best", "popular", "learn", "guide to", "tips for", "tutorial"];
pub const RISING_RELATED: &[&str] = &["tools", "software", "apps", "course", "free", "online"];
