pub mod phrases;
pub mod random;
pub mod templates;

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::config::VidplanConfig;
use crate::db::models::{Length, Project, Script, Status, Tone};
use crate::db::Database;
use crate::generate::random::RandomSource;
use crate::sources::openai::OpenAiClient;
use crate::sources::SourceError;
use templates::ScriptDraft;

/// Outcome of a full project build.
pub struct GenerationReport {
    pub project: Project,
    pub script: Script,
    pub ai_used: bool,
    pub ai_fallback: bool,
    pub tokens_used: Option<i64>,
}

/// Reject bad topics before any row is created.
pub fn validate_topic(topic: &str) -> Result<()> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        bail!("Topic must not be empty");
    }
    if trimmed.chars().count() > 200 {
        bail!("Topic must be 200 characters or fewer");
    }
    Ok(())
}

/// Create a project and generate its full asset set: script (AI or template),
/// three angles, three CTAs, SEO metadata, and asset hints. Each asset insert
/// is independent, so a failure after the script leaves no half-written rows
/// inside a single entity.
pub fn build_project(
    db: &Database,
    config: &VidplanConfig,
    topic: &str,
    audience: &str,
    tone: Tone,
    length: Length,
    use_ai: bool,
    rng: &mut dyn RandomSource,
) -> Result<GenerationReport> {
    validate_topic(topic)?;
    let topic = topic.trim();

    let project = db.create_project(topic, audience, tone, length)?;

    let mut ai_used = false;
    let mut ai_fallback = false;
    let mut tokens_used = None;

    let draft = if use_ai {
        match ai_script(config, topic, audience, tone, length) {
            Ok((draft, tokens)) => {
                ai_used = true;
                tokens_used = tokens;
                draft
            }
            Err(SourceError::Configuration(msg)) => {
                // No key configured: quietly run in template mode.
                warn!("AI backend unavailable ({msg}); using template engine");
                templates::generate_script(topic, tone, length, audience, rng)
            }
            Err(e) => {
                warn!("AI generation failed ({e}); falling back to template engine");
                ai_fallback = true;
                templates::generate_script(topic, tone, length, audience, rng)
            }
        }
    } else {
        templates::generate_script(topic, tone, length, audience, rng)
    };

    let script = db.upsert_script(&project.id, &draft, 1)?;
    db.insert_angles(&project.id, &templates::generate_angles(topic))?;
    db.insert_ctas(&project.id, &templates::generate_ctas())?;
    db.upsert_seo(&project.id, &templates::generate_seo(topic))?;
    db.upsert_asset_hints(&project.id, &templates::generate_asset_hints(topic, &script.body))?;

    Ok(GenerationReport {
        project,
        script,
        ai_used,
        ai_fallback,
        tokens_used,
    })
}

fn ai_script(
    config: &VidplanConfig,
    topic: &str,
    audience: &str,
    tone: Tone,
    length: Length,
) -> std::result::Result<(ScriptDraft, Option<i64>), SourceError> {
    let api_key = crate::config::resolve_credential(
        None,
        "OPENAI_API_KEY",
        config.openai.as_ref(),
    )
    .map_err(|e| SourceError::Configuration(e.to_string()))?;

    let client = OpenAiClient::new(api_key, config.openai.as_ref());
    let generated = client.generate_script(topic, audience, tone, length)?;
    let tokens = generated.total_tokens;
    Ok((generated.draft, tokens))
}

/// Generate and persist the three short-form variants for a project.
pub fn build_shorts(db: &Database, project_id: &str) -> Result<Vec<crate::db::models::Short>> {
    let project = db
        .get_project(project_id)?
        .with_context(|| format!("Project not found: {project_id}"))?;
    let script = db
        .get_script(project_id)?
        .with_context(|| format!("Project has no script yet: {project_id}"))?;

    let drafts = templates::generate_shorts(&project.topic, &script.body);
    db.insert_shorts(project_id, &drafts)
}

/// Edits applied by `vidplan revise`.
#[derive(Debug, Default)]
pub struct ScriptEdits {
    pub opening: Option<String>,
    pub ending: Option<String>,
    /// (1-based step index, replacement line)
    pub steps: Vec<(usize, String)>,
}

/// Apply edits to a project's script, recomputing markdown and word count and
/// bumping the version. Moves the project into InEditing unless it is already
/// further along.
pub fn revise_script(db: &Database, project_id: &str, edits: &ScriptEdits) -> Result<Script> {
    let project = db
        .get_project(project_id)?
        .with_context(|| format!("Project not found: {project_id}"))?;
    let script = db
        .get_script(project_id)?
        .with_context(|| format!("Project has no script yet: {project_id}"))?;

    let opening = edits.opening.clone().unwrap_or(script.opening);
    let ending = edits.ending.clone().unwrap_or(script.ending);
    let mut body = script.body;
    for (index, line) in &edits.steps {
        if *index == 0 || *index > body.len() {
            bail!("Step {index} out of range (script has {} steps)", body.len());
        }
        body[*index - 1].line = line.clone();
    }

    let draft = ScriptDraft::compose(opening, body, ending);
    let revised = db.upsert_script(project_id, &draft, script.version + 1)?;

    if project.status < Status::InEditing {
        db.set_project_status(project_id, Status::InEditing)?;
    }
    Ok(revised)
}

/// Copy a project and every asset it owns into a fresh Draft project. The
/// script restarts at version 1; shorts and products are copied as-is.
pub fn duplicate_project(db: &Database, project_id: &str) -> Result<Project> {
    use crate::generate::templates::{
        AngleDraft, AssetHintsDraft, CtaDraft, SeoDraft, ShortDraft,
    };

    let source = db
        .get_project(project_id)?
        .with_context(|| format!("Project not found: {project_id}"))?;

    let copy = db.create_project(&source.topic, &source.audience, source.tone, source.length)?;

    if let Some(script) = db.get_script(project_id)? {
        let draft = ScriptDraft::compose(script.opening, script.body, script.ending);
        db.upsert_script(&copy.id, &draft, 1)?;
    }

    let angles: Vec<AngleDraft> = db
        .get_angles(project_id)?
        .into_iter()
        .map(|a| AngleDraft {
            persona: a.persona,
            angle_title: a.angle_title,
            hook: a.hook,
            thumbnail_copy: a.thumbnail_copy,
        })
        .collect();
    if !angles.is_empty() {
        db.insert_angles(&copy.id, &angles)?;
    }

    let ctas: Vec<CtaDraft> = db
        .get_ctas(project_id)?
        .into_iter()
        .map(|c| CtaDraft {
            timing: c.timing,
            text: c.text,
            on_screen_text: c.on_screen_text,
            destination: c.destination,
        })
        .collect();
    if !ctas.is_empty() {
        db.insert_ctas(&copy.id, &ctas)?;
    }

    if let Some(seo) = db.get_seo(project_id)? {
        db.upsert_seo(
            &copy.id,
            &SeoDraft {
                title_a: seo.title_a,
                title_b: seo.title_b,
                description: seo.description,
                hashtags: seo.hashtags,
                chapters: seo.chapters,
            },
        )?;
    }

    if let Some(hints) = db.get_asset_hints(project_id)? {
        db.upsert_asset_hints(
            &copy.id,
            &AssetHintsDraft {
                broll_keywords: hints.broll_keywords,
                subtitle_cues: hints.subtitle_cues,
            },
        )?;
    }

    let shorts: Vec<ShortDraft> = db
        .get_shorts(project_id)?
        .into_iter()
        .map(|s| ShortDraft {
            duration_sec: s.duration_sec,
            hook: s.hook,
            captions: s.captions,
            overlay_texts: s.overlay_texts,
        })
        .collect();
    if !shorts.is_empty() {
        db.insert_shorts(&copy.id, &shorts)?;
    }

    for product in db.get_products(project_id)? {
        db.insert_product(
            &copy.id,
            &product.name,
            &product.description,
            &product.url,
            &product.button_text,
        )?;
    }

    Ok(copy)
}

/// Advance a project's status. Regressions are rejected; the lifecycle only
/// moves forward.
pub fn advance_status(db: &Database, project: &Project, new_status: Status) -> Result<()> {
    if new_status <= project.status {
        bail!(
            "Status can only move forward (current: {}, requested: {})",
            project.status.as_str(),
            new_status.as_str()
        );
    }
    db.set_project_status(&project.id, new_status)
}
