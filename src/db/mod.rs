pub mod migrations;
pub mod models;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::generate::templates::{
    AngleDraft, AssetHintsDraft, CtaDraft, ScriptDraft, SeoDraft, ShortDraft,
};
use crate::trends::TrendResult;
use models::*;

pub struct Database {
    pub conn: Connection,
    pub path: PathBuf,
}

/// Filters that can be applied to project list queries.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilters {
    pub status: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // Performance pragmas
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA cache_size = -64000;",
        )?;

        schema::create_schema(&conn)?;
        migrations::run_migrations(&conn)?;

        info!("Opened database: {}", path.display());

        Ok(Database {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Default database path: ~/.vidplan/vidplan.db
    pub fn default_db_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".vidplan").join("vidplan.db"))
    }

    // ---- projects ----

    /// Create a new project in Draft status.
    pub fn create_project(
        &self,
        topic: &str,
        audience: &str,
        tone: Tone,
        length: Length,
    ) -> Result<Project> {
        let now = now_iso();
        let project = Project {
            id: new_id(),
            topic: topic.to_string(),
            audience: audience.to_string(),
            tone,
            length,
            status: Status::Draft,
            created_at: now.clone(),
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO projects (id, topic, audience, tone, length, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                project.id,
                project.topic,
                project.audience,
                project.tone.as_str(),
                project.length.as_str(),
                project.status.as_str(),
                project.created_at,
                project.updated_at,
            ],
        )?;

        Ok(project)
    }

    /// Get a single project by ID.
    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, topic, audience, tone, length, status, created_at, updated_at
             FROM projects WHERE id = ?1",
        )?;

        let result = stmt.query_row([id], map_project).optional()?;
        Ok(result)
    }

    /// List projects with optional filters.
    pub fn list_projects(
        &self,
        filters: &ProjectFilters,
        sort: &str,
        limit: usize,
    ) -> Result<Vec<Project>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(ref status) = filters.status {
            conditions.push(format!("status = ?{}", params.len() + 1));
            params.push(Box::new(status.clone()));
        }
        if let Some(ref from) = filters.from_date {
            conditions.push(format!("created_at >= ?{}", params.len() + 1));
            params.push(Box::new(from.clone()));
        }
        if let Some(ref to) = filters.to_date {
            conditions.push(format!("created_at <= ?{}", params.len() + 1));
            params.push(Box::new(to.clone()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order = match sort {
            "topic" => "topic COLLATE NOCASE ASC",
            "updated" => "updated_at DESC",
            _ => "created_at DESC",
        };

        let sql = format!(
            "SELECT id, topic, audience, tone, length, status, created_at, updated_at
             FROM projects {where_clause} ORDER BY {order} LIMIT ?{}",
            params.len() + 1
        );
        params.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt.query_map(param_refs.as_slice(), map_project)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }

    /// Substring search over project topics and script text.
    pub fn search_projects(&self, query: &str, limit: usize) -> Result<Vec<Project>> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT p.id, p.topic, p.audience, p.tone, p.length, p.status,
                    p.created_at, p.updated_at
             FROM projects p
             LEFT JOIN scripts s ON s.project_id = p.id
             WHERE p.topic LIKE ?1 OR p.audience LIKE ?1 OR s.full_markdown LIKE ?1
             ORDER BY p.created_at DESC LIMIT ?2",
        )?;

        let rows = stmt.query_map(rusqlite::params![pattern, limit as i64], map_project)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }

    /// Set a project's status and refresh its updated_at timestamp.
    /// Monotonicity is enforced by the caller, which knows the current status.
    pub fn set_project_status(&self, id: &str, status: Status) -> Result<()> {
        self.conn.execute(
            "UPDATE projects SET status = ?2, updated_at = ?3 WHERE id = ?1",
            rusqlite::params![id, status.as_str(), now_iso()],
        )?;
        Ok(())
    }

    /// Delete a project. Dependent rows cascade via foreign keys.
    pub fn delete_project(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    pub fn project_exists(&self, id: &str) -> Result<bool> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM projects WHERE id = ?1", [id], |r| {
                    r.get(0)
                })?;
        Ok(count > 0)
    }

    // ---- scripts ----

    /// Insert or replace the script for a project.
    pub fn upsert_script(
        &self,
        project_id: &str,
        draft: &ScriptDraft,
        version: i64,
    ) -> Result<Script> {
        let script = Script {
            id: new_id(),
            project_id: project_id.to_string(),
            opening: draft.opening.clone(),
            body: draft.body.clone(),
            ending: draft.ending.clone(),
            full_markdown: draft.full_markdown.clone(),
            word_count: draft.word_count as i64,
            version,
            created_at: now_iso(),
        };

        let body_json = serde_json::to_string(&script.body)?;
        self.conn.execute(
            "INSERT INTO scripts (id, project_id, opening, body_json, ending, full_markdown, word_count, version, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(project_id) DO UPDATE SET
                opening = ?3, body_json = ?4, ending = ?5, full_markdown = ?6,
                word_count = ?7, version = ?8",
            rusqlite::params![
                script.id,
                script.project_id,
                script.opening,
                body_json,
                script.ending,
                script.full_markdown,
                script.word_count,
                script.version,
                script.created_at,
            ],
        )?;

        // On conflict the existing row keeps its id; re-read so the caller
        // sees what is actually stored.
        self.get_script(project_id)?
            .context("Script missing immediately after upsert")
    }

    /// Get the script for a project (latest version).
    pub fn get_script(&self, project_id: &str) -> Result<Option<Script>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, opening, body_json, ending, full_markdown, word_count, version, created_at
             FROM scripts WHERE project_id = ?1",
        )?;

        let raw = stmt
            .query_row([project_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, i64>(7)?,
                    row.get::<_, String>(8)?,
                ))
            })
            .optional()?;

        match raw {
            None => Ok(None),
            Some((id, project_id, opening, body_json, ending, full_markdown, word_count, version, created_at)) => {
                let body: Vec<BodyStep> = serde_json::from_str(&body_json)
                    .with_context(|| format!("Corrupt body_json on script {id}"))?;
                Ok(Some(Script {
                    id,
                    project_id,
                    opening,
                    body,
                    ending,
                    full_markdown,
                    word_count,
                    version,
                    created_at,
                }))
            }
        }
    }

    // ---- angles ----

    pub fn insert_angles(&self, project_id: &str, drafts: &[AngleDraft]) -> Result<Vec<Angle>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut angles = Vec::new();
        for d in drafts {
            let angle = Angle {
                id: new_id(),
                project_id: project_id.to_string(),
                persona: d.persona.clone(),
                angle_title: d.angle_title.clone(),
                hook: d.hook.clone(),
                thumbnail_copy: d.thumbnail_copy.clone(),
            };
            tx.execute(
                "INSERT INTO angles (id, project_id, persona, angle_title, hook, thumbnail_copy)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    angle.id,
                    angle.project_id,
                    angle.persona,
                    angle.angle_title,
                    angle.hook,
                    angle.thumbnail_copy,
                ],
            )?;
            angles.push(angle);
        }
        tx.commit()?;
        Ok(angles)
    }

    pub fn get_angles(&self, project_id: &str) -> Result<Vec<Angle>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, persona, angle_title, hook, thumbnail_copy
             FROM angles WHERE project_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([project_id], |row| {
            Ok(Angle {
                id: row.get(0)?,
                project_id: row.get(1)?,
                persona: row.get(2)?,
                angle_title: row.get(3)?,
                hook: row.get(4)?,
                thumbnail_copy: row.get(5)?,
            })
        })?;
        let mut angles = Vec::new();
        for row in rows {
            angles.push(row?);
        }
        Ok(angles)
    }

    // ---- ctas ----

    pub fn insert_ctas(&self, project_id: &str, drafts: &[CtaDraft]) -> Result<Vec<Cta>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut ctas = Vec::new();
        for d in drafts {
            let cta = Cta {
                id: new_id(),
                project_id: project_id.to_string(),
                timing: d.timing,
                text: d.text.clone(),
                on_screen_text: d.on_screen_text.clone(),
                destination: d.destination.clone(),
            };
            tx.execute(
                "INSERT INTO ctas (id, project_id, timing, text, on_screen_text, destination)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    cta.id,
                    cta.project_id,
                    cta.timing.as_str(),
                    cta.text,
                    cta.on_screen_text,
                    cta.destination,
                ],
            )?;
            ctas.push(cta);
        }
        tx.commit()?;
        Ok(ctas)
    }

    pub fn get_ctas(&self, project_id: &str) -> Result<Vec<Cta>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, timing, text, on_screen_text, destination
             FROM ctas WHERE project_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([project_id], |row| {
            let timing: String = row.get(2)?;
            Ok(Cta {
                id: row.get(0)?,
                project_id: row.get(1)?,
                timing: CtaTiming::parse(&timing),
                text: row.get(3)?,
                on_screen_text: row.get(4)?,
                destination: row.get(5)?,
            })
        })?;
        let mut ctas = Vec::new();
        for row in rows {
            ctas.push(row?);
        }
        Ok(ctas)
    }

    // ---- seo ----

    pub fn upsert_seo(&self, project_id: &str, draft: &SeoDraft) -> Result<SeoMeta> {
        let seo = SeoMeta {
            id: new_id(),
            project_id: project_id.to_string(),
            title_a: draft.title_a.clone(),
            title_b: draft.title_b.clone(),
            description: draft.description.clone(),
            hashtags: draft.hashtags.clone(),
            chapters: draft.chapters.clone(),
        };
        let hashtags_json = serde_json::to_string(&seo.hashtags)?;
        let chapters_json = serde_json::to_string(&seo.chapters)?;
        self.conn.execute(
            "INSERT INTO seo (id, project_id, title_a, title_b, description, hashtags_json, chapters_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(project_id) DO UPDATE SET
                title_a = ?3, title_b = ?4, description = ?5, hashtags_json = ?6, chapters_json = ?7",
            rusqlite::params![
                seo.id,
                seo.project_id,
                seo.title_a,
                seo.title_b,
                seo.description,
                hashtags_json,
                chapters_json,
            ],
        )?;
        Ok(seo)
    }

    pub fn get_seo(&self, project_id: &str) -> Result<Option<SeoMeta>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, title_a, title_b, description, hashtags_json, chapters_json
             FROM seo WHERE project_id = ?1",
        )?;
        let raw = stmt
            .query_row([project_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .optional()?;

        match raw {
            None => Ok(None),
            Some((id, project_id, title_a, title_b, description, hashtags_json, chapters_json)) => {
                let hashtags: Vec<String> = serde_json::from_str(&hashtags_json)
                    .with_context(|| format!("Corrupt hashtags_json on seo {id}"))?;
                let chapters: Vec<Chapter> = serde_json::from_str(&chapters_json)
                    .with_context(|| format!("Corrupt chapters_json on seo {id}"))?;
                Ok(Some(SeoMeta {
                    id,
                    project_id,
                    title_a,
                    title_b,
                    description,
                    hashtags,
                    chapters,
                }))
            }
        }
    }

    // ---- asset hints ----

    pub fn upsert_asset_hints(
        &self,
        project_id: &str,
        draft: &AssetHintsDraft,
    ) -> Result<AssetHints> {
        let hints = AssetHints {
            id: new_id(),
            project_id: project_id.to_string(),
            broll_keywords: draft.broll_keywords.clone(),
            subtitle_cues: draft.subtitle_cues.clone(),
        };
        let broll_json = serde_json::to_string(&hints.broll_keywords)?;
        let cues_json = serde_json::to_string(&hints.subtitle_cues)?;
        self.conn.execute(
            "INSERT INTO asset_hints (id, project_id, broll_json, cues_json)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(project_id) DO UPDATE SET broll_json = ?3, cues_json = ?4",
            rusqlite::params![hints.id, hints.project_id, broll_json, cues_json],
        )?;
        Ok(hints)
    }

    pub fn get_asset_hints(&self, project_id: &str) -> Result<Option<AssetHints>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, broll_json, cues_json FROM asset_hints WHERE project_id = ?1",
        )?;
        let raw = stmt
            .query_row([project_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()?;

        match raw {
            None => Ok(None),
            Some((id, project_id, broll_json, cues_json)) => {
                let broll_keywords: Vec<String> = serde_json::from_str(&broll_json)
                    .with_context(|| format!("Corrupt broll_json on asset_hints {id}"))?;
                let subtitle_cues: Vec<SubtitleCue> = serde_json::from_str(&cues_json)
                    .with_context(|| format!("Corrupt cues_json on asset_hints {id}"))?;
                Ok(Some(AssetHints {
                    id,
                    project_id,
                    broll_keywords,
                    subtitle_cues,
                }))
            }
        }
    }

    // ---- shorts ----

    pub fn insert_shorts(&self, project_id: &str, drafts: &[ShortDraft]) -> Result<Vec<Short>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut shorts = Vec::new();
        for d in drafts {
            let short = Short {
                id: new_id(),
                project_id: project_id.to_string(),
                duration_sec: d.duration_sec,
                hook: d.hook.clone(),
                captions: d.captions.clone(),
                overlay_texts: d.overlay_texts.clone(),
            };
            let captions_json = serde_json::to_string(&short.captions)?;
            let overlays_json = serde_json::to_string(&short.overlay_texts)?;
            tx.execute(
                "INSERT INTO shorts (id, project_id, duration_sec, hook, captions_json, overlays_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    short.id,
                    short.project_id,
                    short.duration_sec,
                    short.hook,
                    captions_json,
                    overlays_json,
                ],
            )?;
            shorts.push(short);
        }
        tx.commit()?;
        Ok(shorts)
    }

    pub fn get_shorts(&self, project_id: &str) -> Result<Vec<Short>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, duration_sec, hook, captions_json, overlays_json
             FROM shorts WHERE project_id = ?1 ORDER BY rowid",
        )?;
        let raw_rows = stmt.query_map([project_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut shorts = Vec::new();
        for raw in raw_rows {
            let (id, project_id, duration_sec, hook, captions_json, overlays_json) = raw?;
            let captions: Vec<Caption> = serde_json::from_str(&captions_json)
                .with_context(|| format!("Corrupt captions_json on short {id}"))?;
            let overlay_texts: Vec<String> = serde_json::from_str(&overlays_json)
                .with_context(|| format!("Corrupt overlays_json on short {id}"))?;
            shorts.push(Short {
                id,
                project_id,
                duration_sec,
                hook,
                captions,
                overlay_texts,
            });
        }
        Ok(shorts)
    }

    // ---- products ----

    pub fn insert_product(
        &self,
        project_id: &str,
        name: &str,
        description: &str,
        url: &str,
        button_text: &str,
    ) -> Result<Product> {
        let product = Product {
            id: new_id(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            button_text: button_text.to_string(),
            utm: format!("utm_source=vidplan&utm_medium=short&utm_campaign={project_id}"),
        };
        self.conn.execute(
            "INSERT INTO products (id, project_id, name, description, url, button_text, utm)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                product.id,
                product.project_id,
                product.name,
                product.description,
                product.url,
                product.button_text,
                product.utm,
            ],
        )?;
        Ok(product)
    }

    pub fn get_products(&self, project_id: &str) -> Result<Vec<Product>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, name, description, url, button_text, utm
             FROM products WHERE project_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([project_id], |row| {
            Ok(Product {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                url: row.get(4)?,
                button_text: row.get(5)?,
                utm: row.get(6)?,
            })
        })?;
        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }

    // ---- trend queries ----

    /// Fetch a cached trend query by composite key. TTL is the caller's concern.
    pub fn get_trend_query(
        &self,
        keyword: &str,
        locale: &str,
        range: &str,
    ) -> Result<Option<TrendQueryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, keyword, locale, range, result_json, created_at
             FROM trend_queries WHERE keyword = ?1 AND locale = ?2 AND range = ?3",
        )?;
        let raw = stmt
            .query_row(rusqlite::params![keyword, locale, range], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .optional()?;

        match raw {
            None => Ok(None),
            Some((id, keyword, locale, range, result_json, created_at)) => {
                let result: TrendResult = serde_json::from_str(&result_json)
                    .with_context(|| format!("Corrupt result_json on trend query {id}"))?;
                Ok(Some(TrendQueryRow {
                    id,
                    keyword,
                    locale,
                    range,
                    result,
                    created_at,
                }))
            }
        }
    }

    /// Store a trend result, replacing any previous entry for the same key.
    pub fn put_trend_query(
        &self,
        keyword: &str,
        locale: &str,
        range: &str,
        result: &TrendResult,
        created_at: &str,
    ) -> Result<TrendQueryRow> {
        let row = TrendQueryRow {
            id: new_id(),
            keyword: keyword.to_string(),
            locale: locale.to_string(),
            range: range.to_string(),
            result: result.clone(),
            created_at: created_at.to_string(),
        };
        let result_json = serde_json::to_string(&row.result)?;
        self.conn.execute(
            "INSERT INTO trend_queries (id, keyword, locale, range, result_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(keyword, locale, range) DO UPDATE SET
                result_json = ?5, created_at = ?6",
            rusqlite::params![row.id, row.keyword, row.locale, row.range, result_json, row.created_at],
        )?;
        Ok(row)
    }

    // ---- stats ----

    /// Get database statistics.
    pub fn stats(&self) -> Result<DbStats> {
        let count = |table: &str| -> Result<i64> {
            Ok(self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
        };

        let projects = count("projects")?;
        let scripts = count("scripts")?;
        let angles = count("angles")?;
        let ctas = count("ctas")?;
        let shorts = count("shorts")?;
        let products = count("products")?;
        let trend_queries = count("trend_queries")?;

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM projects GROUP BY status ORDER BY status")?;
        let status_rows = stmt.query_map([], |row| {
            Ok(StatusCount {
                status: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        let mut statuses = Vec::new();
        for row in status_rows {
            statuses.push(row?);
        }

        let db_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(DbStats {
            projects,
            scripts,
            angles,
            ctas,
            shorts,
            products,
            trend_queries,
            statuses,
            db_size_bytes,
        })
    }
}

fn map_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    let tone: String = row.get(3)?;
    let length: String = row.get(4)?;
    let status: String = row.get(5)?;
    Ok(Project {
        id: row.get(0)?,
        topic: row.get(1)?,
        audience: row.get(2)?,
        tone: Tone::parse(&tone),
        length: Length::parse(&length),
        status: Status::parse(&status).unwrap_or(Status::Draft),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::templates::ScriptDraft;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn project_round_trip() {
        let (_dir, db) = test_db();
        let p = db
            .create_project("rust tips", "beginners", Tone::Casual, Length::Short)
            .unwrap();
        let fetched = db.get_project(&p.id).unwrap().unwrap();
        assert_eq!(fetched.topic, "rust tips");
        assert_eq!(fetched.tone, Tone::Casual);
        assert_eq!(fetched.status, Status::Draft);
    }

    #[test]
    fn delete_cascades_to_children() {
        let (_dir, db) = test_db();
        let p = db
            .create_project("topic", "", Tone::Professional, Length::Medium)
            .unwrap();
        let draft = ScriptDraft {
            opening: "open".into(),
            body: vec![BodyStep { t: 0.0, line: "a".into() }],
            ending: "end".into(),
            full_markdown: "md".into(),
            word_count: 3,
        };
        db.upsert_script(&p.id, &draft, 1).unwrap();
        assert!(db.get_script(&p.id).unwrap().is_some());

        assert!(db.delete_project(&p.id).unwrap());
        assert!(db.get_project(&p.id).unwrap().is_none());
        assert!(db.get_script(&p.id).unwrap().is_none());
    }

    #[test]
    fn script_upsert_replaces_previous_version() {
        let (_dir, db) = test_db();
        let p = db
            .create_project("topic", "", Tone::Professional, Length::Medium)
            .unwrap();
        let mut draft = ScriptDraft {
            opening: "v1".into(),
            body: vec![],
            ending: "end".into(),
            full_markdown: "md".into(),
            word_count: 2,
        };
        db.upsert_script(&p.id, &draft, 1).unwrap();
        draft.opening = "v2".into();
        db.upsert_script(&p.id, &draft, 2).unwrap();

        let script = db.get_script(&p.id).unwrap().unwrap();
        assert_eq!(script.opening, "v2");
        assert_eq!(script.version, 2);
    }

    #[test]
    fn trend_query_upsert_is_last_write_wins() {
        let (_dir, db) = test_db();
        let mut rng = crate::generate::random::SeededRandom::new(7);
        let mut result = crate::trends::synthetic_trend("ai", &mut rng);
        db.put_trend_query("ai", "KR", "30d", &result, "2026-01-01T00:00:00Z")
            .unwrap();
        result.avg_volume = 99.0;
        db.put_trend_query("ai", "KR", "30d", &result, "2026-01-02T00:00:00Z")
            .unwrap();

        let row = db.get_trend_query("ai", "KR", "30d").unwrap().unwrap();
        assert_eq!(row.created_at, "2026-01-02T00:00:00Z");
        assert_eq!(row.result.avg_volume, 99.0);

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM trend_queries", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn search_matches_topic_substring() {
        let (_dir, db) = test_db();
        db.create_project("cooking pasta", "", Tone::Casual, Length::Short)
            .unwrap();
        db.create_project("rust async", "", Tone::Educational, Length::Long)
            .unwrap();

        let hits = db.search_projects("pasta", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].topic, "cooking pasta");
    }
}
