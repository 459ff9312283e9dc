use anyhow::Result;
use rusqlite::Connection;

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Version tracking
        CREATE TABLE IF NOT EXISTS vidplan_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Core tables
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            topic TEXT NOT NULL,
            audience TEXT NOT NULL DEFAULT '',
            tone TEXT NOT NULL DEFAULT 'professional',
            length TEXT NOT NULL DEFAULT 'medium',
            status TEXT NOT NULL DEFAULT 'Draft',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS scripts (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            opening TEXT NOT NULL DEFAULT '',
            body_json TEXT NOT NULL DEFAULT '[]',
            ending TEXT NOT NULL DEFAULT '',
            full_markdown TEXT NOT NULL DEFAULT '',
            word_count INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            UNIQUE(project_id)
        );

        CREATE TABLE IF NOT EXISTS angles (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            persona TEXT NOT NULL,
            angle_title TEXT NOT NULL DEFAULT '',
            hook TEXT NOT NULL DEFAULT '',
            thumbnail_copy TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS ctas (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            timing TEXT NOT NULL DEFAULT 'mid',
            text TEXT NOT NULL DEFAULT '',
            on_screen_text TEXT NOT NULL DEFAULT '',
            destination TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS seo (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            title_a TEXT NOT NULL DEFAULT '',
            title_b TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            hashtags_json TEXT NOT NULL DEFAULT '[]',
            chapters_json TEXT NOT NULL DEFAULT '[]',
            UNIQUE(project_id)
        );

        CREATE TABLE IF NOT EXISTS asset_hints (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            broll_json TEXT NOT NULL DEFAULT '[]',
            cues_json TEXT NOT NULL DEFAULT '[]',
            UNIQUE(project_id)
        );

        CREATE TABLE IF NOT EXISTS shorts (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            duration_sec INTEGER NOT NULL,
            hook TEXT NOT NULL DEFAULT '',
            captions_json TEXT NOT NULL DEFAULT '[]',
            overlays_json TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            url TEXT NOT NULL,
            button_text TEXT NOT NULL DEFAULT 'Learn More',
            utm TEXT NOT NULL DEFAULT ''
        );

        -- Trend cache: one row per (keyword, locale, range), last write wins
        CREATE TABLE IF NOT EXISTS trend_queries (
            id TEXT PRIMARY KEY,
            keyword TEXT NOT NULL,
            locale TEXT NOT NULL,
            range TEXT NOT NULL,
            result_json TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            UNIQUE(keyword, locale, range)
        );

        -- Indexes for common filters
        CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status);
        CREATE INDEX IF NOT EXISTS idx_projects_created ON projects(created_at);
        CREATE INDEX IF NOT EXISTS idx_scripts_project ON scripts(project_id);
        CREATE INDEX IF NOT EXISTS idx_angles_project ON angles(project_id);
        CREATE INDEX IF NOT EXISTS idx_ctas_project ON ctas(project_id);
        CREATE INDEX IF NOT EXISTS idx_shorts_project ON shorts(project_id);
        CREATE INDEX IF NOT EXISTS idx_products_project ON products(project_id);
        CREATE INDEX IF NOT EXISTS idx_trend_keyword ON trend_queries(keyword);
        ",
    )?;

    // Set schema version
    conn.execute(
        "INSERT OR REPLACE INTO vidplan_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
