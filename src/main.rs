use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidplan::config::VidplanConfig;
use vidplan::db::models::{Length, Status, Tone};
use vidplan::db::{Database, ProjectFilters};
use vidplan::export::ExportFormat;
use vidplan::generate;
use vidplan::generate::random::ThreadRandom;
use vidplan::output::{json as json_out, table};
use vidplan::trends;

#[derive(Parser)]
#[command(name = "vidplan", version, about = "vidplan — YouTube content planning: script generation, asset packs, and trend scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to database file (default: ~/.vidplan/vidplan.db)
    #[arg(long, global = true, env = "VIDPLAN_DB")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project and generate its script, angles, CTAs, SEO and asset hints
    New {
        /// Video topic (up to 200 characters)
        topic: String,

        /// Target audience description
        #[arg(long, default_value = "")]
        audience: String,

        /// Tone: casual, professional, energetic, educational
        /// (default: professional, or [defaults] in config)
        #[arg(long)]
        tone: Option<String>,

        /// Length: short (3 steps), medium (5), long (7)
        /// (default: medium, or [defaults] in config)
        #[arg(long)]
        length: Option<String>,

        /// Draft the script with the AI backend (falls back to templates)
        #[arg(long)]
        ai: bool,
    },

    /// List projects
    List {
        /// Filter by status: Draft, InEditing, Ready, Published
        #[arg(long)]
        status: Option<String>,

        /// Filter by creation date start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter by creation date end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Sort by: created (default), updated, or topic
        #[arg(long, default_value = "created")]
        sort: String,

        /// Maximum results
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show a project with its full asset set
    Show {
        /// Project ID
        id: String,
    },

    /// Substring search over topics, audiences and script text
    Search {
        /// Search text
        query: String,

        /// Maximum results
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Edit a project's script (bumps the version)
    Revise {
        /// Project ID
        id: String,

        /// Replace the opening
        #[arg(long)]
        opening: Option<String>,

        /// Replace the ending
        #[arg(long)]
        ending: Option<String>,

        /// Replace a body step: N:new line text (repeatable, 1-based)
        #[arg(long = "step")]
        steps: Vec<String>,
    },

    /// Advance a project's status (forward only)
    Status {
        /// Project ID
        id: String,

        /// New status: Draft, InEditing, Ready, Published
        status: String,
    },

    /// Generate the three short-form variants for a project
    Shorts {
        /// Project ID
        id: String,
    },

    /// Attach a product placement to a project
    Product {
        /// Project ID
        id: String,

        /// Product name
        name: String,

        /// Product URL
        #[arg(long)]
        url: String,

        /// Product description
        #[arg(long, default_value = "")]
        description: String,

        /// Button label
        #[arg(long, default_value = "Learn more")]
        button_text: String,
    },

    /// Export a project's script to a file
    Export {
        /// Project ID
        id: String,

        /// Format: txt or srt
        #[arg(long, default_value = "txt")]
        format: String,

        /// Output path (default: <topic>.<ext> in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Analyze interest in a keyword and get a Go/Wait/Seasonal call
    Trend {
        /// Keyword to analyze
        keyword: String,

        /// Region code, e.g. KR or US (default: KR, or [defaults] in config)
        #[arg(long)]
        locale: Option<String>,

        /// Lookback window in days, e.g. 7d or 30d
        #[arg(long, default_value = "30d")]
        range: String,

        /// Skip the cache and fetch fresh data
        #[arg(long)]
        refresh: bool,
    },

    /// Rank trending keywords from videos or headlines
    Trending {
        /// Category: politics, economy, society, culture, tech, sports, gaming, education
        #[arg(long)]
        category: Option<String>,

        /// Source: youtube (default) or news
        #[arg(long, default_value = "youtube")]
        source: String,

        /// Region code (default: KR, or [defaults] in config)
        #[arg(long)]
        locale: Option<String>,
    },

    /// Copy a project and all its assets into a new Draft
    Duplicate {
        /// Project ID
        id: String,
    },

    /// Delete a project (assets cascade)
    Delete {
        /// Project ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Show database statistics
    Stats,

    /// Show version, schema and database info
    Info,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Create ~/.vidplan/config.toml with a commented template
    Init,
    /// Print the config with secrets redacted
    Show,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    // Config subcommands don't need the database.
    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Init => {
                let created = vidplan::config::init_config()?;
                let path = vidplan::config::config_path()?;
                if created {
                    println!("Created {}", path.display());
                } else {
                    println!("Config already exists: {}", path.display());
                }
            }
            ConfigAction::Show => {
                let config = VidplanConfig::load()?;
                println!("{}", config.display_redacted());
            }
        }
        return Ok(());
    }

    let db_path = cli
        .db
        .unwrap_or_else(|| Database::default_db_path().expect("Could not determine default DB path"));
    let db = Database::open(&db_path)?;
    let config = VidplanConfig::load()?;
    let mut rng = ThreadRandom;

    match cli.command {
        Commands::New {
            topic,
            audience,
            tone,
            length,
            ai,
        } => {
            let tone = Tone::parse(vidplan::config::resolve_setting(
                tone.as_deref(),
                config.default_tone(),
                "professional",
            ));
            let length = Length::parse(vidplan::config::resolve_setting(
                length.as_deref(),
                config.default_length(),
                "medium",
            ));
            let report = generate::build_project(
                &db, &config, &topic, &audience, tone, length, ai, &mut rng,
            )?;

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "project": report.project,
                    "script": report.script,
                    "ai_used": report.ai_used,
                    "ai_fallback": report.ai_fallback,
                    "tokens_used": report.tokens_used,
                }))?;
            } else {
                if report.ai_fallback {
                    eprintln!("Note: AI generation failed; used the template engine instead.");
                }
                println!(
                    "Created project \"{}\" ({} steps, {} words{})",
                    report.project.topic,
                    report.script.body.len(),
                    report.script.word_count,
                    if report.ai_used { ", AI draft" } else { "" },
                );
                println!("  id: {}", report.project.id);
            }
        }

        Commands::List {
            status,
            from,
            to,
            sort,
            limit,
        } => {
            if let Some(ref s) = status {
                if Status::parse(s).is_none() {
                    bail!("Unknown status: {}. Use: Draft, InEditing, Ready, Published", s);
                }
            }
            let filters = ProjectFilters {
                status,
                from_date: from,
                to_date: to,
            };
            let projects = db.list_projects(&filters, &sort, limit)?;
            if json_output {
                json_out::print_json(&projects)?;
            } else {
                table::print_project_list(&projects);
            }
        }

        Commands::Show { id } => {
            let project = db
                .get_project(&id)?
                .with_context(|| format!("Project not found: {id}"))?;
            let script = db.get_script(&id)?;
            let angles = db.get_angles(&id)?;
            let ctas = db.get_ctas(&id)?;
            let seo = db.get_seo(&id)?;
            let hints = db.get_asset_hints(&id)?;
            let shorts = db.get_shorts(&id)?;
            let products = db.get_products(&id)?;

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "project": project,
                    "script": script,
                    "angles": angles,
                    "ctas": ctas,
                    "seo": seo,
                    "asset_hints": hints,
                    "shorts": shorts,
                    "products": products,
                }))?;
            } else {
                table::print_project_detail(
                    &project,
                    script.as_ref(),
                    &angles,
                    &ctas,
                    seo.as_ref(),
                    hints.as_ref(),
                    &shorts,
                    &products,
                );
            }
        }

        Commands::Search { query, limit } => {
            let projects = db.search_projects(&query, limit)?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "query": query,
                    "total": projects.len(),
                    "projects": projects,
                }))?;
            } else {
                table::print_project_list(&projects);
            }
        }

        Commands::Revise {
            id,
            opening,
            ending,
            steps,
        } => {
            if opening.is_none() && ending.is_none() && steps.is_empty() {
                bail!("Nothing to revise. Pass --opening, --ending, or --step N:text");
            }
            let edits = generate::ScriptEdits {
                opening,
                ending,
                steps: steps
                    .iter()
                    .map(|s| parse_step_edit(s))
                    .collect::<Result<Vec<_>>>()?,
            };
            let script = generate::revise_script(&db, &id, &edits)?;
            if json_output {
                json_out::print_json(&script)?;
            } else {
                println!(
                    "Revised script for {} (now v{}, {} words)",
                    id, script.version, script.word_count
                );
            }
        }

        Commands::Status { id, status } => {
            let new_status = Status::parse(&status).with_context(|| {
                format!("Unknown status: {status}. Use: Draft, InEditing, Ready, Published")
            })?;
            let project = db
                .get_project(&id)?
                .with_context(|| format!("Project not found: {id}"))?;
            generate::advance_status(&db, &project, new_status)?;
            println!(
                "{}: {} -> {}",
                project.topic,
                project.status.as_str(),
                new_status.as_str()
            );
        }

        Commands::Shorts { id } => {
            let shorts = generate::build_shorts(&db, &id)?;
            if json_output {
                json_out::print_json(&shorts)?;
            } else {
                table::print_shorts(&shorts);
            }
        }

        Commands::Product {
            id,
            name,
            url,
            description,
            button_text,
        } => {
            if !db.project_exists(&id)? {
                bail!("Project not found: {id}");
            }
            let product = db.insert_product(&id, &name, &description, &url, &button_text)?;
            if json_output {
                json_out::print_json(&product)?;
            } else {
                println!("Added product \"{}\" to {}", product.name, id);
                println!("  tracking: {}", product.utm);
            }
        }

        Commands::Export { id, format, out } => {
            let format = ExportFormat::parse(&format)?;
            let path = vidplan::export::export_script(&db, &id, format, out.as_deref())?;
            println!("Exported to {}", path.display());
        }

        Commands::Trend {
            keyword,
            locale,
            range,
            refresh,
        } => {
            let locale =
                vidplan::config::resolve_setting(locale.as_deref(), config.default_locale(), "KR");
            let report = trends::run_trend_query(
                &db,
                &config,
                &keyword,
                locale,
                &range,
                refresh,
                &mut rng,
                &trends::cache::SystemClock,
            )?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "cached": report.cached,
                    "fallback": report.fallback,
                    "result": report.result,
                }))?;
            } else {
                if report.fallback {
                    eprintln!("Note: live source failed; showing synthetic data.");
                }
                table::print_trend_result(&report.result, report.cached);
            }
        }

        Commands::Trending {
            category,
            source,
            locale,
        } => {
            let locale =
                vidplan::config::resolve_setting(locale.as_deref(), config.default_locale(), "KR");
            let report =
                trends::run_trending(&config, category.as_deref(), &source, locale, &mut rng)?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "source": report.source,
                    "fallback": report.fallback,
                    "ranks": report.ranks,
                }))?;
            } else {
                if report.fallback {
                    eprintln!("Note: live source failed; showing synthetic data.");
                }
                table::print_keyword_ranks(
                    &report.ranks,
                    category.as_deref().unwrap_or("all"),
                    &report.source,
                );
            }
        }

        Commands::Duplicate { id } => {
            let copy = generate::duplicate_project(&db, &id)?;
            if json_output {
                json_out::print_json(&copy)?;
            } else {
                println!("Duplicated \"{}\"", copy.topic);
                println!("  id: {}", copy.id);
            }
        }

        Commands::Delete { id, force } => {
            let project = db
                .get_project(&id)?
                .with_context(|| format!("Project not found: {id}"))?;

            if !force {
                eprint!("Delete \"{}\" ({})? [y/N] ", project.topic, id);
                let mut answer = String::new();
                std::io::stdin().read_line(&mut answer)?;
                if !answer.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            db.delete_project(&id)?;
            println!("Deleted: {} ({})", project.topic, id);
        }

        Commands::Stats => {
            let stats = db.stats()?;
            if json_output {
                json_out::print_json(&stats)?;
            } else {
                table::print_stats(&stats);
            }
        }

        Commands::Info => {
            let stats = db.stats()?;
            let schema_ver: String = db
                .conn
                .query_row(
                    "SELECT value FROM vidplan_meta WHERE key = 'schema_version'",
                    [],
                    |r| r.get(0),
                )
                .unwrap_or_else(|_| "unknown".to_string());

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "schema_version": schema_ver,
                    "db_path": db.path.display().to_string(),
                    "db_size_bytes": stats.db_size_bytes,
                    "projects": stats.projects,
                    "scripts": stats.scripts,
                }))?;
            } else {
                println!("vidplan v{}", env!("CARGO_PKG_VERSION"));
                println!("  Schema:   v{schema_ver}");
                println!("  Database: {}", db.path.display());
                println!("  Size:     {}", format_bytes(stats.db_size_bytes));
                println!("  Projects: {}", stats.projects);
                println!("  Scripts:  {}", stats.scripts);
            }
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Parse a --step argument of the form "N:replacement text".
fn parse_step_edit(raw: &str) -> Result<(usize, String)> {
    let (index, line) = raw
        .split_once(':')
        .with_context(|| format!("Invalid --step value: {raw}. Use N:new line text"))?;
    let index: usize = index
        .trim()
        .parse()
        .with_context(|| format!("Invalid step number in --step value: {raw}"))?;
    Ok((index, line.trim().to_string()))
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
