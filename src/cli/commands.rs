//! Command dispatch: one handler per subcommand.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, IoResultExt, JsonResultExt};
use crate::cli::args::{AttributeArgs, Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{BlockAttributes, TermForest};
use crate::infrastructure::di::AppContext;
use crate::infrastructure::{http, InfraError};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = project_dir(cli)?;
    let settings = Settings::load(Some(&project_dir)).map_err(InfraError::from)?;
    debug!(?project_dir, store = %settings.store_path.display(), "settings loaded");

    match &cli.command {
        Some(Commands::Render { attrs }) => cmd_render(settings, attrs),
        Some(Commands::Links { attrs }) => cmd_links(settings, attrs),
        Some(Commands::Tree {
            taxonomy,
            max_depth,
            flat,
        }) => cmd_tree(settings, taxonomy, *max_depth, *flat),
        Some(Commands::Sync { document, check }) => cmd_sync(settings, document, *check),
        Some(Commands::Navigation { document }) => cmd_navigation(settings, document),
        Some(Commands::Serve { bind }) => cmd_serve(settings, bind.as_deref()),
        Some(Commands::Config { command }) => cmd_config(&settings, &project_dir, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => {
            let mut cmd = Cli::command();
            cmd.print_help().map_err(|e| InfraError::io("print help", e))?;
            Ok(())
        }
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "project directory not found: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e).into()),
    }
}

fn context(settings: Settings) -> CliResult<AppContext> {
    Ok(AppContext::new(settings)?)
}

/// Merge `--attrs` file and flags into block attributes.
pub fn resolve_attributes(
    args: &AttributeArgs,
    defaults: &BlockAttributes,
) -> CliResult<BlockAttributes> {
    let mut attrs = match &args.attrs {
        Some(path) => read_attrs_file(path)?,
        None => Map::new(),
    };

    let mut set = |key: &str, value: Value| {
        attrs.insert(key.to_string(), value);
    };
    if let Some(v) = &args.taxonomy {
        set("taxonomy", json!(v));
    }
    if let Some(v) = &args.display_style {
        set("displayStyle", json!(v));
    }
    if let Some(v) = &args.order_by {
        set("orderBy", json!(v));
    }
    if let Some(v) = &args.order {
        set("order", json!(v));
    }
    if args.include_empty {
        set("includeEmpty", json!(true));
    }
    if args.show_count {
        set("showCount", json!(true));
    }
    if args.flat {
        set("showHierarchy", json!(false));
    }
    if let Some(v) = args.max_depth {
        set("maxDepth", json!(v));
    }
    if let Some(v) = &args.dropdown_title {
        set("dropdownTitle", json!(v));
    }
    if let Some(v) = &args.dropdown_link {
        set("dropdownLink", json!(v));
    }
    if args.no_dropdown_button {
        set("showDropdownButton", json!(false));
    }
    if args.filter {
        set("enableFilter", json!(true));
    }

    Ok(BlockAttributes::from_attrs(&attrs, defaults))
}

fn read_attrs_file(path: &Path) -> CliResult<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_path_context("read attributes", path)
        .map_err(InfraError::from)?;
    let value: Value = serde_json::from_str(&content)
        .with_json_context("parse attributes", path)
        .map_err(InfraError::from)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::InvalidArgs(format!(
            "attributes must be a JSON object: {}",
            path.display()
        ))),
    }
}

#[instrument(skip(settings))]
fn cmd_render(settings: Settings, args: &AttributeArgs) -> CliResult<()> {
    let attrs = resolve_attributes(args, &BlockAttributes::default())?;
    let ctx = context(settings)?;
    let html = ctx.term_list().try_render(&attrs).map_err(InfraError::from)?;
    if html.is_empty() {
        output::warning(&format!("no terms to render for taxonomy '{}'", attrs.taxonomy));
    } else {
        output::info(&html);
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_links(settings: Settings, args: &AttributeArgs) -> CliResult<()> {
    let attrs = resolve_attributes(args, &BlockAttributes::navigation_defaults())?;
    let ctx = context(settings)?;
    let items = ctx.navigation().build_links(&attrs).map_err(InfraError::from)?;
    let json = serde_json::to_string_pretty(&items).map_err(|e| {
        InfraError::from(ApplicationError::OperationFailed {
            context: "serialize navigation items".into(),
            source: Box::new(e),
        })
    })?;
    output::info(&json);
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_tree(settings: Settings, taxonomy: &str, max_depth: u32, flat: bool) -> CliResult<()> {
    let attrs = BlockAttributes {
        taxonomy: taxonomy.to_string(),
        show_hierarchy: !flat,
        max_depth,
        ..BlockAttributes::navigation_defaults()
    };
    let ctx = context(settings)?;
    let forest: TermForest = ctx.term_list().forest(&attrs).map_err(InfraError::from)?;
    if forest.is_empty() {
        output::warning(&format!("no terms in taxonomy '{taxonomy}'"));
        return Ok(());
    }
    output::info(&forest.to_tree_string(taxonomy));
    output::detail(&format!("{} terms, height {}", forest.len(), forest.height()));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_sync(settings: Settings, document: &Path, check: bool) -> CliResult<()> {
    let ctx = context(settings)?;
    let report = ctx
        .navigation()
        .sync_file(document, check)
        .map_err(InfraError::from)?;

    match (report.changed, check) {
        (false, _) => output::success(&format!(
            "{} up to date ({} containers)",
            document.display(),
            report.containers
        )),
        (true, false) => output::success(&format!(
            "{} synchronized ({} containers)",
            document.display(),
            report.containers
        )),
        (true, true) => {
            output::failure(&format!("{} is out of date", document.display()));
            return Err(CliError::CheckFailed(document.display().to_string()));
        }
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_navigation(settings: Settings, document: &Path) -> CliResult<()> {
    let ctx = context(settings)?;
    let navigation = ctx.navigation();
    let blocks = navigation.read_document(document).map_err(InfraError::from)?;
    let rendered = navigation.render_document_navigation(&blocks);
    if rendered.is_empty() {
        output::warning(&format!(
            "no taxonomy navigation blocks in {}",
            document.display()
        ));
    }
    for html in rendered {
        output::info(&html);
    }
    Ok(())
}

fn cmd_serve(settings: Settings, bind: Option<&str>) -> CliResult<()> {
    let bind = bind.map(str::to_string).unwrap_or_else(|| settings.server.bind.clone());
    if settings.server.editor_tokens.is_empty() {
        output::warning("no server.editor_tokens configured, every request will be rejected");
    }
    let ctx = Arc::new(context(settings)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| InfraError::io("start async runtime", e))?;
    runtime.block_on(http::serve(ctx, &bind))?;
    Ok(())
}

fn cmd_config(settings: &Settings, project_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let toml = settings.to_toml().map_err(InfraError::from)?;
            output::info(&toml);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            output::header("Config paths");
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", &"(no config directory)"),
            }
            output::action("local", &local_config_path(project_dir).display());
            output::action("store", &settings.store_path.display());
        }
    }
    Ok(())
}
