//! # CLI Layer
//!
//! One client of the library. This is the only place that knows about
//! stdout/stderr, exit codes and the config directory.
//!
//! - `run()`: parses arguments and dispatches (called by `main.rs`)
//! - `init_context()`: loads the config and builds the service for a file
//! - `handle_*()`: per-command handlers

use super::print::{print_attributes, print_element, print_json, print_rendered, print_warning};
use super::setup::{Cli, Commands, ElOverrides};
use clap::Parser;
use declarative_views::api::DeclarativeViews;
use declarative_views::compiler::stencil_compiler;
use declarative_views::config::DeclarativeConfig;
use declarative_views::document::html::HtmlDocument;
use declarative_views::error::{DeclarativeError, Result};
use declarative_views::view::{View, ViewOptions};
use directories::ProjectDirs;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use stencil::Stencil;
use tracing::debug;
use tracing_subscriber::EnvFilter;

struct AppContext {
    views: DeclarativeViews<HtmlDocument>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Attrs => handle_attrs(&config),
        Commands::Inspect { file, templates } => {
            let mut ctx = init_context(&config, &file)?;
            handle_inspect(&mut ctx, &templates)
        }
        Commands::Element {
            file,
            template,
            overrides,
        } => {
            let mut ctx = init_context(&config, &file)?;
            handle_element(&mut ctx, &template, overrides)
        }
        Commands::Render {
            file,
            template,
            data,
            overrides,
        } => {
            let mut ctx = init_context(&config, &file)?;
            handle_render(&mut ctx, &template, &data, overrides)
        }
    }
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("declarative_views=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn config_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(dir.to_path_buf());
    }
    ProjectDirs::from("dev", "declarative-views", "dviews").map(|d| d.config_dir().to_path_buf())
}

fn load_config(explicit: Option<&Path>) -> Result<DeclarativeConfig> {
    match config_dir(explicit) {
        Some(dir) => DeclarativeConfig::load(dir),
        None => {
            debug!("no config directory available, using defaults");
            Ok(DeclarativeConfig::default())
        }
    }
}

fn init_context(config: &DeclarativeConfig, file: &Path) -> Result<AppContext> {
    let document = HtmlDocument::load(file)?;
    let mut views = DeclarativeViews::new(document);
    config.apply(&mut views)?;
    Ok(AppContext { views })
}

fn view_options(template: &str, overrides: ElOverrides) -> ViewOptions {
    ViewOptions {
        template: Some(template.into()),
        tag_name: overrides.tag_name,
        class_name: overrides.class_name,
        id: overrides.id,
        ..ViewOptions::default()
    }
}

fn handle_attrs(config: &DeclarativeConfig) -> Result<()> {
    let mut views = DeclarativeViews::new(HtmlDocument::parse(""));
    config.apply(&mut views)?;
    print_attributes(views.registry().specs());
    Ok(())
}

fn handle_inspect(ctx: &mut AppContext, templates: &[String]) -> Result<()> {
    let mut report = Vec::with_capacity(templates.len());
    for identifier in templates {
        let entry = ctx
            .views
            .get_cached_template(identifier, None)?
            .map(|entry| serde_json::to_value(&*entry))
            .transpose()?;
        report.push(json!({
            "identifier": identifier,
            "entry": entry,
        }));
    }
    print_json(&Value::Array(report))
}

fn handle_element(ctx: &mut AppContext, template: &str, overrides: ElOverrides) -> Result<()> {
    let view = ctx.views.create_view(view_options(template, overrides))?;
    warn_if_unresolved(ctx, template)?;
    if let Some(el) = view.el() {
        print_element(el);
    }
    Ok(())
}

fn handle_render(
    ctx: &mut AppContext,
    template: &str,
    data: &str,
    overrides: ElOverrides,
) -> Result<()> {
    let data: Value = serde_json::from_str(data)?;
    if !ctx.views.has_compiler() {
        ctx.views.set_boxed_compiler(stencil_compiler());
    }

    let mut view = ctx.views.create_view(view_options(template, overrides))?;
    let body = render_view(ctx, &mut view, template, &data)?;
    if let Some(el) = view.el() {
        print_rendered(el, &body);
    }
    Ok(())
}

fn render_view(ctx: &mut AppContext, view: &mut View, template: &str, data: &Value) -> Result<String> {
    let Some(template_data) = ctx.views.view_template_data(view)? else {
        return Err(DeclarativeError::template(format!(
            "No template found for \"{}\"",
            template
        )));
    };
    let Some(stencil) = template_data.compiled_as::<Stencil>() else {
        return Err(DeclarativeError::customization(
            "The configured compiler did not produce a renderable template",
        ));
    };
    stencil
        .render(data)
        .map_err(|e| DeclarativeError::Compiler {
            markup: template_data.html.clone(),
            source: Box::new(e),
        })
}

fn warn_if_unresolved(ctx: &mut AppContext, template: &str) -> Result<()> {
    if ctx.views.get_cached_template(template, None)?.is_none() {
        print_warning(&format!(
            "No template found for \"{}\", using the default element",
            template
        ));
    }
    Ok(())
}
