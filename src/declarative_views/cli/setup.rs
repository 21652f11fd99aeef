use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.0" for releases, "0.3.0@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "dviews", bin_name = "dviews", version = get_version())]
#[command(
    about = "Inspect the element declarations embedded in HTML templates",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding declarative-views.json
    #[arg(long, global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Log cache activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the registered data attributes
    Attrs,

    /// Print the cache entries for one or more templates as JSON
    Inspect {
        /// HTML file holding the templates
        file: PathBuf,

        /// Selectors or raw markup
        #[arg(required = true, num_args = 1..)]
        templates: Vec<String>,
    },

    /// Print the opening tag of the element a view would get
    Element {
        /// HTML file holding the template
        file: PathBuf,

        /// Selector or raw markup
        template: String,

        #[command(flatten)]
        overrides: ElOverrides,
    },

    /// Compile and render a template
    Render {
        /// HTML file holding the template
        file: PathBuf,

        /// Selector or raw markup
        template: String,

        /// JSON object passed to the template
        #[arg(long, default_value = "{}")]
        data: String,

        #[command(flatten)]
        overrides: ElOverrides,
    },
}

/// View options that take precedence over the template.
#[derive(clap::Args, Debug, Default)]
pub struct ElOverrides {
    #[arg(long)]
    pub tag_name: Option<String>,

    #[arg(long)]
    pub class_name: Option<String>,

    #[arg(long)]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_inspect_with_many_templates() {
        let cli = Cli::try_parse_from(["dviews", "inspect", "page.html", "#a", "<p></p>"]).unwrap();
        match cli.command {
            Commands::Inspect { file, templates } => {
                assert_eq!(file, PathBuf::from("page.html"));
                assert_eq!(templates, vec!["#a", "<p></p>"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_element_overrides() {
        let cli = Cli::try_parse_from([
            "dviews",
            "-v",
            "element",
            "page.html",
            "#a",
            "--class-name",
            "wide",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Element { overrides, .. } => {
                assert_eq!(overrides.class_name.as_deref(), Some("wide"));
                assert!(overrides.tag_name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn inspect_requires_a_template() {
        assert!(Cli::try_parse_from(["dviews", "inspect", "page.html"]).is_err());
    }
}
