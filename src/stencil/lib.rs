//! # Stencil - Compiled HTML Templates
//!
//! A small wrapper around [minijinja](https://docs.rs/minijinja) that turns a
//! piece of template markup into a reusable, pre-parsed [`Stencil`].
//!
//! ## The Problem
//!
//! A template cache wants to parse markup exactly once and hand out something
//! callable to every consumer. minijinja's `Template` borrows its
//! `Environment`, which makes it awkward to store next to the markup it came
//! from.
//!
//! ## The Solution
//!
//! A [`Stencil`] owns its environment. Compiling validates the syntax up
//! front, so a broken template is reported when it is loaded, not when it is
//! first rendered.
//!
//! ## Quick Example
//!
//! ```rust
//! use serde::Serialize;
//! use stencil::Stencil;
//!
//! #[derive(Serialize)]
//! struct Data {
//!     name: String,
//! }
//!
//! let stencil = Stencil::compile("<h1>{{ name }}</h1>").unwrap();
//! let html = stencil.render(&Data { name: "Inbox".into() }).unwrap();
//! assert_eq!(html, "<h1>Inbox</h1>");
//! ```
//!
//! ## Escaping
//!
//! Output is HTML-escaped by default. Use [`Stencil::compile_with`] with
//! [`Escape::None`] for markup that should be emitted verbatim.

use minijinja::{AutoEscape, Environment, Error};
use serde::Serialize;

pub use minijinja::Error as StencilError;

/// Name under which the single template lives inside a stencil's environment.
const TEMPLATE_NAME: &str = "_stencil";

/// Escaping applied to interpolated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escape {
    /// Escape `<`, `>`, `&`, and quotes.
    #[default]
    Html,
    /// Emit values exactly as given.
    None,
}

/// A template compiled once and rendered on demand.
pub struct Stencil {
    env: Environment<'static>,
    source: String,
}

impl std::fmt::Debug for Stencil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stencil")
            .field("source", &self.source)
            .finish()
    }
}

impl Stencil {
    /// Compiles markup with HTML escaping.
    ///
    /// # Errors
    ///
    /// Returns an error if the template syntax is invalid.
    pub fn compile(source: &str) -> Result<Self, Error> {
        Self::compile_with(source, Escape::Html)
    }

    /// Compiles markup with an explicit escaping mode.
    pub fn compile_with(source: &str, escape: Escape) -> Result<Self, Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(move |_| match escape {
            Escape::Html => AutoEscape::Html,
            Escape::None => AutoEscape::None,
        });
        env.add_template_owned(TEMPLATE_NAME.to_string(), source.to_string())?;
        Ok(Self {
            env,
            source: source.to_string(),
        })
    }

    /// Renders the template with the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails (e.g. calling an undefined filter).
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String, Error> {
        let tmpl = self.env.get_template(TEMPLATE_NAME)?;
        tmpl.render(data)
    }

    /// The markup this stencil was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct SimpleData {
        message: String,
    }

    #[derive(Serialize)]
    struct ListData {
        items: Vec<String>,
    }

    #[test]
    fn test_render_simple() {
        let stencil = Stencil::compile("<p>{{ message }}</p>").unwrap();
        let output = stencil
            .render(&SimpleData {
                message: "hi".into(),
            })
            .unwrap();
        assert_eq!(output, "<p>hi</p>");
    }

    #[test]
    fn test_render_escapes_html_by_default() {
        let stencil = Stencil::compile("{{ message }}").unwrap();
        let output = stencil
            .render(&SimpleData {
                message: "<b>".into(),
            })
            .unwrap();
        assert_eq!(output, "&lt;b&gt;");
    }

    #[test]
    fn test_render_without_escaping() {
        let stencil = Stencil::compile_with("{{ message }}", Escape::None).unwrap();
        let output = stencil
            .render(&SimpleData {
                message: "<b>".into(),
            })
            .unwrap();
        assert_eq!(output, "<b>");
    }

    #[test]
    fn test_render_loop() {
        let stencil =
            Stencil::compile("<ul>{% for item in items %}<li>{{ item }}</li>{% endfor %}</ul>")
                .unwrap();
        let output = stencil
            .render(&ListData {
                items: vec!["one".into(), "two".into()],
            })
            .unwrap();
        assert_eq!(output, "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn test_render_twice_reuses_compiled_template() {
        let stencil = Stencil::compile("{{ message }}!").unwrap();
        let a = stencil.render(&SimpleData { message: "a".into() }).unwrap();
        let b = stencil.render(&SimpleData { message: "b".into() }).unwrap();
        assert_eq!(a, "a!");
        assert_eq!(b, "b!");
    }

    #[test]
    fn test_syntax_error_fails_at_compile_time() {
        assert!(Stencil::compile("{{ unclosed").is_err());
    }

    #[test]
    fn test_empty_template() {
        let stencil = Stencil::compile("").unwrap();
        assert_eq!(stencil.render(&serde_json::json!({})).unwrap(), "");
    }

    #[test]
    fn test_source_is_kept_verbatim() {
        let markup = "  <p>{{ x }}</p>\n";
        let stencil = Stencil::compile(markup).unwrap();
        assert_eq!(stencil.source(), markup);
    }
}
