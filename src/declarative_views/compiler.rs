//! Optional template compilation.
//!
//! A compiler turns a template's markup into whatever the host renders with.
//! The result is opaque to the cache and stored as returned.

use crate::document::TemplateNode;
use crate::error::{BoxError, DeclarativeError, Result};
use std::any::Any;
use std::rc::Rc;
use stencil::Stencil;

/// A compiled template, as returned by the configured compiler.
pub type Compiled = Rc<dyn Any>;

pub type CompilerFn = Box<dyn Fn(&str, &TemplateNode) -> std::result::Result<Compiled, BoxError>>;

/// Runs `compiler` on `html`, if one is configured.
///
/// # Errors
///
/// Any failure is wrapped as [`DeclarativeError::Compiler`], carrying the
/// markup and the original error.
pub fn try_compile(
    compiler: Option<&CompilerFn>,
    html: &str,
    node: &TemplateNode,
) -> Result<Option<Compiled>> {
    let Some(compiler) = compiler else {
        return Ok(None);
    };
    compiler(html, node)
        .map(Some)
        .map_err(|source| DeclarativeError::Compiler {
            markup: html.to_string(),
            source,
        })
}

/// A compiler producing [`Stencil`]s.
pub fn stencil_compiler() -> CompilerFn {
    Box::new(|html: &str, _node: &TemplateNode| {
        let stencil = Stencil::compile(html)?;
        Ok(Rc::new(stencil) as Compiled)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn no_compiler_returns_none() {
        let node = TemplateNode::template("<p></p>");
        assert!(try_compile(None, "<p></p>", &node).unwrap().is_none());
    }

    #[test]
    fn return_value_is_stored_as_is() {
        let compiler: CompilerFn = Box::new(|html: &str, _: &TemplateNode| Ok(Rc::new(html.len()) as Compiled));
        let node = TemplateNode::template("abc");
        let compiled = try_compile(Some(&compiler), "abc", &node).unwrap().unwrap();
        assert_eq!(compiled.downcast_ref::<usize>(), Some(&3));
    }

    #[test]
    fn failures_are_wrapped() {
        let compiler: CompilerFn = Box::new(|_: &str, _: &TemplateNode| Err("boom".into()));
        let node = TemplateNode::template("<p>");
        let err = try_compile(Some(&compiler), "<p>", &node).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compiler);
        assert!(err
            .to_string()
            .contains("An error occurred while compiling the template"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn stencil_compiler_renders() {
        let compiler = stencil_compiler();
        let node = TemplateNode::template("<b>{{ n }}</b>");
        let compiled = try_compile(Some(&compiler), "<b>{{ n }}</b>", &node)
            .unwrap()
            .unwrap();
        let stencil = compiled.downcast_ref::<Stencil>().unwrap();
        assert_eq!(
            stencil.render(&serde_json::json!({"n": 2})).unwrap(),
            "<b>2</b>"
        );
    }

    #[test]
    fn stencil_syntax_errors_become_compiler_errors() {
        let compiler = stencil_compiler();
        let node = TemplateNode::template("{{ oops");
        let err = try_compile(Some(&compiler), "{{ oops", &node).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compiler);
    }
}
