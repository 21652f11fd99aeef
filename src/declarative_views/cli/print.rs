use colored::Colorize;
use declarative_views::attributes::{AttributeKind, AttributeSpec};
use declarative_views::view::Element;
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: usize = 2;

pub(super) fn print_attributes(specs: &[AttributeSpec]) {
    let rows: Vec<(String, String, &str)> = specs
        .iter()
        .map(|spec| {
            let kind = match spec.kind {
                AttributeKind::Primitive => "primitive",
                AttributeKind::Json => "json",
            };
            (spec.markup_name(), spec.camel_name(), kind)
        })
        .collect();

    let name_width = column_width(rows.iter().map(|(name, _, _)| name.as_str()));
    let prop_width = column_width(rows.iter().map(|(_, prop, _)| prop.as_str()));

    for (name, prop, kind) in &rows {
        println!(
            "{}{}{}{}{}",
            name.bold(),
            pad(name, name_width),
            prop,
            pad(prop, prop_width),
            kind.dimmed()
        );
    }
}

pub(super) fn print_json(value: &serde_json::Value) -> declarative_views::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(super) fn print_element(el: &Element) {
    println!("{}", el.opening_tag());
}

pub(super) fn print_rendered(el: &Element, body: &str) {
    println!("{}{}</{}>", el.opening_tag(), body, el.tag_name);
}

pub(super) fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

fn column_width<'a>(cells: impl Iterator<Item = &'a str>) -> usize {
    cells.map(UnicodeWidthStr::width).max().unwrap_or(0) + COLUMN_GAP
}

fn pad(cell: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(cell.width()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_fills_to_column() {
        assert_eq!(pad("ab", 5), "   ");
        assert_eq!(pad("abcdef", 5), "");
    }

    #[test]
    fn column_width_counts_display_width() {
        assert_eq!(column_width(["a", "ééé", "ab"].into_iter()), 3 + COLUMN_GAP);
    }
}
