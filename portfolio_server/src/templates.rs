//! Tera templates, compiled into the binary.

use std::collections::HashMap;

use tera::{Tera, Value};

use crate::services::markdown::render_markdown;

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("project.html", include_str!("../templates/project.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("admin.html", include_str!("../templates/admin.html")),
    ("edit_project.html", include_str!("../templates/edit_project.html")),
];

/// Build the template set with the `markdown` filter registered.
pub fn build() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.register_filter("markdown", markdown_filter);
    tera.add_raw_templates(TEMPLATES)?;
    Ok(tera)
}

/// `{{ text | markdown | safe }}`. Null renders as an empty string.
fn markdown_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::String(s) => Ok(Value::String(render_markdown(s))),
        other => Err(tera::Error::msg(format!(
            "markdown filter expects a string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    #[test]
    fn all_templates_compile() {
        let tera = build().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        for (name, _) in TEMPLATES {
            assert!(names.contains(&name), "missing {name}");
        }
    }

    #[test]
    fn markdown_filter_renders_html_and_escapes_plain_fields() {
        let mut tera = build().unwrap();
        tera.add_raw_template(
            "probe.html",
            "{{ title }}|{{ body | markdown | safe }}|{{ missing | markdown }}",
        )
        .unwrap();

        let mut context = Context::new();
        context.insert("title", "<b>x</b>");
        context.insert("body", "**bold**");
        context.insert("missing", &Option::<String>::None);

        let html = tera.render("probe.html", &context).unwrap();
        assert_eq!(html, "&lt;b&gt;x&lt;&#x2F;b&gt;|<p><strong>bold</strong></p>\n|");
    }
}
