//! Rendering option collections to `<option>`/`<optgroup>` markup.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::app::collection::{OptionCollection, OptionNode};
use crate::domain::model::OptionItem;
use crate::infra::escape::{Escaper, HtmlEscaper};

const OPTIONS_TEMPLATE_NAME: &str = "options";

static DEFAULT_RENDERER: Lazy<Result<Renderer, String>> =
    Lazy::new(|| Renderer::new(HtmlEscaper).map_err(|err| err.to_string()));

/// Shared renderer using HTML escaping, used by [`OptionCollection::to_markup`].
pub fn default_renderer() -> Result<&'static Renderer> {
    DEFAULT_RENDERER
        .as_ref()
        .map_err(|err| anyhow!("default renderer unavailable: {err}"))
}

/// Renders collections through the built-in template, escaping with the given escaper.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new<E: Escaper + 'static>(escaper: E) -> Result<Self> {
        Ok(Self {
            env: default_environment(Arc::new(escaper))?,
        })
    }

    pub fn render(&self, collection: &OptionCollection) -> Result<String> {
        let context = build_template_context(collection);
        self.env
            .get_template(OPTIONS_TEMPLATE_NAME)
            .map_err(|err| anyhow!("template '{OPTIONS_TEMPLATE_NAME}' not registered: {err}"))?
            .render(&context)
            .map_err(|err| anyhow!("failed to render options: {err}"))
    }
}

fn default_environment(escaper: Arc<dyn Escaper>) -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_filter("escape_text", move |text: String| escaper.escape(&text));
    env.add_template(OPTIONS_TEMPLATE_NAME, OPTIONS_TEMPLATE)
        .map_err(|err| anyhow!("failed to register options template: {err}"))?;
    Ok(env)
}

fn build_template_context(collection: &OptionCollection) -> TemplateContext {
    let nodes = collection
        .iter()
        .map(|node| match node {
            OptionNode::Single(item) => TemplateNode {
                group: false,
                label: String::new(),
                options: vec![template_option(collection, item)],
            },
            OptionNode::Group { label, options } => TemplateNode {
                group: true,
                label: label.clone(),
                options: options
                    .iter()
                    .map(|item| template_option(collection, item))
                    .collect(),
            },
        })
        .collect();

    TemplateContext { nodes }
}

fn template_option(collection: &OptionCollection, item: &OptionItem) -> TemplateOption {
    let mut attributes: IndexMap<String, String> = item
        .attributes
        .iter()
        .filter(|(name, _)| {
            let valid = is_attribute_name(name);
            if !valid {
                tracing::warn!(%name, value = %item.value, "dropping invalid attribute name");
            }
            valid
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    attributes.insert("value".into(), item.value.to_string());
    if collection.is_selected(&item.value) {
        attributes.insert("selected".into(), "selected".into());
    }

    TemplateOption {
        title: item.title.clone(),
        attributes: attributes
            .into_iter()
            .map(|(name, value)| TemplateAttribute { name, value })
            .collect(),
    }
}

/// Attribute names are emitted unescaped, so anything that could end the name is refused.
fn is_attribute_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(ends_attribute_name)
}

fn ends_attribute_name(ch: char) -> bool {
    ch.is_whitespace() || ch.is_control() || matches!(ch, '"' | '\'' | '<' | '>' | '/' | '=')
}

#[derive(Serialize)]
struct TemplateContext {
    nodes: Vec<TemplateNode>,
}

#[derive(Serialize)]
struct TemplateNode {
    group: bool,
    label: String,
    options: Vec<TemplateOption>,
}

#[derive(Serialize)]
struct TemplateOption {
    title: String,
    attributes: Vec<TemplateAttribute>,
}

#[derive(Serialize)]
struct TemplateAttribute {
    name: String,
    value: String,
}

const OPTIONS_TEMPLATE: &str = concat!(
    "{% for node in nodes %}",
    "{% if node.group %}<optgroup label=\"{{ node.label|escape_text }}\">{% endif %}",
    "{% for option in node.options %}",
    "<option",
    "{% for attr in option.attributes %}",
    " {{ attr.name }}=\"{{ attr.value|escape_text }}\"",
    "{% endfor %}>",
    "{{ option.title|escape_text }}</option>",
    "{% endfor %}",
    "{% if node.group %}</optgroup>{% endif %}",
    "{% endfor %}",
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::collection::OptionRow;
    use crate::domain::model::OptionValue;

    struct Upper;

    impl Escaper for Upper {
        fn escape(&self, text: &str) -> String {
            text.to_uppercase()
        }
    }

    fn item(value: &str, title: &str, attributes: &[(&str, &str)]) -> OptionItem {
        OptionItem {
            value: OptionValue::from(value),
            title: title.to_owned(),
            attributes: attributes
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect::<IndexMap<_, _>>(),
            optgroup: None,
        }
    }

    #[test]
    fn renders_flat_and_grouped_options() -> Result<()> {
        let collection = OptionCollection::from_rows(
            [
                OptionRow {
                    group: None,
                    item: item("a", "Alpha", &[("data-x", "1")]),
                },
                OptionRow {
                    group: Some("G".into()),
                    item: item("b", "Beta", &[]),
                },
            ],
            vec!["a".to_owned()],
        );

        let rendered = Renderer::new(HtmlEscaper)?.render(&collection)?;
        assert_eq!(
            rendered,
            "<option data-x=\"1\" value=\"a\" selected=\"selected\">Alpha</option>\
             <optgroup label=\"G\"><option value=\"b\">Beta</option></optgroup>"
        );
        Ok(())
    }

    #[test]
    fn bound_value_overrides_attribute() -> Result<()> {
        let collection = OptionCollection::from_rows(
            [OptionRow {
                group: None,
                item: item("real", "T", &[("value", "fake"), ("class", "c")]),
            }],
            Vec::<String>::new(),
        );
        let rendered = Renderer::new(HtmlEscaper)?.render(&collection)?;
        assert_eq!(rendered, "<option value=\"real\" class=\"c\">T</option>");
        Ok(())
    }

    #[test]
    fn text_goes_through_the_escaper() -> Result<()> {
        let collection = OptionCollection::from_rows(
            [OptionRow {
                group: Some("grp".into()),
                item: item("v", "title", &[("title", "hint")]),
            }],
            Vec::<String>::new(),
        );
        let rendered = Renderer::new(Upper)?.render(&collection)?;
        assert_eq!(
            rendered,
            "<optgroup label=\"GRP\"><option title=\"HINT\" value=\"V\">TITLE</option></optgroup>"
        );
        Ok(())
    }

    #[test]
    fn html_escaping_applies_once() -> Result<()> {
        let collection = OptionCollection::from_rows(
            [OptionRow {
                group: None,
                item: item("a&b", "<b>Tom & Jerry</b>", &[]),
            }],
            Vec::<String>::new(),
        );
        let rendered = collection.to_markup()?;
        assert_eq!(
            rendered,
            "<option value=\"a&amp;b\">&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;</option>"
        );
        Ok(())
    }

    #[test]
    fn invalid_attribute_names_are_dropped() -> Result<()> {
        let attributes = [
            ("data-ok", "1"),
            ("onclick=\"x\"", "2"),
            ("a b", "3"),
            ("x>", "4"),
            ("", "5"),
        ];
        let collection = OptionCollection::from_rows(
            [OptionRow {
                group: None,
                item: item("v", "T", &attributes),
            }],
            Vec::<String>::new(),
        );
        let rendered = collection.to_markup()?;
        assert_eq!(rendered, "<option data-ok=\"1\" value=\"v\">T</option>");
        Ok(())
    }

    #[test]
    fn empty_collection_renders_nothing() -> Result<()> {
        let rendered = default_renderer()?.render(&OptionCollection::default())?;
        assert_eq!(rendered, "");
        Ok(())
    }
}
