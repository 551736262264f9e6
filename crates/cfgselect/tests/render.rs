use cfgselect::app::render::Renderer;
use cfgselect::infra::config::Config;
use cfgselect::infra::escape::HtmlEscaper;
use cfgselect::infra::i18n::{CatalogLocalizer, IdentityLocalizer, Localizer};
use cfgselect::infra::source::DocumentSource;
use cfgselect::{BuildOptions, ConfigHelper, OptionNode};
use insta::assert_snapshot;
use serde_json::json;

fn helper_with<L: Localizer>(localizer: L) -> ConfigHelper<DocumentSource, L> {
    let source = DocumentSource::new(json!({
        "letters": {
            "a": {"title": "Alpha"},
            "b": {"title": "Beta", "optgroup": "G"},
        },
        "sizes": {
            "s": {"title": "Small", "attributes": {"data-size": "1"}},
            "m": {"title": "Medium & Co", "optgroup": "Regular"},
            "l": {"title": "Large", "optgroup": "Regular", "is_actual": false},
            "xl": {"title": "Extra \"large\"", "optgroup": "Big"},
        }
    }));
    ConfigHelper::new(source, localizer, &Config::default())
}

#[test]
fn selected_option_and_group_markup() {
    let helper = helper_with(IdentityLocalizer);
    let options = helper.build_options().with_selected(["a"]);
    let collection = helper.to_select("letters", &options).unwrap();

    let nodes: Vec<_> = collection.iter().collect();
    assert!(matches!(nodes[0], OptionNode::Single(item) if item.title == "Alpha"));
    let OptionNode::Group { label, options } = nodes[1] else {
        panic!("expected a group, got {:?}", nodes[1]);
    };
    assert_eq!(label, "G");
    assert_eq!(options.len(), 1);

    assert_snapshot!(
        collection.to_markup().unwrap(),
        @r#"<option value="a" selected="selected">Alpha</option><optgroup label="G"><option value="b">Beta</option></optgroup>"#
    );
}

#[test]
fn escaped_localized_markup() {
    let pairs = [("Regular", "Normal"), ("Small", "Klein")];
    let helper = helper_with(CatalogLocalizer::from_pairs(pairs));
    let options = helper
        .build_options()
        .with_prepend("", "-")
        .with_selected(["xl"]);
    let collection = helper.to_select("sizes", &options).unwrap();
    let renderer = Renderer::new(HtmlEscaper).unwrap();
    let rendered = renderer.render(&collection).unwrap();

    assert_snapshot!(
        rendered,
        @r#"<option value="">-</option><option data-size="1" value="s">Klein</option><optgroup label="Normal"><option value="m">Medium &amp; Co</option></optgroup><optgroup label="Big"><option value="xl" selected="selected">Extra &quot;large&quot;</option></optgroup>"#
    );
}

#[test]
fn options_without_groups_render_flat() {
    let helper = helper_with(IdentityLocalizer);
    let mapping = helper.mapping().clone().without_optgroup();
    let options = BuildOptions::default().with_mapping(mapping);
    let collection = helper.to_select("letters", &options).unwrap();

    assert_snapshot!(
        collection.to_markup().unwrap(),
        @r#"<option value="a">Alpha</option><option value="b">Beta</option>"#
    );
}
