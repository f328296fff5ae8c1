use super::*;
use crate::foundation::core::Rect;
use crate::paint::color::Paint;
use crate::scene::defs::Definition;
use crate::scene::node::Visibility;

const DOC: &str = r##"{
  "width": 200, "height": 100, "background": "#ffffff",
  "defs": {
    "sky": { "type": "gradient", "kind": "radial", "spread": "reflect",
             "stops": [ { "offset": 0, "color": "red" }, { "offset": 1, "color": "#0000ff" } ] },
    "dots": { "type": "pattern", "units": "user_space", "width": 10, "height": 10,
              "children": [ { "type": "circle", "cx": 5, "cy": 5, "r": 3, "fill": "black" } ] },
    "window": { "type": "clip", "children": [ { "type": "rect", "width": 50, "height": 50 } ] },
    "wobble": { "type": "transition", "stops": [
        { "offset": 0, "transform": "scale(1)" }, { "offset": 1, "transform": "scale(2)" } ] },
    "soft": { "type": "gaussian_blur", "std_deviation": 1.5 }
  },
  "children": [
    { "type": "group", "name": "layer", "transform": "translate(10, 5)", "opacity": 0.5,
      "children": [
        { "type": "rectangle", "name": "box", "width": 20, "height": "50%",
          "fill": "url(#sky)", "stroke": "black", "stroke_width": 2, "clip": "url(#window)" },
        { "type": "polygon", "points": "0,0 10,0 5,8", "fill": "url(#dots)", "visibility": "hidden" },
        { "type": "path", "d": "M0 0 L10 10", "fill": "none", "stroke": "blue",
          "transform": [ { "type": "scale", "x": 2, "y": 2 } ], "filter": "soft" }
      ] }
  ]
}"##;

#[test]
fn loads_definitions_and_tree() {
    let mut scene = Scene::from_json(DOC).unwrap();
    assert_eq!(scene.page_size().width, 200.0);
    assert_eq!(scene.background(), Some(Color::rgb(255, 255, 255)));
    assert_eq!(scene.defs().len(), 5);
    assert!(matches!(scene.defs().get("sky"), Some(Definition::Gradient(_))));
    let Some(Definition::Pattern(p)) = scene.defs().get("dots") else {
        panic!("pattern missing");
    };
    let content = p.content.unwrap();
    assert_eq!(scene.children(content).count(), 1);
    assert_eq!(scene.defs().clip("window").unwrap().units, Units::UserSpace);

    let layer = scene.find("layer").unwrap();
    assert_eq!(scene.children(layer).count(), 3);
    assert_eq!(scene.node(layer).unwrap().style().opacity, 0.5);

    let bx = scene.find("box").unwrap();
    let style = scene.node(bx).unwrap().style().clone();
    assert_eq!(style.fill, Paint::Url("sky".into()));
    assert_eq!(style.stroke_width, 2.0);
    assert_eq!(style.clip.as_deref(), Some("window"));
    let b = scene.bounds(bx).unwrap();
    assert_eq!(b, Rect::new(10.0, 5.0, 30.0, 55.0));

    let kids: Vec<_> = scene.children(layer).collect();
    assert_eq!(scene.node(kids[1]).unwrap().style().visibility, Visibility::Hidden);
    assert_eq!(scene.node(kids[2]).unwrap().transforms().len(), 1);
    assert_eq!(scene.node(kids[2]).unwrap().style().filter.as_deref(), Some("soft"));
}

#[test]
fn invalid_values_are_reported() {
    let bad_opacity = r#"{"width": 10, "height": 10, "children": [{"type": "group", "opacity": 3}]}"#;
    assert!(matches!(
        Scene::from_json(bad_opacity),
        Err(SceneError::Validation(_))
    ));

    let bad_json = r#"{"width": 10, "height": }"#;
    assert!(matches!(Scene::from_json(bad_json), Err(SceneError::Serde(_))));

    let bad_path = r#"{"width": 10, "height": 10, "children": [{"type": "path", "d": "M 0 0 K 1"}]}"#;
    assert!(matches!(Scene::from_json(bad_path), Err(SceneError::Parse(_))));

    let bad_stops = r#"{"width": 10, "height": 10, "defs": {"t": {"type": "transition",
        "stops": [{"offset": 0.5, "transform": "scale(1)"}]}}}"#;
    assert!(Scene::from_json(bad_stops).is_err());
}

#[test]
fn unknown_node_types_load_as_foreign() {
    let doc = r#"{"width": 10, "height": 10, "children": [{"type": "text", "name": "t"}]}"#;
    let scene = Scene::from_json(doc).unwrap();
    let id = scene.find("t").unwrap();
    assert!(matches!(scene.node(id).unwrap().geometry(), Geometry::Foreign { .. }));
}

#[test]
fn reference_names_accept_several_spellings() {
    assert_eq!(reference_name("url(#a)".into()), "a");
    assert_eq!(reference_name("#b".into()), "b");
    assert_eq!(reference_name(" c ".into()), "c");
}

#[test]
fn missing_files_surface_as_errors() {
    let err = Scene::load("/nonexistent/scene.json").unwrap_err();
    assert!(err.to_string().contains("scene.json"));
}
