use super::*;

#[test]
fn hex_forms() {
    assert_eq!(Color::parse("#ff8000").unwrap(), Color::rgb(255, 128, 0));
    assert_eq!(Color::parse("#F80").unwrap(), Color::rgb(255, 136, 0));
    assert_eq!(
        Color::parse("#00000080").unwrap(),
        Color::rgba(0, 0, 0, 128)
    );
    assert!(Color::parse("#12345").is_err());
    assert!(Color::parse("#gg0000").is_err());
}

#[test]
fn rgb_accepts_bytes_and_percentages() {
    assert_eq!(Color::parse("rgb(10, 20, 30)").unwrap(), Color::rgb(10, 20, 30));
    assert_eq!(
        Color::parse("rgb(100%,50%,0%)").unwrap(),
        Color::rgb(255, 128, 0)
    );
    assert_eq!(
        Color::parse("rgba(1,2,3,4)").unwrap(),
        Color::rgba(1, 2, 3, 4)
    );
    assert_eq!(Color::parse("rgb(300,-5,7)").unwrap(), Color::rgb(255, 0, 7));
}

#[test]
fn hsl_and_names() {
    assert_eq!(Color::parse("hsl(0, 100%, 50%)").unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(
        Color::parse("hsl(120,100%,25%)").unwrap(),
        Color::rgb(0, 128, 0)
    );
    assert_eq!(Color::parse("Navy").unwrap(), Color::rgb(0, 0, 128));
    assert_eq!(Color::parse("transparent").unwrap(), Color::TRANSPARENT);
    assert!(Color::parse("notacolor").is_err());
}

#[test]
fn named_table_is_sorted() {
    assert!(NAMED.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn paint_references() {
    assert_eq!(Paint::parse("none").unwrap(), Paint::None);
    assert_eq!(Paint::parse(" url(#grad1) ").unwrap(), Paint::Url("grad1".into()));
    assert_eq!(Paint::parse("red").unwrap(), Paint::Color(Color::rgb(255, 0, 0)));
    assert!(Paint::parse("url(grad1)").is_err());
    assert!(Paint::parse("url(#)").is_err());
}

#[test]
fn premultiply_and_opacity() {
    let c = Color::rgba(255, 0, 0, 128).premul();
    assert_eq!(c.to_array(), [128, 0, 0, 128]);
    assert_eq!(Color::rgb(1, 2, 3).with_opacity(0.5).a, 128);
}

#[test]
fn serde_uses_strings_and_arrays() {
    let c: Color = serde_json::from_str("\"#0000ff\"").unwrap();
    assert_eq!(c, Color::rgb(0, 0, 255));
    let c: Color = serde_json::from_str("[1.0, 0.0, 0.0, 0.5]").unwrap();
    assert_eq!(c, Color::rgba(255, 0, 0, 128));
    let p: Paint = serde_json::from_str("\"url(#g)\"").unwrap();
    assert_eq!(serde_json::to_string(&p).unwrap(), "\"url(#g)\"");
}
