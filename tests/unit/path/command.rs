use super::*;
use crate::foundation::core::PathEl;

#[test]
fn parses_absolute_and_relative_commands() {
    let cmds = parse_path("M10,10 l5 0 H30 v-4 Z").unwrap();
    assert_eq!(
        cmds,
        vec![
            PathCommand::MoveTo {
                x: 10.0,
                y: 10.0,
                rel: false
            },
            PathCommand::LineTo {
                x: 5.0,
                y: 0.0,
                rel: true
            },
            PathCommand::HLineTo { x: 30.0, rel: false },
            PathCommand::VLineTo { y: -4.0, rel: true },
            PathCommand::Close,
        ]
    );
}

#[test]
fn implicit_repeats_after_move_become_lines() {
    let cmds = parse_path("m1 1 2 2 3 3").unwrap();
    assert_eq!(cmds.len(), 3);
    assert!(matches!(cmds[1], PathCommand::LineTo { rel: true, .. }));
    assert!(matches!(cmds[2], PathCommand::LineTo { rel: true, .. }));
}

#[test]
fn unknown_letter_fails_parse() {
    assert!(matches!(parse_path("M0 0 X5 5"), Err(SceneError::Parse(_))));
}

#[test]
fn stray_characters_are_skipped() {
    let cmds = parse_path("M0 0 @ L5 5").unwrap();
    assert_eq!(cmds.len(), 2);
    assert_eq!(
        cmds[1],
        PathCommand::LineTo {
            x: 5.0,
            y: 5.0,
            rel: false
        }
    );
}

#[test]
fn single_command_is_rejected() {
    assert!(parse_path("M0 0").is_err());
    assert!(parse_path("").is_err());
}

#[test]
fn hv_lines_fill_missing_axis() {
    let p = commands_to_path(&parse_path("M2 3 H10 V7 h-4").unwrap());
    let pts: Vec<_> = p
        .elements()
        .iter()
        .filter_map(|el| match el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => Some((p.x, p.y)),
            _ => None,
        })
        .collect();
    assert_eq!(pts, vec![(2.0, 3.0), (10.0, 3.0), (10.0, 7.0), (6.0, 7.0)]);
}

#[test]
fn smooth_cubic_reflects_previous_control() {
    let p = commands_to_path(&parse_path("M0 0 C0 10 10 10 10 0 S20 -10 20 0").unwrap());
    match p.elements()[2] {
        PathEl::CurveTo(c1, _, end) => {
            assert_eq!(c1, Point::new(10.0, -10.0));
            assert_eq!(end, Point::new(20.0, 0.0));
        }
        ref other => panic!("expected cubic, got {other:?}"),
    }
}

#[test]
fn smooth_cubic_without_previous_curve_is_quadratic() {
    let p = commands_to_path(&parse_path("M0 0 S5 5 10 0").unwrap());
    assert_eq!(
        p.elements()[1],
        PathEl::QuadTo(Point::new(5.0, 5.0), Point::new(10.0, 0.0))
    );
}

#[test]
fn smooth_quad_reflects_previous_quad() {
    let p = commands_to_path(&parse_path("M0 0 Q5 5 10 0 T20 0").unwrap());
    assert_eq!(
        p.elements()[2],
        PathEl::QuadTo(Point::new(15.0, -5.0), Point::new(20.0, 0.0))
    );
}

#[test]
fn arc_ends_at_target_point() {
    let p = commands_to_path(&parse_path("M0 0 A10 10 0 0 1 20 0").unwrap());
    let last = p.elements().last().copied();
    match last {
        Some(PathEl::CurveTo(_, _, end)) => {
            assert!((end.x - 20.0).abs() < 1e-6 && end.y.abs() < 1e-6);
        }
        other => panic!("expected arc cubic, got {other:?}"),
    }
}

#[test]
fn close_returns_to_subpath_start() {
    let p = commands_to_path(&parse_path("M5 5 L10 5 Z l1 1").unwrap());
    let els = p.elements();
    assert_eq!(els[2], PathEl::ClosePath);
    assert_eq!(els[3], PathEl::MoveTo(Point::new(5.0, 5.0)));
    assert_eq!(els[4], PathEl::LineTo(Point::new(6.0, 6.0)));
}
