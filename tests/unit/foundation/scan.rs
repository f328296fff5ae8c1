use super::*;

#[test]
fn reads_signed_and_fractional_values() {
    assert_eq!(NumScanner::new("1 -2.5,+3 .25").run().to_vec(), vec![1.0, -2.5, 3.0, 0.25]);
}

#[test]
fn adjacent_signs_split_values() {
    assert_eq!(NumScanner::new("10-5-.5").run().to_vec(), vec![10.0, -5.0, -0.5]);
}

#[test]
fn parentheses_are_separators() {
    assert_eq!(NumScanner::new("(1, 2)").run().to_vec(), vec![1.0, 2.0]);
}

#[test]
fn stops_at_first_foreign_character() {
    assert_eq!(NumScanner::new("4 5 x 6").run().to_vec(), vec![4.0, 5.0]);
    // No exponent support: the 'e' ends the run.
    assert_eq!(NumScanner::new("1e5").run().to_vec(), vec![1.0]);
}

#[test]
fn missing_values_read_as_zero() {
    let mut s = NumScanner::new("7");
    let (v, found) = s.numbers::<3>();
    assert_eq!(v, [7.0, 0.0, 0.0]);
    assert_eq!(found, 1);
}

#[test]
fn lone_sign_is_not_a_number() {
    let mut s = NumScanner::new("- 3");
    assert_eq!(s.number(), None);
    assert_eq!(s.pos(), 0);
}
