use crate::dict::connection::ConnectionMatrix;
use crate::dict::{parse_role_table, DictError, PosRole, PosTable};

fn sample_matrix() -> ConnectionMatrix {
    let text = "3 3\n0\n10\n20\n30\n40\n50\n60\n70\n80\n";
    ConnectionMatrix::from_text(text).unwrap()
}

#[test]
fn test_from_text() {
    let m = sample_matrix();
    assert_eq!(m.num_ids(), 3);
    // Row 0: [0, 10, 20]
    assert_eq!(m.cost(0, 0), 0);
    assert_eq!(m.cost(0, 1), 10);
    assert_eq!(m.cost(0, 2), 20);
    // Row 1: [30, 40, 50]
    assert_eq!(m.cost(1, 0), 30);
    assert_eq!(m.cost(1, 1), 40);
    assert_eq!(m.cost(1, 2), 50);
    // Row 2: [60, 70, 80]
    assert_eq!(m.cost(2, 0), 60);
    assert_eq!(m.cost(2, 1), 70);
    assert_eq!(m.cost(2, 2), 80);
}

#[test]
fn test_from_text_square_header() {
    let m = ConnectionMatrix::from_text("2 2\n\n1\n-2\n3\n4\n").unwrap();
    assert_eq!(m.num_ids(), 2);
    assert_eq!(m.cost(0, 1), -2);
    assert_eq!(m.cost(1, 0), 3);
}

#[test]
fn test_from_text_rejects_bad_input() {
    for (text, needle) in [
        ("", "empty file"),
        ("1 1 1\n0\n", "expected 1 or 2 values"),
        ("x\n", "invalid num_ids"),
        ("2 2\n0 0 5\n1 0 -7\n0 1 9\n1 1 3\n", "invalid cost '0 0 5'"),
    ] {
        let err = ConnectionMatrix::from_text(text).err().unwrap();
        assert!(err.to_string().contains(needle), "{text:?}: {err}");
    }
}

#[test]
fn test_out_of_bounds_is_zero() {
    let m = sample_matrix();
    assert_eq!(m.cost(3, 0), 0);
    assert_eq!(m.cost(u16::MAX, u16::MAX), 0);
}

#[test]
fn test_wrong_cost_count() {
    let err = ConnectionMatrix::from_text("2\n1\n2\n3\n").err().unwrap();
    assert!(matches!(err, DictError::Parse(_)));
    assert!(err.to_string().contains("expected 4 costs"));
}

#[test]
fn test_mismatched_header() {
    let err = ConnectionMatrix::from_text("2 3\n").err().unwrap();
    assert!(err.to_string().contains("num_left (2) != num_right (3)"));
}

#[test]
fn test_function_word_range() {
    let text = "3\n0\n0\n0\n0\n0\n0\n0\n0\n0\n";
    let m = ConnectionMatrix::from_text_with_roles(text, 2, 2, Vec::new()).unwrap();
    assert!(!m.is_function_word(1));
    assert!(m.is_function_word(2));
    assert_eq!(m.pos_role(2), PosRole::FunctionWord);
    assert_eq!(m.pos_role(1), PosRole::ContentWord);
}

#[test]
fn test_function_word_range_unset() {
    let m = sample_matrix();
    assert!(!m.is_function_word(0));
}

#[test]
fn test_roles_padded_and_mapped() {
    let text = "4\n".to_string() + &"0\n".repeat(16);
    let m = ConnectionMatrix::from_text_with_roles(&text, 0, 0, vec![0, 2, 7]).unwrap();
    assert_eq!(m.role(3), 0);
    assert_eq!(m.pos_role(1), PosRole::Suffix);
    assert_eq!(m.pos_role(2), PosRole::Conjugating);
    assert_eq!(m.pos_role(3), PosRole::ContentWord);
    assert_eq!(m.pos_role(100), PosRole::ContentWord);
}

#[test]
fn test_too_many_roles() {
    let text = "1\n0\n";
    let err = ConnectionMatrix::from_text_with_roles(text, 0, 0, vec![0, 1])
        .err()
        .unwrap();
    assert!(matches!(err, DictError::Parse(_)));
}

#[test]
fn test_set_role() {
    let mut m = sample_matrix();
    m.set_role(1, PosRole::Prefix);
    m.set_role(99, PosRole::Prefix);
    assert_eq!(m.pos_role(1), PosRole::Prefix);
}

#[test]
fn test_parse_role_table() {
    let text = "# roles\n1 function\n\n4 conjugating\n2 suffix\n";
    let roles = parse_role_table(text).unwrap();
    assert_eq!(roles, vec![0, 1, 2, 0, 7]);
}

#[test]
fn test_parse_role_table_errors() {
    let err = parse_role_table("1 verb\n").unwrap_err();
    assert!(matches!(err, DictError::InvalidLine { line: 1, .. }));
    assert!(err.to_string().contains("unknown POS role: verb"));

    let err = parse_role_table("x content\n").unwrap_err();
    assert!(err.to_string().contains("invalid id"));

    assert!(parse_role_table("").unwrap().is_empty());
}
