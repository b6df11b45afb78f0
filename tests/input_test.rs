mod common;
use common::*;

#[test]
fn test_numeric_input_with_reprompt() {
    let output = run_program(
        &[r#"10 INPUT "NUMBER";N"#, "20 PRINT N*2", "30 END"],
        &["abc", "5"],
    );
    assert!(output.contains("?Redo from start"));
    assert!(output.contains("10"));
    assert_eq!(output, "NUMBER? ?Redo from start\n? 10\n");
}

#[test]
fn test_input_without_prompt() {
    let output = run_program(&["10 INPUT N", "20 PRINT N+1"], &["41"]);
    assert_eq!(output, "? 42\n");
}

#[test]
fn test_input_string_is_trimmed() {
    let output = run_program(
        &["10 INPUT A$", r#"20 PRINT "["+A$+"]""#],
        &["  hello  "],
    );
    assert_eq!(output, "? [hello]\n");
}

#[test]
fn test_input_multiple_targets_read_lines() {
    let output = run_program(&["10 INPUT A,B", "20 PRINT A+B"], &["3", "4"]);
    assert_eq!(output, "? 7\n");
}

#[test]
fn test_input_to_array_element() {
    let output = run_program(&["10 INPUT A(2)", "20 PRINT A(2)"], &["9"]);
    assert_eq!(output, "? 9\n");
}

#[test]
fn test_input_eof_is_an_error() {
    let (_, error) = run_error(&["10 INPUT N"], &[]);
    assert_eq!(error, "INPUT received end of stream");
}

#[test]
fn test_get_reads_character_codes() {
    let output = run_program(
        &["10 A=GET()", "20 B=GET()", "30 C=GET()", "40 PRINT A;B;C"],
        &["HI"],
    );
    // 'H', 'I', then the appended newline.
    assert_eq!(output, "727310\n");
}

#[test]
fn test_get_without_parens() {
    let output = run_program(&["10 PRINT GET"], &["A"]);
    assert_eq!(output, "65\n");
}
