// ABOUTME: Integration tests for the Interpreter's REPL session driver

use lispconf::config::Config;
use lispconf::interpreter::Interpreter;
use lispconf::reader::Reader;

fn fresh_interpreter() -> Interpreter {
    Interpreter::new(Config::default(), Vec::new(), None).unwrap()
}

#[test]
fn repl_evaluates_each_line_and_prints_its_value() {
    let interp = fresh_interpreter();
    let mut reader = Reader::new("(+ 1 2)\n(* 3 4)\n");
    let mut out = Vec::new();
    interp.repl(&mut reader, &mut out, None, None).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains('3'));
    assert!(text.contains("12"));
}

#[test]
fn repl_reports_an_error_and_keeps_going() {
    let interp = fresh_interpreter();
    let mut reader = Reader::new("(+ 1 2)\n(undefined-name)\n(+ 3 4)\n");
    let mut out = Vec::new();
    interp.repl(&mut reader, &mut out, None, None).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("unbound symbol"));
    assert!(text.contains('7'));
}

#[test]
fn repl_prints_the_prompt_before_each_read() {
    let interp = fresh_interpreter();
    let mut reader = Reader::new("1\n2\n");
    let mut out = Vec::new();
    interp.repl(&mut reader, &mut out, Some("lispconf> "), None).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("lispconf> ").count(), 3);
}

#[test]
fn repl_state_persists_across_reads() {
    let interp = fresh_interpreter();
    let mut reader = Reader::new("(define x 10)\n(+ x 1)\n");
    let mut out = Vec::new();
    interp.repl(&mut reader, &mut out, None, None).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("11"));
}
