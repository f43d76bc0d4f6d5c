mod common;

use common::*;
use sli_runtime::{
    DebugCommand, Name, RuntimeConfig, ScriptedPrompt, SliError, Token, Value,
};

#[test]
fn for_pushes_every_counter_value() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![int(1), int(1), int(5), body(vec![]), name("for")]);
    assert_eq!(ints(&interp), vec![1, 2, 3, 4, 5]);
    assert_eq!(interp.call_depth(), 0);
    assert!(interp.estack().is_empty());
}

#[test]
fn for_counts_down_with_negative_step() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![int(3), int(-1), int(1), body(vec![]), name("for")]);
    assert_eq!(ints(&interp), vec![3, 2, 1]);
}

#[test]
fn for_with_zero_step_runs_nothing() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![int(1), int(0), int(5), body(vec![]), name("for")]);
    assert!(interp.ostack().is_empty());
}

#[test]
fn repeat_runs_the_body_n_times() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![int(3), body(vec![int(7)]), name("repeat")]);
    assert_eq!(ints(&interp), vec![7, 7, 7]);
}

#[test]
fn forallindexed_pairs_elements_with_indices() {
    let (mut interp, _) = interpreter();
    let items = Token::array(vec![Token::string("a"), Token::string("b"), Token::string("c")]);
    run(&mut interp, vec![items, body(vec![]), name("forallindexed")]);
    let pairs: Vec<String> = interp.ostack().iter().map(|t| t.to_string()).collect();
    assert_eq!(pairs, vec!["a", "0", "b", "1", "c", "2"]);
}

#[test]
fn forall_over_a_string_yields_byte_codes() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![Token::string("AB"), body(vec![]), name("forall")]);
    assert_eq!(ints(&interp), vec![65, 66]);
}

#[test]
fn forall_runs_the_body_per_element() {
    let (mut interp, _) = interpreter();
    let items = Token::array(vec![int(1), int(2), int(3)]);
    run(&mut interp, vec![items, body(vec![int(10), name("mul")]), name("forall")]);
    assert_eq!(ints(&interp), vec![10, 20, 30]);
}

fn hits(interp: &sli_runtime::Interpreter) -> i64 {
    interp.lookup("hits").unwrap().get::<i64>().unwrap()
}

fn count_hit() -> Token {
    body(vec![lit("hits"), name("hits"), int(1), name("add"), name("def")])
}

#[test]
fn empty_iterations_invoke_nothing() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![lit("hits"), int(0), name("def")]);
    run(&mut interp, vec![int(0), count_hit(), name("repeat")]);
    run(&mut interp, vec![int(1), int(1), int(0), count_hit(), name("for")]);
    run(&mut interp, vec![Token::array(vec![]), count_hit(), name("forall")]);
    run(&mut interp, vec![Token::string(""), count_hit(), name("forallindexed")]);
    run(&mut interp, vec![body(vec![]), name("loop")]);
    assert_eq!(hits(&interp), 0);
    assert_eq!(interp.call_depth(), 0);
    assert!(interp.estack().is_empty());
    run(&mut interp, vec![int(4), count_hit(), name("repeat")]);
    assert_eq!(hits(&interp), 4);
    assert!(interp.ostack().is_empty());
}

#[test]
fn exit_leaves_the_innermost_loop() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![lit("i"), int(0), name("def")]);
    let step = body(vec![
        name("i"),
        int(3),
        name("gt"),
        body(vec![name("exit")]),
        name("if"),
        lit("i"),
        name("i"),
        int(1),
        name("add"),
        name("def"),
    ]);
    run(&mut interp, vec![step, name("loop")]);
    assert_eq!(interp.lookup("i").unwrap().get::<i64>(), Ok(4));
    assert_eq!(interp.call_depth(), 0);
    assert!(interp.estack().is_empty());
}

#[test]
fn exit_outside_a_loop_is_invalid() {
    let (mut interp, diag) = interpreter();
    let result = interp.execute(Token::procedure(vec![int(1), name("exit"), int(2)]));
    assert_eq!(result, Err(SliError::InvalidExit));
    assert!(interp.estack().is_empty());
    assert_eq!(interp.call_depth(), 0);
    assert_eq!(ints(&interp), vec![1]);
    assert!(diag.contents().starts_with("InvalidExit"));
}

fn countdown() -> Vec<Token> {
    vec![
        lit("down"),
        body(vec![
            int(1),
            name("sub"),
            name("dup"),
            int(0),
            name("gt"),
            body(vec![name("down")]),
            name("if"),
        ]),
        name("def"),
    ]
}

#[test]
fn tail_calls_do_not_grow_the_execution_stack() {
    let (mut interp, _) = interpreter();
    run(&mut interp, countdown());
    interp.execute(int(1000)).unwrap();
    interp.execute(name("down")).unwrap();
    assert_eq!(ints(&interp), vec![0]);
    assert!(interp.estack().peak() < 16, "peak {}", interp.estack().peak());
    assert_eq!(interp.call_depth(), 0);
}

#[test]
fn without_tail_handling_frames_accumulate() {
    let config = RuntimeConfig {
        optimize_tail_recursion: false,
        ..RuntimeConfig::default()
    };
    let (mut interp, _) = interpreter_with(config);
    run(&mut interp, countdown());
    interp.execute(int(200)).unwrap();
    interp.execute(name("down")).unwrap();
    assert_eq!(ints(&interp), vec![0]);
    assert!(interp.estack().peak() > 600);
    assert_eq!(interp.call_depth(), 0);
}

#[test]
fn failing_statement_leaves_a_backtrace_and_a_clean_stack() {
    let (mut interp, diag) = interpreter();
    let result = interp.execute_all(vec![
        int(3),
        body(vec![int(1), int(0), name("nope")]),
        name("repeat"),
    ]);
    assert_eq!(result, Err(SliError::undefined("nope")));
    let out = diag.contents();
    assert!(out.starts_with("UndefinedName: name 'nope' is not defined\n"));
    assert!(out.contains("During repeat with 2 iterations remaining.\n"));
    assert!(out.contains("-->   nope\n"));
    assert!(interp.estack().is_empty());
    assert_eq!(interp.call_depth(), 0);
    assert_eq!(ints(&interp), vec![1, 0]);

    // the interpreter stays usable
    run(&mut interp, vec![int(2), int(3), name("add")]);
    assert_eq!(ints(&interp), vec![1, 0, 5]);
}

#[test]
fn backtrace_names_every_enclosing_frame() {
    let (mut interp, diag) = interpreter();
    let inner = Token::procedure(vec![int(1), name("nope"), int(2)]);
    let result = interp.execute_all(vec![
        int(1),
        int(1),
        int(3),
        body(vec![inner]),
        name("for"),
    ]);
    assert!(result.is_err());
    let out = diag.contents();
    let procedure = out.find("In procedure:").unwrap();
    let for_frame = out.find("During for at iterator value 1.").unwrap();
    assert!(procedure < for_frame, "innermost frame first:\n{}", out);
}

#[test]
fn forall_backtrace_reports_the_iteration() {
    let (mut interp, diag) = interpreter();
    let items = Token::array(vec![int(1), int(2)]);
    let result = interp.execute_all(vec![items, body(vec![name("nope")]), name("forall")]);
    assert!(result.is_err());
    assert!(diag.contents().contains("During forall (array) at iteration 1."));
}

#[test]
fn step_mode_lists_on_request() {
    let (mut interp, diag) = interpreter();
    interp.set_step_mode(true);
    interp.set_debug_prompt(Box::new(ScriptedPrompt::new([
        DebugCommand::Continue,
        DebugCommand::List,
    ])));
    run(&mut interp, vec![int(2), body(vec![int(1), int(2)]), name("repeat")]);
    assert_eq!(ints(&interp), vec![1, 2, 1, 2]);
    let out = diag.contents();
    assert!(out.contains("   {\n      1\n-->   2\n   }\n"), "{}", out);
    assert!(out.contains("repeat: 1 iterations left."));
    assert!(out.contains("repeat: 0 iterations left."));
}

#[test]
fn callback_runs_once_after_the_statement() {
    let (mut interp, _) = interpreter();
    interp.set_callback(int(42));
    run(&mut interp, vec![int(1)]);
    run(&mut interp, vec![int(2)]);
    assert_eq!(ints(&interp), vec![1, 42, 2]);
}

#[test]
fn exec_runs_an_operand() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![body(vec![int(5), int(6), name("add")]), name("exec")]);
    assert_eq!(ints(&interp), vec![11]);
}

#[test]
fn read_only_bindings_refuse_redefinition() {
    let (mut interp, _) = interpreter();
    let mut fixed = int(1);
    fixed.set_writeable(false);
    interp.def("fixed", fixed).unwrap();
    let result = interp.execute_all(vec![lit("fixed"), int(2), name("def")]);
    assert_eq!(result, Err(SliError::ReadOnly { name: "fixed".into() }));
    assert_eq!(interp.lookup("fixed").unwrap().get::<i64>(), Ok(1));
}

#[test]
fn literal_procedures_become_executable_operands() {
    let (mut interp, _) = interpreter();
    run(&mut interp, vec![body(vec![name("x")])]);
    let top = interp.ostack().top().unwrap();
    assert!(matches!(top.value(), Some(Value::Procedure(_))));
    assert_eq!(top.get::<Name>().ok(), None);
}
