use std::rc::Rc;
use tama::bytecode::VmSettings;
use tama::prelude::*;
use test_case::test_case;

fn eval(source: &str) -> Value {
    let mut env = ScriptEnvironment::default();
    match env.eval(source) {
        Ok(result) => result,
        Err(error) => panic!("{error}"),
    }
}

fn eval_captured(source: &str) -> (Value, String) {
    let output = CaptureOutput::default();
    let mut env = ScriptEnvironment::with_settings(InterpreterSettings {
        stdout: Rc::new(output.clone()),
    });
    let result = match env.eval(source) {
        Ok(result) => result,
        Err(error) => panic!("{error}"),
    };
    (result, output.captured())
}

#[test_case("var a = 5 + 5; ret a;", Value::Int(10); "arithmetic and return")]
#[test_case("fun add(a, b) { ret a + b; } ret add(3, 4);", Value::Int(7); "function call")]
#[test_case(
    "var s = ''; for (var x : 1..3) { s = s + to_string(x); } ret s;",
    Value::Str("123".into());
    "range loop with to_string"
)]
#[test_case("var o = [ 'k' : 1, 'v' : 2 ]; ret o.k + o.v;", Value::Int(3); "object access")]
#[test_case(
    "fun f(a, b) { if (a >= 10) { ret (a / 2) + b; } ret a + b; } ret f(20, 5);",
    Value::Int(15);
    "conditional return"
)]
#[test_case(
    "var a = [1,2,3]; var sum = 0; for (var x : a) { sum = sum + x; } ret sum;",
    Value::Int(6);
    "array loop"
)]
fn end_to_end_scenarios(source: &str, expected: Value) {
    assert_eq!(eval(source), expected);
}

#[test]
fn ranged_loop_runs_inclusive_bounds() {
    for (min, max, expected) in [(1, 3, 3), (5, 5, 1), (0, 9, 10)] {
        let source =
            format!("var n = 0; for (var x : {min}..{max}) {{ n = n + 1; }} ret n;");
        assert_eq!(eval(&source), Value::Int(expected), "range {min}..{max}");
    }
}

#[test]
fn print_writes_formatted_lines() {
    let (result, output) = eval_captured("print('a={}, b={}', 1, 2)");
    assert_eq!(result, Value::Int(0));
    assert_eq!(output, "a=1, b=2\n");
}

#[test]
fn print_brace_escapes() {
    let (_, output) = eval_captured("print('{{}}')");
    assert_eq!(output, "{}\n");
}

#[test]
fn declarations_persist_across_eval_calls() {
    let mut env = ScriptEnvironment::default();
    env.eval("var counter = 0; fun bump() { counter = counter + 1; ret counter; }")
        .unwrap();
    assert_eq!(env.eval("bump();").unwrap(), Value::Int(1));
    assert_eq!(env.eval("bump();").unwrap(), Value::Int(2));
}

#[test]
fn parse_errors_surface_to_the_host() {
    let mut env = ScriptEnvironment::default();
    match env.eval("var 5;") {
        Err(Error::ParseError(error)) => assert_eq!(error.token.content, "5"),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn runtime_errors_surface_to_the_host() {
    let mut env = ScriptEnvironment::default();
    assert!(matches!(
        env.eval("ret 1 / 0;"),
        Err(Error::RuntimeError(_))
    ));
}

#[test]
fn eval_file_runs_scripts_from_disk() {
    let path = std::env::temp_dir().join(format!("tama_test_{}.tama", std::process::id()));
    std::fs::write(&path, "var a = 40; ret a + 2;").unwrap();

    let mut env = ScriptEnvironment::default();
    let result = env.eval_file(&path).unwrap();
    assert_eq!(result, Some(Value::Int(42)));

    std::fs::remove_file(&path).ok();
}

#[test]
fn eval_file_on_a_missing_path_returns_none() {
    let mut env = ScriptEnvironment::default();
    let result = env
        .eval_file("/definitely/not/a/real/path.tama")
        .unwrap();
    assert_eq!(result, None);
}

#[test]
fn host_functions_can_be_installed() {
    let mut env = ScriptEnvironment::default();
    env.interpreter()
        .add_function(Function::from_host("double", |_, arguments| {
            let value = arguments.first().cloned().unwrap_or_default();
            value.multiply(&Value::Int(2))
        }));
    assert_eq!(env.eval("ret double(21);").unwrap(), Value::Int(42));
}

#[test]
fn bytecode_scenario_leaves_the_call_result_in_the_accumulator() {
    let source =
        "var a = 5 + 5; var b = a + 10; fun testing(a, b) { ret a + b; } ret testing(a, b);";
    let env = ScriptEnvironment::default();
    assert_eq!(env.eval_bytecode(source).unwrap(), Value::Int(30));
}

// For the subset that the bytecode back end lowers, both back ends must agree
#[test_case("var a = 5 + 5; ret a;"; "declaration")]
#[test_case("var a = 2; var b = a * 3; ret b - 1;"; "arithmetic chain")]
#[test_case("var a = 1; a = a + 41; ret a;"; "assignment")]
#[test_case("fun add(a, b) { ret a + b; } ret add(4, 4);"; "symmetric call")]
#[test_case("ret missing;"; "undefined variable")]
fn backends_agree(source: &str) {
    let mut env = ScriptEnvironment::default();
    let tree_result = env.eval(source).unwrap();
    let bytecode_result = env.eval_bytecode(source).unwrap();
    assert_eq!(tree_result, bytecode_result, "backends disagree on {source}");
}

#[test]
fn bytecode_compile_errors_surface_to_the_host() {
    let env = ScriptEnvironment::default();
    assert!(matches!(
        env.eval_bytecode("for (var x : 1..3) { x }"),
        Err(Error::CompileError(_))
    ));
}

#[test]
fn bytecode_trace_can_be_captured() {
    let output = CaptureOutput::default();
    let env = ScriptEnvironment::default();
    env.eval_bytecode_with_settings(
        "var a = 1;",
        VmSettings {
            trace: true,
            output: Rc::new(output.clone()),
        },
    )
    .unwrap();
    assert!(output.captured().contains("storev 'a'"));
}
