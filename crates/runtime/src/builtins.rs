//! The host functions installed into every script environment
//!
//! The standard library consists of three functions: `print`, `to_string`,
//! and `to_formatted_string`.

use crate::{Function, Interpreter, Value};

/// Installs the built-in functions into the interpreter's global scope
pub fn install_builtins(interpreter: &mut Interpreter) {
    interpreter.add_function(Function::from_host("print", |vm, arguments| {
        let Some(fmt) = arguments.first() else {
            return Ok(Value::Int(1));
        };
        if !fmt.is_string() && arguments.len() > 1 {
            return Ok(Value::Int(1));
        }

        let arguments: Vec<String> = arguments[1..]
            .iter()
            .map(|argument| argument.to_string())
            .collect();
        let line = format_placeholders(&fmt.to_string(), &arguments);
        vm.stdout().write_line(&line)?;

        Ok(Value::Int(0))
    }));

    interpreter.add_function(Function::from_host("to_string", |_, arguments| {
        let value = arguments.first().cloned().unwrap_or_default();
        Ok(Value::from(value.to_string()))
    }));

    interpreter.add_function(Function::from_host("to_formatted_string", |_, arguments| {
        let value = arguments.first().cloned().unwrap_or_default();
        Ok(Value::from(value.to_formatted_string()))
    }));
}

// Substitutes `{}` placeholders in order with the given arguments
//
// `{{` and `}}` are literal braces. Placeholders beyond the argument list
// substitute an empty string.
fn format_placeholders(fmt: &str, arguments: &[String]) -> String {
    let mut output = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();
    let mut next_argument = arguments.iter();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('}')) => {
                chars.next();
                if let Some(argument) = next_argument.next() {
                    output.push_str(argument);
                }
            }
            ('{', Some('{')) => {
                chars.next();
                output.push('{');
            }
            ('}', Some('}')) => {
                chars.next();
                output.push('}');
            }
            _ => output.push(c),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{CaptureOutput, ScriptOutput};
    use crate::InterpreterSettings;
    use std::rc::Rc;
    use tama_parser::Parser;

    fn eval_captured(source: &str) -> (Value, String) {
        let output = CaptureOutput::default();
        let mut interpreter = Interpreter::with_settings(InterpreterSettings {
            stdout: Rc::new(output.clone()),
        });
        install_builtins(&mut interpreter);

        let ast = match Parser::parse(source) {
            Ok(ast) => Rc::new(ast),
            Err(error) => panic!("{error}"),
        };
        let result = match interpreter.execute(&ast) {
            Ok(result) => result,
            Err(error) => panic!("{error}"),
        };

        (result, output.captured())
    }

    #[test]
    fn print_substitutes_placeholders_in_order() {
        let (result, output) = eval_captured("print('a={}, b={}', 1, 2)");
        assert_eq!(result, Value::Int(0));
        assert_eq!(output, "a=1, b=2\n");
    }

    #[test]
    fn print_escaped_braces() {
        let (_, output) = eval_captured("print('{{}}')");
        assert_eq!(output, "{}\n");
    }

    #[test]
    fn print_plain_value_without_extra_arguments() {
        let (result, output) = eval_captured("print(42)");
        assert_eq!(result, Value::Int(0));
        assert_eq!(output, "42\n");
    }

    #[test]
    fn print_rejects_non_string_format_with_arguments() {
        let (result, output) = eval_captured("print(42, 1)");
        assert_eq!(result, Value::Int(1));
        assert_eq!(output, "");
    }

    #[test]
    fn to_string_in_a_loop() {
        let (result, _) =
            eval_captured("var s = ''; for (var x : 1..3) { s = s + to_string(x); } ret s;");
        assert_eq!(result, Value::from("123"));
    }

    #[test]
    fn to_formatted_string_quotes_strings() {
        let (result, _) = eval_captured("ret to_formatted_string('hi');");
        assert_eq!(result, Value::from("\"hi\""));
    }

    #[test]
    fn output_capture_is_line_oriented() {
        let output = CaptureOutput::default();
        output.write("a").unwrap();
        output.write_line("b").unwrap();
        assert_eq!(output.captured(), "ab\n");
    }

    #[test]
    fn extra_placeholders_render_empty() {
        assert_eq!(format_placeholders("x={} y={}", &["1".into()]), "x=1 y=");
    }
}
