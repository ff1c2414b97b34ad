mod common;

use common::{run, SharedBuf};
use rox::error::{Diagnostics, Status};
use rox::value::Value;
use rox::Lox;

fn output_of(source: &str) -> Vec<String> {
    let outcome = run(source);
    assert_eq!(
        outcome.status,
        Status::Clean,
        "errors: {:?}",
        outcome.errors
    );
    outcome.output
}

fn evaluate(source: &str) -> (Option<Value>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let value = Lox::with_output(Box::new(SharedBuf::default())).evaluate(source, &mut diagnostics);
    (value, diagnostics)
}

#[test]
fn arithmetic_and_concatenation() {
    assert_eq!(evaluate("1 + 1").0, Some(Value::Number(2.0)));
    assert_eq!(evaluate("\"a\" + 1").0, Some(Value::String("a1".into())));
    assert_eq!(evaluate("1 + \"b\"").0, Some(Value::String("1b".into())));
    assert_eq!(evaluate("(1, 2, 3)").0, None);
    assert_eq!(evaluate("1, 2, 3").0, Some(Value::Number(3.0)));
    assert_eq!(evaluate("!nil == true").0, Some(Value::Bool(true)));
    assert_eq!(evaluate("2 > 1 ? \"yes\" : \"no\"").0, Some(Value::String("yes".into())));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let (value, diagnostics) = evaluate("1 / 0");

    assert_eq!(value, None);
    assert!(diagnostics.had_runtime_error());
    assert!(!diagnostics.had_error());
    assert_eq!(diagnostics.status(), Status::RuntimeError);
    assert_eq!(
        diagnostics.errors()[0].to_string(),
        "[line 1] Error at '/': Attempted to divide by zero."
    );
}

#[test]
fn operand_type_errors() {
    let cases = [
        ("-\"x\"", "Operand must be a number."),
        ("1 < \"2\"", "Operands must be numbers."),
        ("nil + nil", "Operands must be two numbers or two strings."),
        ("\"f\"()", "Can only call functions and classes."),
    ];

    for (source, message) in cases {
        let (_, diagnostics) = evaluate(source);
        assert_eq!(diagnostics.status(), Status::RuntimeError, "{}", source);
        assert_eq!(diagnostics.errors()[0].message(), message, "{}", source);
    }
}

#[test]
fn numbers_print_without_a_trailing_zero() {
    assert_eq!(output_of("print 6.0; print 6.5; print -0.25;"), vec!["6", "6.5", "-0.25"]);
}

#[test]
fn equality_rules() {
    assert_eq!(
        output_of(
            r#"
            print nil == nil;
            print nil == false;
            print 1 == 1.0;
            print "a" == "a";
            fun f() {}
            var g = f;
            print f == g;
            print clock == clock;
            "#
        ),
        vec!["true", "false", "true", "true", "true", "true"]
    );
}

#[test]
fn truthiness_and_logical_operators_short_circuit() {
    assert_eq!(
        output_of(
            r#"
            print nil or "default";
            print 0 and "zero is truthy";
            print "" and "empty is truthy";
            var called = false;
            fun touch() { called = true; return true; }
            false and touch();
            print called;
            "#
        ),
        vec!["default", "zero is truthy", "empty is truthy", "false"]
    );
}

#[test]
fn closures_capture_by_reference() {
    assert_eq!(
        output_of(
            r#"
            fun make() {
                var i = 0;
                fun inc() { i = i + 1; return i; }
                return inc;
            }
            var f = make();
            f();
            print f();
            "#
        ),
        vec!["2"]
    );
}

#[test]
fn shadowing_resolves_from_the_definition_scope() {
    assert_eq!(
        output_of(
            r#"
            var a = "global";
            {
                fun showA() { print a; }
                showA();
                var a = "block";
                showA();
            }
            "#
        ),
        vec!["global", "global"]
    );
}

#[test]
fn globals_are_looked_up_when_used() {
    assert_eq!(
        output_of(
            r#"
            fun isEven(n) { return n == 0 ? true : isOdd(n - 1); }
            fun isOdd(n) { return n == 0 ? false : isEven(n - 1); }
            print isEven(10);
            "#
        ),
        vec!["true"]
    );
}

const CLASSES: &str = r#"
    class A {
        init(x) { this.x = x; }
        get() { return this.x; }
    }
    class B < A {
        get() { return super.get() + 1; }
    }
    var b = B(5);
    print b.get();
"#;

#[test]
fn inheritance_and_super_calls() {
    assert_eq!(output_of(CLASSES), vec!["6"]);
}

#[test]
fn calling_a_class_with_the_wrong_arity() {
    let outcome = run(&format!("{}\nA();", CLASSES));

    assert_eq!(outcome.status, Status::RuntimeError);
    assert_eq!(outcome.output, vec!["6"]);
    assert_eq!(
        outcome.errors,
        vec!["[line 12] Error at ')': Expected 1 arguments but got 0."]
    );
}

#[test]
fn initializer_always_returns_the_instance() {
    assert_eq!(
        output_of(
            r#"
            class P {
                init(n) { this.n = n; return; }
            }
            var p = P(1);
            print p.init(7) == p;
            print p.n;
            "#
        ),
        vec!["true", "7"]
    );
}

#[test]
fn fields_shadow_methods_and_bound_methods_keep_this() {
    assert_eq!(
        output_of(
            r#"
            class Counter {
                init() { this.count = 0; }
                bump() { this.count = this.count + 1; return this.count; }
            }
            var c = Counter();
            var bump = c.bump;
            bump();
            print bump();
            c.bump = "field";
            print c.bump;
            "#
        ),
        vec!["2", "field"]
    );
}

#[test]
fn display_forms() {
    assert_eq!(
        output_of(
            r#"
            fun named() {}
            class K {}
            print named;
            print fun () {};
            print clock;
            print K;
            print K();
            print nil;
            "#
        ),
        vec!["<fn named>", "<fn>", "<native fn>", "K", "K instance", "nil"]
    );
}

#[test]
fn break_and_continue() {
    assert_eq!(
        output_of(
            r#"
            for (var i = 0; i < 10; i = i + 1) {
                if (i == 1) continue;
                if (i == 4) break;
                print i;
            }
            var n = 0;
            while (true) {
                n = n + 1;
                if (n < 3) continue;
                break;
            }
            print n;
            "#
        ),
        vec!["0", "2", "3", "3"]
    );
}

#[test]
fn return_unwinds_out_of_loops() {
    assert_eq!(
        output_of(
            r#"
            fun first(limit) {
                for (var i = 0; i < limit; i = i + 1) {
                    while (true) { return i + 100; }
                }
                return -1;
            }
            print first(3);
            print first(0);
            "#
        ),
        vec!["100", "-1"]
    );
}

#[test]
fn undefined_variable_stops_the_run() {
    let outcome = run("print 1;\nprint undeclared;\nprint 2;");

    assert_eq!(outcome.status, Status::RuntimeError);
    assert_eq!(outcome.output, vec!["1"]);
    assert_eq!(
        outcome.errors,
        vec!["[line 2] Error at 'undeclared': Undefined variable 'undeclared'."]
    );
}

#[test]
fn runtime_property_errors() {
    let cases = [
        ("class C {} C().missing;", "Undefined property 'missing'."),
        ("var x = 1; x.y;", "Only instances have properties."),
        ("var x = 1; x.y = 2;", "Only instances have fields."),
        ("var NotAClass = 1; class D < NotAClass {}", "Superclass must be a class."),
        ("undefinedName = 3;", "Undefined variable 'undefinedName'."),
    ];

    for (source, message) in cases {
        let outcome = run(source);
        assert_eq!(outcome.status, Status::RuntimeError, "{}", source);
        assert!(
            outcome.errors[0].ends_with(message),
            "{}: {:?}",
            source,
            outcome.errors
        );
    }
}

#[test]
fn session_state_survives_between_runs() {
    let buf = SharedBuf::default();
    let mut lox = Lox::with_output(Box::new(buf.clone())).repl(true);
    let mut diagnostics = Diagnostics::new();

    assert_eq!(lox.run("var greeting = \"hi\";", &mut diagnostics), Status::Clean);
    assert_eq!(lox.run("fun shout(s) { return s + \"!\"; }", &mut diagnostics), Status::Clean);

    // A failing line does not poison the session.
    assert_eq!(lox.run("print missing;", &mut diagnostics), Status::RuntimeError);
    diagnostics.reset();

    assert_eq!(lox.run("{ var x = greeting; print shout(x); }", &mut diagnostics), Status::Clean);
    assert_eq!(lox.run("shout(greeting)", &mut diagnostics), Status::Clean);

    assert_eq!(buf.lines(), vec!["hi!", "hi!"]);
}

#[test]
fn clock_returns_seconds() {
    let (value, diagnostics) = evaluate("clock()");

    assert!(!diagnostics.had_error());
    match value {
        Some(Value::Number(seconds)) => assert!(seconds > 1_000_000_000.0),
        other => panic!("clock returned {:?}", other),
    }
}

#[test]
fn deep_recursion_runs_to_completion() {
    assert_eq!(
        output_of(
            r#"
            fun count(n) { if (n == 0) return 0; return count(n - 1) + 1; }
            print count(2500);
            "#
        ),
        vec!["2500"]
    );
}

#[test]
fn unbounded_recursion_is_a_runtime_error() {
    let buf = SharedBuf::default();
    let mut lox = Lox::with_output(Box::new(buf.clone()));
    let mut diagnostics = Diagnostics::new();

    let status = lox.run("fun forever(n) { return forever(n + 1); }\nforever(0);", &mut diagnostics);

    assert_eq!(status, Status::RuntimeError);
    assert_eq!(
        diagnostics.errors()[0].to_string(),
        "[line 1] Error at ')': Stack overflow."
    );

    // The depth count unwinds with the error, so later calls still work.
    diagnostics.reset();
    assert_eq!(
        lox.run("fun one() { return 1; }\nprint one();", &mut diagnostics),
        Status::Clean
    );
    assert_eq!(buf.lines(), vec!["1"]);
}
