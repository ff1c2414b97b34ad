use rox::ast_printer::AstPrinter;
use rox::error::Diagnostics;
use rox::parser::Parser;
use rox::scanner::scan_tokens;
use rox::stmt::Stmt;

fn parse_program(source: &str) -> (Vec<Stmt>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens(source, &mut diagnostics);
    let statements = Parser::new(tokens).parse(&mut diagnostics);
    (statements, diagnostics)
}

fn print_program(source: &str) -> Vec<String> {
    let (statements, diagnostics) = parse_program(source);
    assert!(
        !diagnostics.had_error(),
        "unexpected errors: {:?}",
        diagnostics.errors()
    );
    statements.iter().map(AstPrinter::print_stmt).collect()
}

fn print_expression(source: &str) -> String {
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens(source, &mut diagnostics);
    let expr = Parser::new(tokens)
        .parse_expression(&mut diagnostics)
        .expect("expression parses");
    AstPrinter::print(&expr)
}

fn error_messages(source: &str) -> Vec<String> {
    let (_, diagnostics) = parse_program(source);
    diagnostics.errors().iter().map(|e| e.to_string()).collect()
}

#[test]
fn precedence_ladder() {
    assert_eq!(print_expression("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
    assert_eq!(print_expression("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
    assert_eq!(print_expression("-a < 3 == !b"), "(== (< (- a) 3.0) (! b))");
    assert_eq!(print_expression("a or b and c"), "(or a (and b c))");
    assert_eq!(print_expression("1 - 2 - 3"), "(- (- 1.0 2.0) 3.0)");
}

#[test]
fn ternary_is_right_associative() {
    assert_eq!(print_expression("a ? b : c ? d : e"), "(?: a b (?: c d e))");
}

#[test]
fn comma_sequences_at_the_lowest_level() {
    assert_eq!(print_program("a, b = 1;"), vec!["(; (, a (= b 1.0)))"]);
}

#[test]
fn calls_and_properties_chain_left_to_right() {
    assert_eq!(
        print_expression("f(1)(2).x.y(3)"),
        "(call (. (. (call (call f 1.0) 2.0) x) y) 3.0)"
    );
    assert_eq!(print_program("a.b.c = 4;"), vec!["(; (= (. (. a b) c) 4.0))"]);
}

#[test]
fn for_loop_desugars_into_block_and_while() {
    assert_eq!(
        print_program("for (var i = 0; i < 3; i = i + 1) print i;"),
        vec!["(block (var i 0.0) (while (< i 3.0) (print i) (= i (+ i 1.0))))"]
    );

    assert_eq!(print_program("for (;;) break;"), vec!["(while true (break))"]);
}

#[test]
fn declarations() {
    assert_eq!(
        print_program("fun add(a, b) { return a + b; }"),
        vec!["(fun add(a b) (return (+ a b)))"]
    );

    assert_eq!(
        print_program("class B < A { init(x) { this.x = x; } get() { return super.get(); } }"),
        vec!["(class B < A (method init(x) (; (= (. this x) x))) (method get() (return (call (super get)))))"]
    );

    assert_eq!(
        print_program("var f = fun (x) { return x; };"),
        vec!["(var f (fun (x) (return x)))"]
    );
}

#[test]
fn anonymous_function_can_start_an_expression_statement() {
    assert_eq!(print_program("fun () {};"), vec!["(; (fun ()))"]);
}

#[test]
fn syntax_errors_are_collected_after_synchronizing() {
    let messages = error_messages("print ;\nvar = 1;\nprint 3;");

    assert_eq!(
        messages,
        vec![
            "[line 1] Error at ';': Expected expression",
            "[line 2] Error at '=': Expected variable name",
        ]
    );

    // The statement after the errors still parses.
    let (statements, _) = parse_program("print ;\nvar = 1;\nprint 3;");
    assert_eq!(statements.len(), 1);
}

#[test]
fn missing_token_at_end_reports_at_end() {
    assert_eq!(
        error_messages("print 1"),
        vec!["[line 1] Error at end: Expected ';' after value"]
    );
}

#[test]
fn invalid_assignment_target_is_not_fatal() {
    let (statements, diagnostics) = parse_program("1 + 2 = 3; print 4;");

    assert_eq!(
        diagnostics
            .errors()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>(),
        vec!["[line 1] Error at '=': Invalid assignment target"]
    );
    assert_eq!(statements.len(), 2);
}

#[test]
fn argument_cap_is_reported_but_parsing_continues() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", args.join(", "));

    let (statements, diagnostics) = parse_program(&source);

    assert_eq!(diagnostics.errors().len(), 1);
    assert!(diagnostics.errors()[0]
        .to_string()
        .ends_with("Can't have more than 255 arguments"));
    assert_eq!(statements.len(), 1);
}

#[test]
fn parameter_cap_is_reported() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));

    let messages = error_messages(&source);

    assert_eq!(messages.len(), 1);
    assert!(messages[0].ends_with("Can't have more than 255 parameters"));
}

#[test]
fn repl_mode_prints_a_trailing_expression() {
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens("var a = 1; a + 2", &mut diagnostics);
    let statements = Parser::new(tokens).repl(true).parse(&mut diagnostics);

    assert!(!diagnostics.had_error());
    assert_eq!(
        statements.iter().map(AstPrinter::print_stmt).collect::<Vec<_>>(),
        vec!["(var a 1.0)", "(print (+ a 2.0))"]
    );
}

#[test]
fn expression_ids_continue_from_the_given_start() {
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens("a = b;", &mut diagnostics);
    let mut parser = Parser::new(tokens).with_first_id(10);
    parser.parse(&mut diagnostics);

    assert_eq!(parser.next_expr_id(), 12);
}
