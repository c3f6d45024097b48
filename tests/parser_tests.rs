// Tests for the Pratt parser: statement shapes, operator precedence via
// the pretty-printer, and error collection.

use brio::ast::{Expr, Stmt};
use brio::lexer::tokenize;
use brio::parser::Parser;

fn parse(input: &str) -> brio::ast::Program {
    let mut parser = Parser::new(tokenize(input));
    let program = parser.parse_program();
    assert!(parser.errors.is_empty(), "parser errors for {:?}: {:?}", input, parser.errors);
    program
}

fn parse_single_expression(input: &str) -> Expr {
    let program = parse(input);
    assert_eq!(program.statements.len(), 1, "input {:?}", input);
    match program.statements.into_iter().next() {
        Some(Stmt::ExprStmt(expr)) => expr,
        other => panic!("expected expression statement for {:?}, got {:?}", input, other),
    }
}

#[test]
fn let_statements_bind_names() {
    let program = parse("let x = 5; let y = true; let foobar = y;");
    let names: Vec<&str> = program
        .statements
        .iter()
        .map(|stmt| match stmt {
            Stmt::Let { name, .. } => name.as_str(),
            other => panic!("expected let statement, got {:?}", other),
        })
        .collect();
    assert_eq!(names, vec!["x", "y", "foobar"]);
}

#[test]
fn let_installs_the_function_literal_name() {
    let program = parse("let fact = fn(n) { n };");
    match &program.statements[0] {
        Stmt::Let { value: Expr::Function { name, .. }, .. } => {
            assert_eq!(name.as_deref(), Some("fact"));
        }
        other => panic!("expected let of a function literal, got {:?}", other),
    }

    // Anonymous literals stay anonymous.
    match parse_single_expression("fn(n) { n }") {
        Expr::Function { name, .. } => assert_eq!(name, None),
        other => panic!("expected function literal, got {:?}", other),
    }
}

#[test]
fn return_statements() {
    let program = parse("return 5; return x;");
    assert!(matches!(program.statements[0], Stmt::Return(Expr::Int(5))));
    assert!(matches!(program.statements[1], Stmt::Return(Expr::Ident(_))));
}

#[test]
fn operator_precedence_via_pretty_printing() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("true", "true"),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
        ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
        ("add(a * b[2], b[1], 2 * [1, 2][1])", "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))"),
    ];
    for (input, expected) in cases {
        assert_eq!(parse(input).to_string(), expected, "input {:?}", input);
    }
}

#[test]
fn if_expressions_carry_their_branches() {
    match parse_single_expression("if (x < y) { x } else { y }") {
        Expr::If { condition, consequence, alternative } => {
            assert_eq!(condition.to_string(), "(x < y)");
            assert_eq!(consequence.statements.len(), 1);
            assert_eq!(alternative.expect("else branch").statements.len(), 1);
        }
        other => panic!("expected if expression, got {:?}", other),
    }

    match parse_single_expression("if (x) { x }") {
        Expr::If { alternative, .. } => assert!(alternative.is_none()),
        other => panic!("expected if expression, got {:?}", other),
    }
}

#[test]
fn while_expressions_carry_condition_and_body() {
    match parse_single_expression("while (x < 3) { puts(x); }") {
        Expr::While { condition, body } => {
            assert_eq!(condition.to_string(), "(x < 3)");
            assert_eq!(body.statements.len(), 1);
        }
        other => panic!("expected while expression, got {:?}", other),
    }
}

#[test]
fn function_literals_collect_parameters() {
    let cases: [(&str, &[&str]); 3] =
        [("fn() {}", &[]), ("fn(x) {}", &["x"]), ("fn(x, y, z) {}", &["x", "y", "z"])];
    for (input, expected) in cases {
        match parse_single_expression(input) {
            Expr::Function { parameters, .. } => {
                assert_eq!(parameters, expected, "input {:?}", input)
            }
            other => panic!("expected function literal for {:?}, got {:?}", input, other),
        }
    }
}

#[test]
fn call_expressions_collect_arguments() {
    match parse_single_expression("add(1, 2 * 3, 4 + 5)") {
        Expr::Call { function, arguments } => {
            assert_eq!(function.to_string(), "add");
            let rendered: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
            assert_eq!(rendered, vec!["1", "(2 * 3)", "(4 + 5)"]);
        }
        other => panic!("expected call expression, got {:?}", other),
    }
}

#[test]
fn array_and_hash_literals() {
    match parse_single_expression("[1, 2 * 2, 3 + 3]") {
        Expr::Array(elements) => assert_eq!(elements.len(), 3),
        other => panic!("expected array literal, got {:?}", other),
    }

    match parse_single_expression(r#"{"one": 1, "two": 2, "three": 3}"#) {
        Expr::HashLit(pairs) => {
            let keys: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
            assert_eq!(keys, vec!["one", "two", "three"]);
        }
        other => panic!("expected hash literal, got {:?}", other),
    }

    match parse_single_expression("{}") {
        Expr::HashLit(pairs) => assert!(pairs.is_empty()),
        other => panic!("expected empty hash literal, got {:?}", other),
    }
}

#[test]
fn string_literals_keep_escapes() {
    match parse_single_expression(r#""hello\nworld""#) {
        Expr::Str(s) => assert_eq!(s, "hello\nworld"),
        other => panic!("expected string literal, got {:?}", other),
    }
}

#[test]
fn parse_errors_are_collected_not_fatal() {
    let mut parser = Parser::new(tokenize("let = 5; let x 5;"));
    parser.parse_program();
    assert!(!parser.errors.is_empty());

    let mut parser = Parser::new(tokenize("@"));
    parser.parse_program();
    assert_eq!(parser.errors.len(), 1);
}
