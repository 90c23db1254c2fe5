//! End-to-end evaluation of complete programs.

use rpal::evaluate;

fn run(source: &str) -> String {
    let mut out = Vec::new();
    evaluate(source, &mut out).expect("evaluation failed");
    String::from_utf8(out).expect("output was not UTF-8")
}

#[test]
fn reference_scenarios() {
    let cases = [
        ("let x = 3 in Print x", "3"),
        ("Print (2 + 3 * 4)", "14"),
        (
            "let rec fact n = n eq 0 -> 1 | n * fact (n-1) in Print (fact 5)",
            "120",
        ),
        ("Print (1, 2, 3)", "(1, 2, 3)"),
        ("let f (x, y) = x + y in Print (f (2, 3))", "5"),
        ("Print (Order (1, 2, (3, 4), 5))", "4"),
    ];

    for (source, expected) in cases {
        assert_eq!(run(source), expected, "program: {source}");
    }
}

#[test]
fn fibonacci() {
    let source = "let rec fib n = n le 1 -> n | fib (n - 1) + fib (n - 2) in Print (fib 10)";
    assert_eq!(run(source), "55");
}

#[test]
fn infix_application_with_at() {
    let source = "Print ((2 @add 3) @add 4) where add x y = x + y";
    assert_eq!(run(source), "9");
}

#[test]
fn string_pipeline() {
    assert_eq!(run("Print (Conc (Stem 'hello') (Stern 'hello'))"), "hello");
}

#[test]
fn comments_are_ignored() {
    let source = "\
// squares a number
let square x = x * x // the definition
in Print (square 6) // and its use
";
    assert_eq!(run(source), "36");
}

#[test]
fn nested_definitions_compose() {
    let source = "\
let x = 2 and y = 3
in let swap (a, b) = (b, a)
   in Print (swap (x, y))
";
    assert_eq!(run(source), "(3, 2)");
}

#[test]
fn within_supplies_a_private_helper() {
    let source = "\
let inc n = n + 1
in let (g = inc within two = g (g 0))
   in Print two
";
    assert_eq!(run(source), "2");
}

#[test]
fn tuple_of_results() {
    let source = "let rec fact n = n eq 0 -> 1 | n * fact (n - 1) \
                  in Print (fact 1, fact 2, fact 3, fact 4)";
    assert_eq!(run(source), "(1, 2, 6, 24)");
}

#[test]
fn higher_order_functions() {
    let source = "\
let compose f g x = f (g x)
in let inc n = n + 1
   and double n = n * 2
   in Print (compose inc double 5)
";
    assert_eq!(run(source), "11");
}

#[test]
fn multiple_prints_append_to_the_output() {
    let source = "let p = Print 'a' in let q = Print 'b' in Print 'c'";
    assert_eq!(run(source), "abc");
}
