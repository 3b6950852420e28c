use mathseq::codegen::CodeGenerator;
use mathseq::lexer;
use mathseq::optimize::{self, Pass};
use mathseq::parser::Parser;
use mathseq::tac::{InstrKind, Instruction, Operand};

fn optimized(source: &str) -> Vec<String> {
    let tokens = lexer::lex(source).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    let code = CodeGenerator::new().generate(&program);
    optimize::optimize(code)
        .iter()
        .map(|instruction| instruction.to_string())
        .collect()
}

fn instr(kind: InstrKind) -> Instruction {
    Instruction::new(kind, 1)
}

fn var(name: &str) -> Operand {
    Operand::Var(name.to_string())
}

fn lit(text: &str) -> Operand {
    Operand::Literal(text.to_string())
}

fn binary(dest: Operand, op: &str, left: Operand, right: Operand) -> Instruction {
    instr(InstrKind::Binary {
        dest,
        op: op.to_string(),
        left,
        right,
    })
}

fn assign(dest: Operand, src: Operand) -> Instruction {
    instr(InstrKind::Assign { dest, src })
}

fn render(code: &[Instruction]) -> Vec<String> {
    code.iter().map(|instruction| instruction.to_string()).collect()
}

#[test]
fn pipeline_folds_propagates_and_cleans() {
    let code = optimized(
        "func main() -> int {\n  let x: int = 2 + 3 * 4;\n  print x;\n  return x;\n}",
    );
    // 3 * 4 folds to 12 and the temp feeding it dies, but the constant
    // lands inside an already-built addition that nothing re-folds.
    assert_eq!(
        code,
        vec![
            "main:",
            "t1 = 2 + 12",
            "x = t1",
            "param x",
            "t2 = call print, x",
            "return x",
        ]
    );
}

#[test]
fn folding_handles_all_four_operators() {
    let mut code = vec![
        binary(var("a"), "+", lit("2"), lit("3")),
        binary(var("b"), "-", lit("2"), lit("3")),
        binary(var("c"), "*", lit("4"), lit("5")),
        binary(var("d"), "/", lit("9"), lit("2")),
        binary(var("e"), "%", lit("9"), lit("2")),
    ];
    optimize::ConstantFolding.run(&mut code);
    assert_eq!(
        render(&code),
        vec!["a = 5", "b = -1", "c = 20", "d = 4", "e = 9 % 2"]
    );
}

#[test]
fn folding_division_by_zero_yields_zero() {
    let mut code = vec![binary(var("a"), "/", lit("7"), lit("0"))];
    optimize::ConstantFolding.run(&mut code);
    assert_eq!(render(&code), vec!["a = 0"]);
}

#[test]
fn folding_skips_float_literals() {
    let mut code = vec![binary(var("a"), "+", lit("2.5"), lit("3"))];
    optimize::ConstantFolding.run(&mut code);
    assert_eq!(render(&code), vec!["a = 2.5 + 3"]);
}

#[test]
fn propagation_reaches_every_read_position() {
    let mut code = vec![
        assign(var("a"), lit("5")),
        instr(InstrKind::Param(var("a"))),
        instr(InstrKind::Return(Some(var("a")))),
        instr(InstrKind::IfFalse {
            condition: var("a"),
            target: "L0".to_string(),
        }),
        instr(InstrKind::Call {
            dest: Operand::Temp(0),
            function: "f".to_string(),
            args: vec![var("a")],
        }),
    ];
    optimize::ConstantPropagation.run(&mut code);
    assert_eq!(
        render(&code),
        vec![
            "a = 5",
            "param 5",
            "return 5",
            "ifFalse 5 goto L0",
            "t0 = call f, 5",
        ]
    );
}

#[test]
fn propagation_keeps_stale_constants_after_plain_reassignment() {
    // A non-constant reassignment does not evict the old binding, so
    // later reads still see the stale 5.
    let mut code = vec![
        assign(var("a"), lit("5")),
        assign(var("a"), var("b")),
        instr(InstrKind::Param(var("a"))),
    ];
    optimize::ConstantPropagation.run(&mut code);
    assert_eq!(render(&code), vec!["a = 5", "a = b", "param 5"]);
}

#[test]
fn propagation_evicts_on_computed_destinations() {
    let mut code = vec![
        assign(var("a"), lit("5")),
        instr(InstrKind::Call {
            dest: var("a"),
            function: "f".to_string(),
            args: Vec::new(),
        }),
        instr(InstrKind::Param(var("a"))),
    ];
    optimize::ConstantPropagation.run(&mut code);
    assert_eq!(render(&code), vec!["a = 5", "a = call f", "param a"]);
}

#[test]
fn algebraic_identities() {
    let mut code = vec![
        binary(var("a"), "+", var("x"), lit("0")),
        binary(var("b"), "-", var("x"), lit("0")),
        binary(var("c"), "*", var("x"), lit("1")),
        binary(var("d"), "*", var("x"), lit("0")),
        binary(var("e"), "+", lit("0"), var("x")),
        binary(var("f"), "*", lit("1"), var("x")),
    ];
    optimize::AlgebraicSimplification.run(&mut code);
    assert_eq!(
        render(&code),
        vec!["a = x", "b = x", "c = x", "d = 0", "e = x", "f = x"]
    );
}

#[test]
fn self_assignment_is_dropped() {
    let mut code = vec![
        assign(var("a"), var("a")),
        assign(var("a"), var("b")),
        assign(Operand::Temp(0), Operand::Temp(0)),
    ];
    optimize::RedundantAssignmentRemoval.run(&mut code);
    assert_eq!(render(&code), vec!["a = b"]);
}

#[test]
fn add_zero_collapses_through_the_pipeline() {
    let code = vec![binary(var("a"), "+", var("a"), lit("0"))];
    // x + 0 becomes a self-assignment, which then disappears.
    assert!(optimize::optimize(code).is_empty());
}

#[test]
fn dead_temp_assignments_are_removed() {
    let mut code = vec![
        assign(Operand::Temp(0), lit("5")),
        assign(Operand::Temp(1), lit("6")),
        instr(InstrKind::Param(Operand::Temp(1))),
    ];
    optimize::DeadCodeElimination.run(&mut code);
    assert_eq!(render(&code), vec!["t1 = 6", "param t1"]);
}

#[test]
fn dead_code_never_touches_named_variables() {
    let mut code = vec![assign(var("x"), lit("5"))];
    optimize::DeadCodeElimination.run(&mut code);
    assert_eq!(render(&code), vec!["x = 5"]);
}

#[test]
fn store_operands_keep_temps_alive() {
    let mut code = vec![
        assign(Operand::Temp(0), lit("[]")),
        assign(Operand::Temp(1), lit("7")),
        instr(InstrKind::Store {
            dest: Operand::Temp(0),
            value: Operand::Temp(1),
            index: lit("0"),
        }),
        instr(InstrKind::Param(Operand::Temp(0))),
    ];
    optimize::DeadCodeElimination.run(&mut code);
    assert_eq!(
        render(&code),
        vec!["t0 = []", "t1 = 7", "t0 = t1 STORE 0", "param t0"]
    );
}

#[test]
fn pipeline_is_stable_on_settled_input() {
    let source =
        "func main() -> int {\n  let x: int = 5;\n  print x;\n  return x;\n}";
    let tokens = lexer::lex(source).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    let code = CodeGenerator::new().generate(&program);
    let once = optimize::optimize(code);
    let twice = optimize::optimize(once.clone());
    assert_eq!(render(&once), render(&twice));
}
