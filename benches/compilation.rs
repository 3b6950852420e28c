use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mathseq::codegen::CodeGenerator;
use mathseq::lexer;
use mathseq::optimize;
use mathseq::parser::Parser;
use mathseq::semantic::SemanticAnalyzer;

const PROGRAM: &str = r#"
func square(n: int) -> int {
    return n * n
}

func small(n: int) -> bool {
    return n < 50
}

func main() -> int {
    let base: sequence = [1, 2, 3, 4, 5, 6, 7, 8]
    let squares: sequence = map(base, square)
    let kept: sequence = filter(squares, small)
    let total: int = 0
    let i: int = 0
    while i < length(kept) {
        total = total + kept[i]
        i = i + 1
    }
    print "total" total
    return total
}
"#;

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("lex", |b| {
        b.iter(|| lexer::lex(black_box(PROGRAM)).unwrap())
    });

    let tokens = lexer::lex(PROGRAM).unwrap();
    c.bench_function("parse", |b| {
        b.iter(|| Parser::new(black_box(tokens.clone())).parse().unwrap())
    });

    let program = Parser::new(tokens).parse().unwrap();
    c.bench_function("analyze", |b| {
        b.iter(|| {
            let mut analyzer = SemanticAnalyzer::new();
            analyzer.analyze(black_box(&program))
        })
    });

    c.bench_function("codegen", |b| {
        b.iter(|| CodeGenerator::new().generate(black_box(&program)))
    });

    let code = CodeGenerator::new().generate(&program);
    c.bench_function("optimize", |b| {
        b.iter(|| optimize::optimize(black_box(code.clone())))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
