use std::env;
use std::fs;
use std::process;

use mathseq::codegen::CodeGenerator;
use mathseq::interpreter::Interpreter;
use mathseq::lexer;
use mathseq::optimize;
use mathseq::parser::Parser;
use mathseq::semantic::SemanticAnalyzer;

struct Options {
    input: String,
    print_tokens: bool,
    print_ast: bool,
    optimize: bool,
    output: Option<String>,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    };

    if let Err(message) = run(&options) {
        eprintln!("{}", message);
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let program = args.first().map(String::as_str).unwrap_or("mathseq");
    let mut input = None;
    let mut print_tokens = false;
    let mut print_ast = false;
    let mut optimize = true;
    let mut output = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-tokens" => print_tokens = true,
            "-ast" => print_ast = true,
            "-no-opt" => optimize = false,
            "-output" => {
                i += 1;
                match args.get(i) {
                    Some(path) => output = Some(path.clone()),
                    None => return Err("-output requires a file name".to_string()),
                }
            }
            arg if input.is_none() => input = Some(arg.to_string()),
            arg => return Err(format!("unknown option '{}'", arg)),
        }
        i += 1;
    }

    let Some(input) = input else {
        return Err(usage(program));
    };

    Ok(Options {
        input,
        print_tokens,
        print_ast,
        optimize,
        output,
    })
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <input_file> [options]\n\
         Options:\n\
         \x20 -tokens    Print tokens\n\
         \x20 -ast       Print AST\n\
         \x20 -no-opt    Disable optimization\n\
         \x20 -output <file> Output file for generated code",
        program
    )
}

fn run(options: &Options) -> Result<(), String> {
    let source = fs::read_to_string(&options.input)
        .map_err(|_| format!("Error: Could not open file '{}'", options.input))?;

    println!("Compiling: {}", options.input);
    println!("=========================================");

    println!("Phase 1: Lexical Analysis...");
    let tokens = lexer::lex(&source).map_err(|error| format!("Lexical error: {}", error))?;
    if options.print_tokens {
        println!("Tokens:");
        println!("=======");
        for token in &tokens {
            println!("{}", token);
        }
        println!();
    }

    println!("Phase 2: Syntax Analysis...");
    let mut parser = Parser::new(tokens);
    let program = parser
        .parse()
        .map_err(|error| format!("Parse Error: {}", error))?;
    if options.print_ast {
        println!("Abstract Syntax Tree:");
        println!("=====================");
        println!("{}", program);
    }

    println!("Phase 3: Semantic Analysis...");
    let mut semantic = SemanticAnalyzer::new();
    let semantic_ok = semantic.analyze(&program);
    if !semantic.warnings().is_empty() {
        println!("Warnings:");
        println!("=========");
        for warning in semantic.warnings() {
            println!("  {}", warning);
        }
        println!();
    }
    if !semantic.errors().is_empty() {
        println!("Errors:");
        println!("=======");
        for error in semantic.errors() {
            println!("  {}", error);
        }
        println!();
    }
    if !semantic_ok {
        return Err("Compilation failed due to semantic errors!".to_string());
    }

    println!("Phase 4: Intermediate Code Generation...");
    let mut codegen = CodeGenerator::new();
    let code = codegen.generate(&program);
    println!("Generated Intermediate Code:");
    println!("============================");
    for instruction in &code {
        println!("{}", instruction);
    }
    println!();

    let final_code = if options.optimize {
        println!("Phase 5: Optimization...");
        let optimized = optimize::optimize(code);
        println!("Optimized Intermediate Code:");
        println!("============================");
        for instruction in &optimized {
            println!("{}", instruction);
        }
        optimized
    } else {
        println!("Optimization skipped.");
        code
    };
    println!();

    println!("Phase 6: Final Code Output...");
    let execution = Interpreter::new(&program).run();
    match &execution.result {
        Ok(_) => {
            println!("Program Output:");
            println!("===============");
            if execution.output.is_empty() {
                println!("(no print statements)");
            } else {
                for line in &execution.output {
                    println!("{}", line);
                }
            }
        }
        Err(error) => println!("Program Output skipped: {}", error),
    }
    println!();

    let mut listing = String::new();
    listing.push_str("; MathSeq Compiler Output\n");
    listing.push_str(&format!("; Source: {}\n", options.input));
    listing.push_str("; =======================\n\n");
    for instruction in &final_code {
        listing.push_str(&format!("{}\n", instruction));
    }
    listing.push_str("\n; Program Output\n; --------------\n");
    match &execution.result {
        Ok(exit_code) => {
            if execution.output.is_empty() {
                listing.push_str("; (no print statements)\n");
            } else {
                for line in &execution.output {
                    listing.push_str(&format!("; {}\n", line));
                }
            }
            listing.push_str(&format!("; Exit Code: {}\n", exit_code));
        }
        Err(error) => listing.push_str(&format!("; Execution skipped: {}\n", error)),
    }

    match &options.output {
        Some(path) => {
            fs::write(path, &listing)
                .map_err(|_| format!("Error: Could not create file '{}'", path))?;
            println!("Output written to '{}'", path);
        }
        None => {
            println!("Final Output:");
            println!("=============");
            print!("{}", listing);
        }
    }

    println!();
    println!("Compilation completed successfully!");
    Ok(())
}
