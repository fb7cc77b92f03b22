use std::io::Read;
use welt::{codegen, error::Diagnostics, lex::Lexer, parse};

fn main() {
    let mut source = String::new();
    if let Err(error) = std::io::stdin().read_to_string(&mut source) {
        eprintln!("Failed to read stdin: {}", error);
        return;
    }

    let lexer = Lexer::new(&source);

    let diagnostics = match lexer.try_exhaustive() {
        Err(errors) => Diagnostics::from(errors).kind("Lexical error"),

        Ok(tokens) => {
            print!("Tokens: {:#?}\n\n", tokens);

            match parse::parse(&tokens) {
                Err(error) => Diagnostics::from(error).kind("Syntax error"),

                Ok(ast) => {
                    print!("Ast: {:#?}\n\n", ast);

                    let stdout = std::io::stdout();
                    match codegen::emit(&ast, Some("<stdin>"), &mut stdout.lock()) {
                        Err(error) => {
                            eprintln!("Failed to emit listing: {}", error);
                            return;
                        }

                        Ok(()) => Diagnostics::default(),
                    }
                }
            }
        }
    };

    eprint!("{}", diagnostics.origin("<stdin>", &source));
}
