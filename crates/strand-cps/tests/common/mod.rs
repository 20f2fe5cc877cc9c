#![allow(dead_code)]

pub mod sim;

use strand_cps::{Compiler, TransformConfig};
use strand_syntax::ast::Module;
use strand_syntax::printer::print_module;

pub use sim::{Simulator, Trace};

pub fn compile(source: &str) -> Module {
    compile_with(TransformConfig::default(), source)
}

pub fn compile_with(config: TransformConfig, source: &str) -> Module {
    let compiler = Compiler::with_config(config).unwrap_or_else(|e| panic!("invalid config: {}", e));
    match compiler.compile_source(source) {
        Ok(out) => out.output,
        Err(errors) => panic!("compile failed: {:?}", errors),
    }
}

pub fn compile_to_string(source: &str) -> String {
    print_module(&compile(source))
}

/// Compile `source` and run its `main` to completion.
pub fn run(source: &str) -> Trace {
    let module = compile(source);
    match Simulator::new().run(&module, "main") {
        Ok(trace) => trace,
        Err(err) => panic!("simulation failed: {}\n{}", err, print_module(&module)),
    }
}

/// Run `source` without compiling it. Only valid for programs without
/// wait-blocks.
pub fn run_plain(source: &str) -> Trace {
    let module = strand_syntax::parse_module(source).unwrap();
    Simulator::new().run(&module, "main").unwrap()
}

pub fn trace(lines: &[(u64, &str)]) -> Trace {
    lines.iter().map(|(t, s)| (*t, s.to_string())).collect()
}
