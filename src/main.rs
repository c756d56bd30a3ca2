#![allow(non_snake_case)]
use RustedCalc::Examples::calc_examples::calc_examples;
use RustedCalc::Utils::config::CalcConfig;
use RustedCalc::Utils::logger::init_logger;
use RustedCalc::calculator::calculate_with;
use std::env;

/// `RustedCalc "2x + 1" x=3` evaluates the expression; without arguments the examples run.
/// A `calc.toml` in the working directory overrides the default settings.
fn main() {
    let config = match CalcConfig::from_optional_file("calc.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("calc.toml: {}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = init_logger(&config.log_level, None) {
        eprintln!("logger not started: {}", e);
    }
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        for example in 0..=6 {
            println!("\n========== example {} ==========", example);
            calc_examples(example);
        }
        return;
    }
    let mut ctx = config.evaluation_context();
    for binding in &args[1..] {
        let parsed = binding
            .split_once('=')
            .and_then(|(name, value)| value.trim().parse::<f64>().ok().map(|v| (name.trim(), v)));
        match parsed {
            Some((name, value)) => ctx.set_variable(name, value),
            None => {
                eprintln!("binding must look like name=value, got '{}'", binding);
                std::process::exit(2);
            }
        }
    }
    match calculate_with(&args[0], &ctx) {
        Ok(result) => println!("{}", result.rendered),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
