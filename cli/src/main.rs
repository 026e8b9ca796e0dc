use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tabula_core::{
    IrModule, Script, TabulaErrorExt, UserConfig, compile_source_to_ir, generate_ast_from_source,
    generate_error_report,
};

mod logger;
mod output;

use output::FormatStyle;

fn main() -> ExitCode {
    let cli = Command::new("Tabula CLI")
        .version("0.1.0")
        .about("Translate matrix/frame scripts into structured SSA IR");

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    dispatch_commands(&matches)
}

/// Sets up the CLI with subcommands and arguments.
fn setup_cli(cli: Command) -> Command {
    cli.subcommand(
        Command::new("build")
            .about("Parse and translate the specified script file")
            .arg(
                Arg::new("file")
                    .help("The script file to build")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::new("arg")
                    .help("Script argument referenced as $NAME, may be repeated")
                    .short('a')
                    .long("arg")
                    .action(ArgAction::Append)
                    .value_parser(parse_script_arg)
                    .value_name("NAME=VALUE"),
            )
            .arg(
                Arg::new("config")
                    .help("JSON configuration file with import paths")
                    .short('c')
                    .long("config")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("dump")
                    .help("Specify what to print")
                    .short('d')
                    .long("dump")
                    .value_parser(["ast", "ir", "functions"])
                    .default_value("ir")
                    .value_name("STAGE"),
            )
            .arg(
                Arg::new("output")
                    .help("Specify the output file")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("verbose")
                    .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::Count),
            ),
    )
}

fn parse_script_arg(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

/// Dispatches the command based on the parsed arguments.
fn dispatch_commands(matches: &ArgMatches) -> ExitCode {
    match matches.subcommand() {
        Some(("build", sub_m)) => {
            if let Err(err) = logger::init(sub_m.get_count("verbose")) {
                eprintln!("{}", err);
            }
            match build(sub_m) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    let style = FormatStyle::default();
                    eprintln!("{}", style.error.apply_to(generate_error_report(err.as_ref())));
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            println!("No valid subcommand was used. Use --help for more information.");
            ExitCode::FAILURE
        }
    }
}

fn build(sub_m: &ArgMatches) -> Result<(), Box<dyn TabulaErrorExt>> {
    let file = sub_m
        .get_one::<String>("file")
        .ok_or_else(|| cli_error("missing script file"))?;
    let script = Script::new(PathBuf::from(file))?;

    let args: BTreeMap<String, String> = sub_m
        .get_many::<(String, String)>("arg")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let config = match sub_m.get_one::<PathBuf>("config") {
        Some(path) => UserConfig::load_from_file(path).map_err(cli_error)?,
        None => UserConfig::default(),
    };

    let stage = sub_m.get_one::<String>("dump").map(String::as_str).unwrap_or("ir");
    let text = match stage {
        "ast" => format!("{:#?}\n", generate_ast_from_source(&script)?),
        "functions" => {
            let module = compile_source_to_ir(&script, &args, &config)?;
            log_summary(&module);
            output::render_functions(&module)
        }
        _ => {
            let module = compile_source_to_ir(&script, &args, &config)?;
            log_summary(&module);
            module.to_string()
        }
    };

    match sub_m.get_one::<PathBuf>("output") {
        Some(path) => fs::write(path, text)
            .map_err(|e| cli_error(format!("cannot write {}: {}", path.display(), e))),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn log_summary(module: &IrModule) {
    log::info!(
        "translated {} function(s), {} top-level op(s), {} warning(s)",
        module.functions.len(),
        module.entry.ops.len(),
        module.diagnostics.len()
    );
}

fn cli_error(message: impl Into<String>) -> Box<dyn TabulaErrorExt> {
    Box::new(output::CliError {
        message: message.into(),
    })
}
