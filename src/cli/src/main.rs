use std::collections::HashMap;
use std::process::ExitCode;

use clap::Command;

use libdatadrop::constants::{DATADROP, DATADROP_VERSION};

pub mod cmd;
pub mod render;

use crate::cmd::RunCmd;

const ABOUT: &str = "Drop file content from versioned datasets while keeping their history";

fn get_commands() -> HashMap<String, Box<dyn RunCmd>> {
    let commands: Vec<Box<dyn RunCmd>> = vec![Box::new(cmd::DropCmd)];
    let mut runners: HashMap<String, Box<dyn RunCmd>> = HashMap::new();
    for cmd in commands {
        runners.insert(cmd.name().to_string(), cmd);
    }
    runners
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let runners = get_commands();
    let mut command = Command::new(DATADROP)
        .version(DATADROP_VERSION)
        .about(ABOUT)
        .subcommand_required(true)
        .arg_required_else_help(true);
    for runner in runners.values() {
        command = command.subcommand(runner.args());
    }

    let matches = command.get_matches();
    let Some((name, sub_matches)) = matches.subcommand() else {
        return ExitCode::FAILURE;
    };
    let Some(runner) = runners.get(name) else {
        eprintln!("Unknown command {name}");
        return ExitCode::FAILURE;
    };

    match runner.run(sub_matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("{name} failed: {err:?}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
