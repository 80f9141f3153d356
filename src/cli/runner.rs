//! One process run: parse host arguments, start the host, dispatch, shut down

use std::ffi::OsString;

use tracing::{debug, instrument};

use crate::application::{Application, ApplicationError, Host, SourceStatus, HELP_COMMAND};
use crate::cli::args::HostArgs;
use crate::cli::error::{CliError, CliResult};
use crate::cli::logging::setup_logging;
use crate::cli::output;
use crate::config::Settings;
use crate::exitcode;

/// Run `app` with settings from the standard locations. Returns the process exit code.
///
/// ```ignore
/// fn main() {
///     std::process::exit(cmdhost::cli::run(SampleClient::default(), std::env::args()));
/// }
/// ```
pub fn run<A, I, T>(app: A, argv: I) -> i32
where
    A: Application,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let settings = Settings::load(&app.info().name);
    drive(app, settings, argv)
}

/// Run `app` with explicit settings (the `--properties` flag still overrides them).
pub fn run_with_settings<A, I, T>(app: A, settings: Settings, argv: I) -> i32
where
    A: Application,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    drive(app, Ok(settings), argv)
}

fn drive<A, I, T>(app: A, settings: Result<Settings, ApplicationError>, argv: I) -> i32
where
    A: Application,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut host = Host::new(app, Settings::default());
    let code = match execute(&mut host, settings, argv) {
        Ok(code) => code,
        Err(e) => report(&e),
    };
    host.shutdown();
    debug!("run finished with exit code {}", code);
    code
}

fn execute<A, I, T>(
    host: &mut Host<A>,
    settings: Result<Settings, ApplicationError>,
    argv: I,
) -> CliResult<i32>
where
    A: Application,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = HostArgs::try_parse_for(host.info(), argv).map_err(CliError::HostArgs)?;
    let log_level = settings.as_ref().ok().and_then(|s| s.log_level.clone());
    setup_logging(args.debug, log_level.as_deref());

    if args.config_template {
        output::info(&Settings::template(&host.info().name));
        return Ok(exitcode::OK);
    }

    let mut settings = settings.map_err(CliError::Startup)?;
    if let Some(path) = &args.properties {
        settings.properties_file = Some(path.clone());
    }
    *host.settings_mut() = settings;
    host.start().map_err(CliError::Startup)?;
    if args.properties.is_some() {
        warn_unloaded_properties(host);
    }

    let Some(name) = args.command_name() else {
        print_command_list(host);
        return Err(CliError::Usage("no command given".to_string()));
    };
    if name == HELP_COMMAND {
        return print_help(host, args.command_args());
    }

    dispatch(host, name, args.command_args())
}

#[instrument(skip(host, args))]
fn dispatch<A: Application>(host: &mut Host<A>, name: &str, args: &[String]) -> CliResult<i32> {
    let result = host.invoke(name, args)?;
    if let Some(message) = result.message() {
        output::error(message);
    }
    Ok(result.exit_code())
}

/// A file named with `--properties` is an explicit request, so tell the user.
fn warn_unloaded_properties<A: Application>(host: &Host<A>) {
    if let Some(SourceStatus::Failed { reason }) = host.seed_report().map(|r| &r.external) {
        output::warning(reason);
    }
}

fn print_command_list<A: Application>(host: &Host<A>) {
    let info = host.info();
    let Some(registry) = host.registry() else {
        return;
    };
    if info.description.is_empty() {
        output::header(&format!("{} {}", info.name, info.version));
    } else {
        output::header(&format!("{} {}: {}", info.name, info.version, info.description));
    }
    output::info("");
    output::info(&format!("Usage: {} [OPTIONS] <COMMAND> [ARGS]...", info.name));
    output::info("");
    output::header("Commands:");
    output::info(&output::command_table(
        registry
            .entries()
            .map(|entry| (entry.name(), entry.description()))
            .chain(std::iter::once((
                HELP_COMMAND,
                "List commands, or show help for one command",
            ))),
    ));
}

fn print_help<A: Application>(host: &Host<A>, args: &[String]) -> CliResult<i32> {
    match args {
        [] => {
            print_command_list(host);
            Ok(exitcode::OK)
        }
        [command] => {
            let Some(registry) = host.registry() else {
                return Ok(exitcode::SOFTWARE);
            };
            let entry = registry.resolve(command)?;
            let mut definition = entry
                .definition()
                .bin_name(format!("{} {}", host.info().name, entry.name()));
            output::info(&definition.render_help());
            Ok(exitcode::OK)
        }
        _ => Err(CliError::Usage(format!(
            "usage: {} help [COMMAND]",
            host.info().name
        ))),
    }
}

/// Show the error the way its kind calls for; returns its exit code.
fn report(e: &CliError) -> i32 {
    match e {
        CliError::HostArgs(err) | CliError::Application(ApplicationError::Arguments(err)) => {
            // clap picks stdout for help/version and stderr for real errors
            let _ = err.print();
        }
        CliError::Application(ApplicationError::UnknownCommand { name, known }) => {
            output::error(&format!("unknown command [{name}]"));
            if !known.is_empty() {
                output::note(&format!("available commands: {}", known.join(", ")));
            }
        }
        other => output::error(other),
    }
    e.exit_code()
}
