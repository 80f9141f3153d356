//! Sample client built on cmdhost: a `login` command storing the user in the
//! context and a `whoami` command reading it back.

use cmdhost::application::ShutdownError;
use cmdhost::cli::output;
use cmdhost::{
    Application, CommandCatalog, Context, ContextStore, HostInfo, PropertySource,
};

/// Context key holding the current user.
pub const LOGGED_IN_USER: &str = "loggedInUser";

/// Context of the sample client: the shared store plus typed accessors.
#[derive(Debug)]
pub struct SampleContext {
    store: ContextStore,
}

impl SampleContext {
    pub fn logged_in_user(&self) -> Option<&str> {
        self.store.get_string(LOGGED_IN_USER)
    }

    pub fn set_logged_in_user(&mut self, user: &str) {
        self.store.put(LOGGED_IN_USER, user);
    }
}

impl Context for SampleContext {
    fn store(&self) -> &ContextStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut ContextStore {
        &mut self.store
    }
}

mod commands {
    use clap::Parser;
    use cmdhost::cli::output;
    use cmdhost::{Command, CommandCatalog, CommandError, CommandResult, Context};

    use super::SampleContext;

    pub fn declare(catalog: &mut CommandCatalog<SampleContext>) {
        cmdhost::register!(catalog, Login, Whoami);
    }

    #[derive(Parser, Debug)]
    #[command(name = "login", about = "Logs a user into the client.")]
    pub struct Login {
        /// The username to login with.
        #[arg(short, long)]
        user: String,
    }

    impl Command<SampleContext> for Login {
        fn execute(&mut self, ctx: &mut SampleContext) -> Result<CommandResult, CommandError> {
            let max = ctx.store().get_int_or("login.max_user_length", 32);
            if i64::try_from(self.user.chars().count())? > max {
                return Ok(CommandResult::failure(format!(
                    "user name longer than {max} characters"
                )));
            }
            ctx.set_logged_in_user(&self.user);
            if ctx.store().get_bool("login.announce") {
                output::info(&format!("Logged in as user [{}].", self.user));
            }
            Ok(CommandResult::Ok)
        }
    }

    /// Shows the logged in user.
    #[derive(Parser, Debug)]
    #[command(name = "whoami")]
    pub struct Whoami;

    impl Command<SampleContext> for Whoami {
        fn execute(&mut self, ctx: &mut SampleContext) -> Result<CommandResult, CommandError> {
            match ctx.logged_in_user() {
                Some(user) => {
                    let client = ctx.store().get_string_or("client.name", &ctx.host().name);
                    output::info(&format!("{user} @ {client}"));
                    Ok(CommandResult::Ok)
                }
                None => Ok(CommandResult::failure("not logged in")),
            }
        }
    }
}

/// The sample application wiring commands, context and properties together.
#[derive(Debug, Default)]
pub struct SampleClient;

impl Application for SampleClient {
    type Context = SampleContext;

    fn info(&self) -> HostInfo {
        HostInfo::new(env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"))
            .with_description("Sample client for the cmdhost framework")
    }

    fn command_namespace(&self) -> &str {
        concat!(module_path!(), "::commands")
    }

    fn declare_commands(&self, catalog: &mut CommandCatalog<SampleContext>) {
        commands::declare(catalog);
    }

    fn create_context(
        &self,
        store: ContextStore,
    ) -> cmdhost::application::ApplicationResult<SampleContext> {
        Ok(SampleContext { store })
    }

    fn embedded_properties(&self) -> Option<PropertySource> {
        Some(PropertySource::inline(
            "sample-client.properties",
            include_str!("../resources/sample-client.properties"),
        ))
    }

    fn shutdown(&mut self) -> Result<(), ShutdownError> {
        output::note("Shutting down SampleClient.");
        Ok(())
    }
}

fn main() {
    let code = cmdhost::cli::run(SampleClient, std::env::args_os());
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use cmdhost::application::Host;
    use cmdhost::config::Settings;
    use cmdhost::util::testing;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        commands::Login::command().debug_assert();
        commands::Whoami::command().debug_assert();
    }

    #[test]
    fn given_sample_client_when_started_then_registers_both_commands() {
        testing::init_test_setup();
        let mut host = Host::new(SampleClient, Settings::default());

        host.start().expect("start");

        let registry = host.registry().expect("registry");
        assert_eq!(registry.names(), vec!["login", "whoami"]);
        let ctx = host.context().expect("context");
        assert_eq!(ctx.store().get_int("login.max_user_length"), 32);
    }

    #[test]
    fn given_login_when_invoked_then_context_holds_user() {
        let mut host = Host::new(SampleClient, Settings::default());
        host.start().expect("start");

        let result = host
            .invoke("login", &["--user".to_string(), "alice".to_string()])
            .expect("invoke");

        assert!(result.is_ok());
        assert_eq!(host.context().unwrap().logged_in_user(), Some("alice"));
    }
}
