//! Shared fixture application for integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cmdhost::application::{ApplicationError, ApplicationResult, ShutdownError};
use cmdhost::{Application, CommandCatalog, ContextStore, HostInfo, PropertySource};

pub const NAMESPACE: &str = concat!(module_path!(), "::commands");

pub mod commands {
    use clap::Parser;
    use cmdhost::{Command, CommandCatalog, CommandError, CommandResult, Context, ContextStore};

    pub fn declare(catalog: &mut CommandCatalog<ContextStore>) {
        cmdhost::register!(catalog, Login, Deny, Broken, Crash, Misread);
    }

    #[derive(Parser, Debug)]
    #[command(name = "login", about = "Logs a user into the client.")]
    pub struct Login {
        /// The username to login with.
        #[arg(short, long)]
        pub user: String,
    }

    impl Command<ContextStore> for Login {
        fn execute(&mut self, ctx: &mut ContextStore) -> Result<CommandResult, CommandError> {
            ctx.store_mut().put("loggedInUser", self.user.as_str());
            Ok(CommandResult::Ok)
        }
    }

    /// Always refuses.
    #[derive(Parser, Debug)]
    #[command(name = "deny")]
    pub struct Deny {
        /// Exit code to report.
        #[arg(long, default_value_t = 1)]
        pub code: i32,
    }

    impl Command<ContextStore> for Deny {
        fn execute(&mut self, _ctx: &mut ContextStore) -> Result<CommandResult, CommandError> {
            Ok(CommandResult::failure_with_code("access denied", self.code))
        }
    }

    /// Returns an error.
    #[derive(Parser, Debug)]
    #[command(name = "broken")]
    pub struct Broken;

    impl Command<ContextStore> for Broken {
        fn execute(&mut self, ctx: &mut ContextStore) -> Result<CommandResult, CommandError> {
            ctx.put("touched", true);
            Err("backend unreachable".into())
        }
    }

    /// Panics.
    #[derive(Parser, Debug)]
    #[command(name = "crash")]
    pub struct Crash;

    impl Command<ContextStore> for Crash {
        fn execute(&mut self, _ctx: &mut ContextStore) -> Result<CommandResult, CommandError> {
            panic!("crash requested");
        }
    }

    /// Reads an integer property that holds text.
    #[derive(Parser, Debug)]
    #[command(name = "misread")]
    pub struct Misread;

    impl Command<ContextStore> for Misread {
        fn execute(&mut self, ctx: &mut ContextStore) -> Result<CommandResult, CommandError> {
            let retries = ctx.try_get_int("client.name")?;
            Ok(CommandResult::failure(format!("unexpected {retries:?}")))
        }
    }

    pub mod shadow {
        use super::*;

        pub fn declare(catalog: &mut CommandCatalog<ContextStore>) {
            cmdhost::register!(catalog, LoginAgain);
        }

        /// Second command claiming the name `login`.
        #[derive(Parser, Debug)]
        #[command(name = "login")]
        pub struct LoginAgain;

        impl Command<ContextStore> for LoginAgain {
            fn execute(&mut self, _ctx: &mut ContextStore) -> Result<CommandResult, CommandError> {
                Ok(CommandResult::Ok)
            }
        }
    }
}

pub mod elsewhere {
    use clap::Parser;
    use cmdhost::{Command, CommandCatalog, CommandError, CommandResult, ContextStore};

    pub fn declare(catalog: &mut CommandCatalog<ContextStore>) {
        cmdhost::register!(catalog, Stray);
    }

    /// Lives outside the application's namespace.
    #[derive(Parser, Debug)]
    #[command(name = "stray")]
    pub struct Stray;

    impl Command<ContextStore> for Stray {
        fn execute(&mut self, _ctx: &mut ContextStore) -> Result<CommandResult, CommandError> {
            Ok(CommandResult::Ok)
        }
    }
}

/// Registers the regular fixture commands plus the out-of-namespace one.
pub fn standard_commands(catalog: &mut CommandCatalog<ContextStore>) {
    commands::declare(catalog);
    elsewhere::declare(catalog);
}

pub fn duplicate_commands(catalog: &mut CommandCatalog<ContextStore>) {
    commands::declare(catalog);
    commands::shadow::declare(catalog);
}

/// Configurable application using the plain [`ContextStore`] as its context.
pub struct TestApp {
    pub namespace: String,
    pub declare: fn(&mut CommandCatalog<ContextStore>),
    pub embedded: Option<PropertySource>,
    pub external: Option<PathBuf>,
    pub fail_context: bool,
    pub fail_shutdown: bool,
    pub shutdown_calls: Arc<AtomicUsize>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            declare: standard_commands,
            embedded: Some(PropertySource::inline(
                "test.properties",
                "client.name = Test Client\ntimeout = 30\nretries = 3\n",
            )),
            external: None,
            fail_context: false,
            fail_shutdown: false,
            shutdown_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TestApp {
    /// The app plus a handle on its shutdown counter.
    pub fn counted() -> (Self, Arc<AtomicUsize>) {
        let app = Self::default();
        let calls = Arc::clone(&app.shutdown_calls);
        (app, calls)
    }
}

impl Application for TestApp {
    type Context = ContextStore;

    fn info(&self) -> HostInfo {
        HostInfo::new("test-app", "1.2.3").with_description("Fixture application")
    }

    fn command_namespace(&self) -> &str {
        &self.namespace
    }

    fn declare_commands(&self, catalog: &mut CommandCatalog<ContextStore>) {
        (self.declare)(catalog);
    }

    fn create_context(&self, store: ContextStore) -> ApplicationResult<ContextStore> {
        if self.fail_context {
            return Err(ApplicationError::Startup {
                message: "context factory refused".to_string(),
            });
        }
        Ok(store)
    }

    fn embedded_properties(&self) -> Option<PropertySource> {
        self.embedded.clone()
    }

    fn external_properties(&self, settings: &cmdhost::config::Settings) -> Option<PropertySource> {
        self.external
            .clone()
            .or_else(|| settings.properties_file.clone())
            .map(PropertySource::File)
    }

    fn shutdown(&mut self) -> Result<(), ShutdownError> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_shutdown {
            return Err("cleanup failed".into());
        }
        Ok(())
    }
}

pub fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}
