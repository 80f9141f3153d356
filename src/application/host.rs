//! Application host: owns context and registry, drives one invocation
//!
//! Lifecycle:
//! `Uninitialized -> ContextBuilt -> Ready -> Executing -> Completed`,
//! with `Executing -> Failed` when a command errors or panics. Shutdown runs
//! at most once, whatever state the host ends in.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use tracing::{debug, error, info, instrument, warn};

use crate::application::registry::{CommandCatalog, CommandRegistry};
use crate::application::services::{PropertyLoader, PropertySource, SeedReport};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{CommandResult, Context, ContextStore, HostInfo};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Error returned by an application's shutdown hook.
pub type ShutdownError = Box<dyn std::error::Error + Send + Sync>;

/// Extension points a concrete command-line application supplies.
pub trait Application {
    /// Context type every command of this application executes against.
    type Context: Context;

    /// Name, version and description shown to users and commands.
    fn info(&self) -> HostInfo;

    /// Module path the registry keeps commands from, usually
    /// `concat!(module_path!(), "::commands")`. Empty keeps all declared commands.
    fn command_namespace(&self) -> &str;

    /// Declare candidate commands.
    fn declare_commands(&self, catalog: &mut CommandCatalog<Self::Context>);

    /// Build the application's context around the seeded store.
    fn create_context(&self, store: ContextStore) -> ApplicationResult<Self::Context>;

    /// Default properties shipped with the application.
    fn embedded_properties(&self) -> Option<PropertySource> {
        None
    }

    /// User or deployment properties; overrides embedded ones.
    fn external_properties(&self, settings: &Settings) -> Option<PropertySource> {
        settings.properties_file.clone().map(PropertySource::File)
    }

    /// Cleanup at the end of the run, called exactly once.
    fn shutdown(&mut self) -> Result<(), ShutdownError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Uninitialized,
    ContextBuilt,
    Ready,
    Executing,
    Completed,
    Failed,
}

impl HostState {
    fn name(self) -> &'static str {
        match self {
            HostState::Uninitialized => "uninitialized",
            HostState::ContextBuilt => "context-built",
            HostState::Ready => "ready",
            HostState::Executing => "executing",
            HostState::Completed => "completed",
            HostState::Failed => "failed",
        }
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Orchestrates one run of an [`Application`].
pub struct Host<A: Application> {
    app: A,
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    state: HostState,
    info: HostInfo,
    context: Option<A::Context>,
    registry: Option<CommandRegistry<A::Context>>,
    seed_report: Option<SeedReport>,
    shut_down: bool,
}

impl<A: Application> Host<A> {
    pub fn new(app: A, settings: Settings) -> Self {
        Self::with_fs(app, settings, Arc::new(RealFileSystem))
    }

    /// Create a host with a custom filesystem (for testing).
    pub fn with_fs(app: A, settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let mut info = app.info();
        info.command_namespace = app.command_namespace().to_string();
        Self {
            app,
            settings,
            fs,
            state: HostState::Uninitialized,
            info,
            context: None,
            registry: None,
            seed_report: None,
            shut_down: false,
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn info(&self) -> &HostInfo {
        &self.info
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace settings before [`start`](Self::start); they are read only while starting.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn context(&self) -> Option<&A::Context> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut A::Context> {
        self.context.as_mut()
    }

    pub fn registry(&self) -> Option<&CommandRegistry<A::Context>> {
        self.registry.as_ref()
    }

    /// How the property sources fared while building the context.
    pub fn seed_report(&self) -> Option<&SeedReport> {
        self.seed_report.as_ref()
    }

    /// Build the context, then the registry. On error the host never becomes `Ready`.
    #[instrument(skip(self), fields(app = %self.info.name))]
    pub fn start(&mut self) -> ApplicationResult<()> {
        self.expect_state(HostState::Uninitialized)?;

        let mut store = ContextStore::new(self.info.clone());
        let embedded = self.app.embedded_properties();
        let external = self.app.external_properties(&self.settings);
        let report = PropertyLoader::new(Arc::clone(&self.fs)).seed(
            &mut store,
            embedded.as_ref(),
            external.as_ref(),
        );
        self.seed_report = Some(report);
        self.context = Some(self.app.create_context(store)?);
        self.state = HostState::ContextBuilt;
        debug!("start: context built");

        let mut catalog = CommandCatalog::new();
        self.app.declare_commands(&mut catalog);
        let registry = CommandRegistry::build(&self.info.command_namespace, catalog)?;
        debug!("start: {} commands registered", registry.len());
        self.registry = Some(registry);
        self.state = HostState::Ready;
        Ok(())
    }

    /// Resolve, parse and execute one command.
    ///
    /// Unknown names and argument errors leave the host `Ready` without
    /// touching the context. A command returning `Err` or panicking moves the
    /// host to `Failed` and yields [`ApplicationError::CommandAborted`].
    #[instrument(skip(self, args))]
    pub fn invoke(&mut self, name: &str, args: &[String]) -> ApplicationResult<CommandResult> {
        self.expect_state(HostState::Ready)?;
        let (registry, context) = match (self.registry.as_ref(), self.context.as_mut()) {
            (Some(registry), Some(context)) => (registry, context),
            _ => {
                return Err(ApplicationError::InvalidState {
                    expected: HostState::Ready.name(),
                    actual: self.state.name(),
                })
            }
        };

        let entry = registry.resolve(name)?;
        let mut command = entry.instantiate(args)?;

        self.state = HostState::Executing;
        debug!("invoke: executing [{}]", name);
        let outcome = run_contained(|| command.execute(context));

        match outcome {
            Ok(Ok(result)) => {
                self.state = HostState::Completed;
                info!("invoke: [{}] finished: {}", name, result);
                Ok(result)
            }
            Ok(Err(e)) => {
                self.state = HostState::Failed;
                error!("invoke: [{}] returned error: {}", name, e);
                Err(ApplicationError::CommandAborted {
                    command: name.to_string(),
                    message: e.to_string(),
                })
            }
            Err(message) => {
                self.state = HostState::Failed;
                error!("invoke: [{}] panicked: {}", name, message);
                Err(ApplicationError::CommandAborted {
                    command: name.to_string(),
                    message,
                })
            }
        }
    }

    /// Run the application's shutdown hook once. Failures are logged only.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            debug!("shutdown: already done");
            return;
        }
        self.shut_down = true;
        if let Err(e) = self.app.shutdown() {
            warn!("Shutdown of {} failed: {}", self.info.name, e);
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Give back the application, e.g. to inspect it after a run.
    pub fn into_app(self) -> A {
        self.app
    }

    fn expect_state(&self, expected: HostState) -> ApplicationResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.state_error(expected))
        }
    }

    fn state_error(&self, expected: HostState) -> ApplicationError {
        ApplicationError::InvalidState {
            expected: expected.name(),
            actual: self.state.name(),
        }
    }
}

thread_local! {
    static CONTAINED: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Run `f`, turning a panic into its message. Panics caught here bypass the
/// previously installed hook so the host's report is the only one printed.
fn run_contained<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CONTAINED.with(Cell::get) {
                debug!("contained panic: {}", info);
            } else {
                previous(info);
            }
        }));
    });

    let outer = CONTAINED.with(|flag| flag.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINED.with(|flag| flag.set(outer));
    outcome.map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
