//! Command registry: name → factory lookup built once at startup
//!
//! Applications declare their commands in a [`CommandCatalog`], each tagged
//! with the module path it was declared in (see [`register!`](crate::register)).
//! Building a [`CommandRegistry`] from it keeps the commands declared at or
//! below the application's namespace, validates names and rejects
//! duplicates. Lookups are exact and case-sensitive.

use std::any::type_name;
use std::collections::BTreeMap;
use std::fmt;

use clap::Parser;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Command, Context, DomainError};

/// Name reserved for the host's built-in command listing.
pub const HELP_COMMAND: &str = "help";

/// Declare commands in a catalog under the module path of the invocation site.
///
/// ```ignore
/// mod commands {
///     pub fn declare(catalog: &mut CommandCatalog<SampleContext>) {
///         cmdhost::register!(catalog, Login, Whoami);
///     }
/// }
/// ```
#[macro_export]
macro_rules! register {
    ($catalog:expr, $($command:ty),+ $(,)?) => {{
        let catalog = &mut *$catalog;
        $( catalog.register_in::<$command>(::core::module_path!()); )+
    }};
}

type Factory<C> = fn(&str, &[String]) -> Result<Box<dyn Command<C>>, clap::Error>;

/// One registered command: metadata plus a factory producing fresh instances.
pub struct CommandEntry<C: Context> {
    name: String,
    description: String,
    module_path: &'static str,
    type_path: &'static str,
    factory: Factory<C>,
    definition: fn() -> clap::Command,
}

impl<C: Context> CommandEntry<C> {
    fn of<T>(module_path: &'static str) -> Self
    where
        T: Command<C> + Parser + 'static,
    {
        let definition = T::command();
        Self {
            name: definition.get_name().to_string(),
            description: definition
                .get_about()
                .map(|about| about.to_string())
                .unwrap_or_default(),
            module_path,
            type_path: type_name::<T>(),
            factory: parse_boxed::<C, T>,
            definition: T::command,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Module the command was declared in. Namespace filtering matches on this.
    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// Compiler-reported type name, for diagnostics only.
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Parse a new instance from the arguments following the command name.
    pub fn instantiate(&self, args: &[String]) -> ApplicationResult<Box<dyn Command<C>>> {
        Ok((self.factory)(&self.name, args)?)
    }

    /// Argument definition, used to render per-command help.
    pub fn definition(&self) -> clap::Command {
        (self.definition)()
    }

    fn in_namespace(&self, namespace: &str) -> bool {
        namespace.is_empty()
            || self
                .module_path
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    }
}

impl<C: Context> fmt::Debug for CommandEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("module_path", &self.module_path)
            .field("type_path", &self.type_path)
            .finish()
    }
}

fn parse_boxed<C, T>(name: &str, args: &[String]) -> Result<Box<dyn Command<C>>, clap::Error>
where
    C: Context,
    T: Command<C> + Parser + 'static,
{
    let argv = std::iter::once(name.to_string()).chain(args.iter().cloned());
    let command = T::try_parse_from(argv)?;
    Ok(Box::new(command))
}

/// Candidate commands declared by an application.
pub struct CommandCatalog<C: Context> {
    entries: Vec<CommandEntry<C>>,
}

impl<C: Context> Default for CommandCatalog<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C: Context> CommandCatalog<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a command type living in `module_path`, normally `module_path!()`
    /// at the declaration site. Name and description come from its clap metadata.
    pub fn register_in<T>(&mut self, module_path: &'static str) -> &mut Self
    where
        T: Command<C> + Parser + 'static,
    {
        self.entries.push(CommandEntry::of::<T>(module_path));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Startup-built mapping from command name to command factory.
pub struct CommandRegistry<C: Context> {
    namespace: String,
    entries: BTreeMap<String, CommandEntry<C>>,
}

impl<C: Context> fmt::Debug for CommandRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("namespace", &self.namespace)
            .field("commands", &self.names())
            .finish()
    }
}

impl<C: Context> CommandRegistry<C> {
    /// Classify the catalog once: keep commands under `namespace`, validate
    /// names, fail on the first duplicate.
    ///
    /// An empty namespace keeps every declared command.
    #[instrument(skip(catalog), fields(candidates = catalog.len()))]
    pub fn build(namespace: &str, catalog: CommandCatalog<C>) -> ApplicationResult<Self> {
        let mut entries: BTreeMap<String, CommandEntry<C>> = BTreeMap::new();

        for entry in catalog.entries {
            if !entry.in_namespace(namespace) {
                debug!(
                    "build: skipping {} from {} (outside {})",
                    entry.name, entry.module_path, namespace
                );
                continue;
            }
            validate_name(&entry)?;
            if let Some(existing) = entries.get(&entry.name) {
                return Err(DomainError::DuplicateCommand {
                    name: entry.name.clone(),
                    first: existing.type_path.to_string(),
                    second: entry.type_path.to_string(),
                }
                .into());
            }
            debug!("build: registered [{}] -> {}", entry.name, entry.type_path);
            entries.insert(entry.name.clone(), entry);
        }

        Ok(Self {
            namespace: namespace.to_string(),
            entries,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, name: &str) -> ApplicationResult<&CommandEntry<C>> {
        self.entries
            .get(name)
            .ok_or_else(|| ApplicationError::UnknownCommand {
                name: name.to_string(),
                known: self.names().into_iter().map(String::from).collect(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Entries sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry<C>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_name<C: Context>(entry: &CommandEntry<C>) -> ApplicationResult<()> {
    let reason = if entry.name.is_empty() {
        Some("name is empty")
    } else if entry.name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else if entry.name == HELP_COMMAND {
        Some("name is reserved by the host")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DomainError::InvalidCommandName {
            name: entry.name.clone(),
            type_path: entry.type_path.to_string(),
            reason: reason.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}
