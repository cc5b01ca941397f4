use sovran_multimethod::timer::{MessageCallback, Timer};
use sovran_multimethod::{DispatchError, DispatchRegistry, ScopedRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct CreateUser {
    name: String,
}

#[derive(Debug)]
struct DeleteUser {
    id: u64,
}

#[derive(Debug)]
struct Rename {
    id: u64,
    name: String,
}

#[derive(Debug)]
struct Shutdown;

/// Routes command messages to handlers by their type
struct Router {
    commands: ScopedRegistry,
}

impl Router {
    fn new(registry: &DispatchRegistry) -> Result<Self, DispatchError> {
        let commands = registry.scoped("commands");

        commands.register_fn("handle", |cmd: CreateUser| {
            format!("created user {:?}", cmd.name)
        })?;
        commands.register_fn("handle", |cmd: DeleteUser| {
            format!("deleted user {}", cmd.id)
        })?;
        commands.register_fn("handle", |cmd: Rename| {
            format!("renamed user {} to {:?}", cmd.id, cmd.name)
        })?;

        Ok(Self { commands })
    }

    fn handle<C: 'static>(&self, command: C) -> String {
        match self.commands.dispatch::<String, _>("handle", (command,)) {
            Ok(reply) => reply,
            Err(DispatchError::DispatchMiss { signature, .. }) => {
                format!("no handler for {}", signature)
            }
            Err(e) => format!("error: {}", e),
        }
    }
}

fn main() -> Result<(), DispatchError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let registry = DispatchRegistry::new();
    let router = Router::new(&registry)?;

    // Another component is free to use "handle" in its own namespace
    let audit = registry.scoped("audit");
    audit.register_fn("handle", |cmd: DeleteUser| cmd.id)?;

    let mut timer = Timer::builder()
        .name("router")
        .on_stop_message(MessageCallback::new().template("{name}: {args} after {elapsed}s"))
        .build();

    println!("{}", router.handle(CreateUser { name: "ada".to_string() }));
    println!(
        "{}",
        router.handle(Rename {
            id: 1,
            name: "grace".to_string()
        })
    );
    println!("{}", router.handle(DeleteUser { id: 1 }));
    println!("{}", router.handle(Shutdown));
    timer.stop(&["4", "commands"]);

    println!(
        "audited delete of {}",
        audit.dispatch::<u64, _>("handle", (DeleteUser { id: 7 },))?
    );

    let mut names = registry.names()?;
    names.sort();
    println!("registered: {}", names.join(", "));

    Ok(())
}
