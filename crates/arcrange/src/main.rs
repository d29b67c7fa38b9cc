use arcrange::config::{self, WidgetId};
use arcrange::events::HostEvent;
use arcrange::host::{Host, Notification};
use arcrange::sys::runtime;
use arcrange::sys::server::SOCKET_PATH;
use clap::{Parser, Subcommand};
use rangekit::{PointerInput, RangeState};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "arcrange", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Unix socket the host listens on
    #[arg(short = 's', long, global = true, default_value = SOCKET_PATH)]
    socket: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Host the configured widgets and print their changes as JSON lines
    Serve,
    /// Send one command line to a running host, e.g. `send down volume 40 20`
    Send {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Print the value a configured widget would take for a pointer at (x, y)
    Probe {
        widget: String,
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve(cli.socket),
        Commands::Send { command } => send_command(&cli.socket, &command.join(" ")),
        Commands::Probe { widget, x, y } => probe(WidgetId::new(widget), x, y),
    }
}

fn serve(socket_path: PathBuf) -> anyhow::Result<()> {
    match config::write_default_config() {
        Ok(path) => log::info!("Using config at {}", path.display()),
        Err(e) => log::warn!("Could not write default config: {}", e),
    }

    let mut host = Host::new(&config::load_or_default());
    let (tx, rx) = async_channel::bounded::<HostEvent>(32);

    runtime::start_background_services(tx, socket_path)?;

    emit(&host.snapshot())?;
    while let Ok(event) = rx.recv_blocking() {
        log::debug!("{:?}", event);
        emit(&host.handle(event))?;
    }
    Ok(())
}

fn emit(notifications: &[Notification]) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    for notification in notifications {
        serde_json::to_writer(&mut out, notification)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn probe(id: WidgetId, x: f64, y: f64) -> anyhow::Result<()> {
    let config = config::load_or_default();
    let Some(widget) = config.widget(&id) else {
        anyhow::bail!("No widget '{}' in the config.", id);
    };

    let state = RangeState::new(&widget.range);
    let origin = state.geometry().track_origin(widget.bounds());
    let value =
        rangekit::value_from_pointer(state.geometry(), &PointerInput::mouse(x, y), origin, None);

    let report = serde_json::json!({
        "widget": id,
        "value": value,
        "render": rangekit::position_from_value(state.geometry(), rangekit::Knobs::One(value)),
    });
    println!("{}", report);
    Ok(())
}

fn send_command(socket_path: &Path, cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(socket_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to arcrange at {}: {}. Is `arcrange serve` running?",
            socket_path.display(),
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
