use anyhow::{anyhow, bail, Context as _};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::AsyncBufReadExt;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chroma::models::{
    AppConfig, ConfigOrigin, ConnectionSettings, DeviceConfig, PaletteBook, TransportKind,
};
use chroma::services::{
    list_serial_ports, Capabilities, ColorController, ColorEvent, ColorHistory, ColorSnapshot,
    DeliveryOutcome, DeviceAdapter,
};
use chroma_color::{Cmykw, CmykwChannel, Contrast, Hsl, HslChannel, Rgb};

#[derive(Parser)]
#[command(name = "chroma")]
#[command(about = "Pick a color and send it as a CMYKW instruction to an ink-mixing controller")]
struct Cli {
    /// Config file (default: $CHROMA_CONFIG, then ./chroma.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show RGB, CMYKW, HSL and hex for a color
    Convert(ColorArgs),
    /// Send a color to the controller
    Send(ColorArgs),
    /// Send one color per stdin line (rate limited like live picking)
    Stream,
    /// List serial ports
    Ports,
    /// Test the configured connection
    Test,
    /// Show or edit the configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Show the color history
    History {
        /// Forget all remembered colors
        #[arg(long)]
        clear: bool,
    },
    /// List palettes, or the colors of one palette
    Palettes {
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Change connection settings
    Set {
        /// Connection type: none, modbus or serial
        #[arg(long)]
        transport: Option<String>,

        /// Modbus host address
        #[arg(long)]
        host: Option<String>,

        /// Modbus TCP port
        #[arg(long)]
        port: Option<String>,

        /// Serial device path
        #[arg(long)]
        device: Option<String>,

        /// Serial baud rate
        #[arg(long)]
        baud: Option<String>,

        #[arg(long)]
        dark_mode: Option<bool>,
    },
    /// Flip the dark-mode flag
    ToggleDarkMode,
}

/// Exactly one way of naming a color
#[derive(Args)]
#[group(required = true, multiple = false)]
struct ColorArgs {
    /// RGB as "r,g,b"
    #[arg(long, value_name = "R,G,B")]
    rgb: Option<Rgb>,

    /// Hex as "#rrggbb" or "#rgb"
    #[arg(long, value_name = "HEX")]
    hex: Option<Rgb>,

    /// CMYKW percentages as "c,m,y,k,w"
    #[arg(long, value_name = "C,M,Y,K,W")]
    cmykw: Option<Cmykw>,

    /// HSL as "h,s,l"
    #[arg(long, value_name = "H,S,L")]
    hsl: Option<Hsl>,

    /// Palette color as "palette/color"
    #[arg(long, value_name = "PALETTE/COLOR")]
    palette: Option<String>,
}

/// A color as typed by the user
#[derive(Debug, Clone, PartialEq)]
enum ColorInput {
    Rgb(Rgb),
    Cmykw(Cmykw),
    Hsl(Hsl),
    Palette(String),
}

impl ColorArgs {
    fn input(&self) -> anyhow::Result<ColorInput> {
        if let Some(rgb) = self.rgb.or(self.hex) {
            return Ok(ColorInput::Rgb(rgb));
        }
        if let Some(cmykw) = self.cmykw {
            return Ok(ColorInput::Cmykw(cmykw));
        }
        if let Some(hsl) = self.hsl {
            return Ok(ColorInput::Hsl(hsl));
        }
        self.palette
            .clone()
            .map(ColorInput::Palette)
            .ok_or_else(|| anyhow!("No color given"))
    }
}

/// Stream lines: `cmykw:0,17,74,17,0`, `hsl:46,65,52`, `palette:Materials/Gold`,
/// or a bare RGB/hex color.
impl FromStr for ColorInput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((prefix, value)) = s.split_once(':') else {
            return Ok(ColorInput::Rgb(s.parse()?));
        };

        match prefix.trim().to_lowercase().as_str() {
            "rgb" | "hex" => Ok(ColorInput::Rgb(value.parse()?)),
            "cmykw" => Ok(ColorInput::Cmykw(value.parse()?)),
            "hsl" => Ok(ColorInput::Hsl(value.parse()?)),
            "palette" => Ok(ColorInput::Palette(value.trim().to_string())),
            other => bail!("Unknown color format: {other}"),
        }
    }
}

/// Run the input through the controller exactly as the picker would.
fn select_color(
    controller: &ColorController,
    palettes: &PaletteBook,
    input: &ColorInput,
) -> anyhow::Result<ColorSnapshot> {
    let events: Vec<ColorEvent> = match input {
        ColorInput::Rgb(rgb) => vec![ColorEvent::PickRgb(*rgb)],
        ColorInput::Palette(reference) => {
            let color = palettes
                .lookup(reference)
                .ok_or_else(|| anyhow!("Unknown palette color: {reference}"))?;
            vec![ColorEvent::PickRgb(color.rgb)]
        }
        // one slider at a time, like dragging each of them
        ColorInput::Cmykw(cmykw) => CmykwChannel::ALL
            .iter()
            .map(|&channel| ColorEvent::SetCmykw(channel, cmykw.get(channel)))
            .collect(),
        ColorInput::Hsl(hsl) => [HslChannel::Hue, HslChannel::Saturation, HslChannel::Lightness]
            .iter()
            .map(|&channel| ColorEvent::SetHsl(channel, hsl.get(channel)))
            .collect(),
    };

    let mut snapshot = None;
    for event in events {
        snapshot = controller.apply(event).or(snapshot);
    }
    snapshot.ok_or_else(|| anyhow!("Color could not be applied"))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chroma=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config_path = AppConfig::resolve_path(cli.config);

    match cli.command {
        Some(Commands::Convert(color)) => run_convert_command(&config_path, &color),
        Some(Commands::Send(color)) => run_send_command(&config_path, &color).await,
        Some(Commands::Stream) => run_stream_command(&config_path).await,
        Some(Commands::Ports) => run_ports_command(),
        Some(Commands::Test) => run_test_command(&config_path).await,
        Some(Commands::Config { action }) => {
            run_config_command(&config_path, action.unwrap_or(ConfigAction::Show))
        }
        Some(Commands::History { clear }) => run_history_command(&config_path, clear),
        Some(Commands::Palettes { name }) => run_palettes_command(&config_path, name.as_deref()),
        None => run_status_command(&config_path),
    }
}

fn print_snapshot(snapshot: &ColorSnapshot) {
    let text = match snapshot.contrast {
        Contrast::Light => "light",
        Contrast::Dark => "dark",
    };
    println!("{}", snapshot.rgb);
    println!("{}", snapshot.cmykw);
    println!("{}", snapshot.hsl);
    println!("Hex  {} ({text} text)", snapshot.hex);
}

fn run_convert_command(config_path: &Path, color: &ColorArgs) -> anyhow::Result<()> {
    let (config, _) = AppConfig::load(config_path);
    let palettes = PaletteBook::from_config(&config.palettes);
    let controller = ColorController::new();

    let snapshot = select_color(&controller, &palettes, &color.input()?)?;
    print_snapshot(&snapshot);
    Ok(())
}

fn build_adapter(config: &AppConfig) -> anyhow::Result<DeviceAdapter> {
    DeviceAdapter::configure(&config.connection, Capabilities::detect())
        .context("Invalid connection settings")
}

async fn run_send_command(config_path: &Path, color: &ColorArgs) -> anyhow::Result<()> {
    let (config, _) = AppConfig::load(config_path);
    let palettes = PaletteBook::from_config(&config.palettes);
    let controller = ColorController::new();
    let snapshot = select_color(&controller, &palettes, &color.input()?)?;

    let mut adapter = build_adapter(&config)?;
    let mut reports = adapter.subscribe();

    let mut history = ColorHistory::load(&config.history_file, config.history_capacity);
    history.add(snapshot.rgb, snapshot.cmykw);

    if !adapter.submit(snapshot.cmykw) {
        let status = adapter.status();
        adapter.close().await;
        bail!("Not sent: {status}");
    }

    // the worker releases the transport on close
    let target = adapter.status();
    adapter.close().await;
    let report = reports
        .try_recv()
        .map_err(|e| anyhow!("No delivery report: {e}"))?;

    match report.outcome {
        DeliveryOutcome::Delivered => {
            println!("Sent {} via {target}", report.color);
            Ok(())
        }
        DeliveryOutcome::Failed(reason) => bail!("Delivery failed: {reason}"),
    }
}

async fn run_stream_command(config_path: &Path) -> anyhow::Result<()> {
    let (config, _) = AppConfig::load(config_path);
    let palettes = PaletteBook::from_config(&config.palettes);
    let controller = ColorController::new();
    let mut history = ColorHistory::load(&config.history_file, config.history_capacity);

    let mut adapter = build_adapter(&config)?;
    if !adapter.is_enabled() {
        bail!("Not sending: {}", adapter.status());
    }

    let mut reports = adapter.subscribe();
    let collector = tokio::spawn(async move {
        let (mut delivered, mut failed) = (0usize, 0usize);
        loop {
            match reports.recv().await {
                Ok(report) if report.is_delivered() => delivered += 1,
                Ok(_) => failed += 1,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed delivery reports");
                }
                Err(RecvError::Closed) => break,
            }
        }
        (delivered, failed)
    });

    let (mut accepted, mut rejected, mut invalid) = (0usize, 0usize, 0usize);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let snapshot = match line
            .parse::<ColorInput>()
            .and_then(|input| select_color(&controller, &palettes, &input))
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(line = %line, error = %e, "Skipping invalid color");
                invalid += 1;
                continue;
            }
        };

        if adapter.submit(snapshot.cmykw) {
            accepted += 1;
            history.add(snapshot.rgb, snapshot.cmykw);
        } else {
            rejected += 1;
        }
    }

    adapter.close().await;
    drop(adapter);
    let (delivered, failed) = collector.await?;

    println!("Accepted: {accepted}");
    println!("Rate limited: {rejected}");
    println!("Invalid: {invalid}");
    println!("Delivered: {delivered}, failed: {failed}");
    Ok(())
}

fn run_ports_command() -> anyhow::Result<()> {
    let ports = list_serial_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    for port in ports {
        match port.description {
            Some(description) => println!("{}  {description}", port.name),
            None => println!("{}", port.name),
        }
    }
    Ok(())
}

async fn run_test_command(config_path: &Path) -> anyhow::Result<()> {
    let (config, _) = AppConfig::load(config_path);
    let mut adapter = build_adapter(&config)?;

    if adapter.kind() == TransportKind::None {
        println!("No connection configured to test");
        return Ok(());
    }

    let result = adapter.probe().await;
    let status = adapter.status();
    adapter.close().await;

    match result {
        Ok(()) => {
            println!("Connection OK: {status}");
            Ok(())
        }
        Err(e) => bail!("Connection failed ({status}): {e}"),
    }
}

fn run_config_command(config_path: &Path, action: ConfigAction) -> anyhow::Result<()> {
    let (mut config, origin) = AppConfig::load(config_path);

    match action {
        ConfigAction::Show => {
            println!("# source: {origin}");
            print!("{}", serde_yaml::to_string(&config)?);
            if let Err(e) = config.connection.validate() {
                println!("# warning: {e}");
            }
            return Ok(());
        }
        ConfigAction::Set {
            transport,
            host,
            port,
            device,
            baud,
            dark_mode,
        } => {
            let connection = &mut config.connection;
            if let Some(transport) = transport {
                connection.connection_type = transport.parse::<TransportKind>()?.to_string();
            }
            if let Some(host) = host {
                connection.plc_ip = host;
            }
            if let Some(port) = port {
                connection.set_port(&port)?;
            }
            if let Some(device) = device {
                connection.serial_port = Some(device);
            }
            if let Some(baud) = baud {
                connection.set_baud_rate(&baud)?;
            }
            if let Some(dark_mode) = dark_mode {
                config.dark_mode = dark_mode;
            }
            config.connection.validate()?;
        }
        ConfigAction::ToggleDarkMode => {
            let dark = config.toggle_dark_mode();
            println!("Dark mode {}", if dark { "on" } else { "off" });
        }
    }

    config.save(config_path)?;
    println!("Saved {}", config_path.display());
    Ok(())
}

fn run_history_command(config_path: &Path, clear: bool) -> anyhow::Result<()> {
    let (config, _) = AppConfig::load(config_path);
    let mut history = ColorHistory::load(&config.history_file, config.history_capacity);

    if clear {
        history.clear();
        println!("History cleared");
        return Ok(());
    }

    if history.is_empty() {
        println!("History is empty");
        return Ok(());
    }

    for (i, entry) in history.entries().rev().enumerate() {
        println!(
            "{:>2}. {}  {}  {}  {}",
            i + 1,
            entry.rgb.to_hex(),
            entry.rgb,
            entry.cmykw,
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn run_palettes_command(config_path: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let (config, _) = AppConfig::load(config_path);
    let palettes = PaletteBook::from_config(&config.palettes);

    let Some(name) = name else {
        for palette in palettes.palettes() {
            println!("{} ({} colors)", palette.name, palette.colors.len());
        }
        return Ok(());
    };

    let palette = palettes
        .get(name)
        .ok_or_else(|| anyhow!("Unknown palette: {name}"))?;
    for color in &palette.colors {
        println!(
            "{:<10} {}  {}",
            color.name,
            color.rgb.to_hex(),
            Cmykw::from(color.rgb)
        );
    }
    Ok(())
}

/// Display status and configuration information
/// One-line connection summary that does not touch the device.
fn connection_summary(settings: &ConnectionSettings, caps: Capabilities) -> String {
    let config = match settings.validate() {
        Ok(config) => config,
        Err(e) => return format!("- Invalid settings: {e}"),
    };

    let kind = config.kind();
    if kind != TransportKind::None && !caps.supports(kind) {
        return format!("- No connection ({kind} support not available)");
    }

    match config {
        DeviceConfig::None => "- No connection".to_string(),
        DeviceConfig::Network { host, port } => format!("+ Modbus TCP - {host}:{port}"),
        DeviceConfig::Serial { path, baud_rate } => {
            format!("+ Serial - {path} @ {baud_rate} baud")
        }
    }
}

fn run_status_command(config_path: &Path) -> anyhow::Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let (config, origin) = AppConfig::load(config_path);

    println!("Chroma v{VERSION}");
    println!("Pick a color, send it as CMYKW\n");

    println!("Configuration:");
    match &origin {
        ConfigOrigin::File(path) => println!("  Source:     {}", path.display()),
        ConfigOrigin::Embedded => println!(
            "  Source:     embedded ({} not found)",
            config_path.display()
        ),
    }
    println!(
        "  Dark mode:  {}",
        if config.dark_mode { "on" } else { "off" }
    );

    let caps = Capabilities::detect();
    println!(
        "  Connection: {}",
        connection_summary(&config.connection, caps)
    );

    let history = ColorHistory::load(&config.history_file, config.history_capacity);
    println!(
        "  History:    {} of {} ({})",
        history.len(),
        history.capacity(),
        config.history_file.display()
    );

    let palettes = PaletteBook::from_config(&config.palettes);
    println!(
        "  Palettes:   {}",
        palettes.names().collect::<Vec<_>>().join(", ")
    );

    println!("\nTransports:");
    println!(
        "  Modbus TCP  {}",
        if caps.network { "available" } else { "not built" }
    );
    println!(
        "  Serial      {}",
        if caps.serial { "available" } else { "not built" }
    );

    println!("\nCommands:");
    println!("  chroma convert   Show a color in every representation");
    println!("  chroma send      Send a color to the controller");
    println!("  chroma stream    Send colors read from stdin");
    println!("  chroma test      Test the configured connection");
    println!("  chroma config    Show or edit the configuration");
    println!("\nRun 'chroma --help' for more details.");
    Ok(())
}
