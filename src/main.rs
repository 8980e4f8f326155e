use std::error::Error;
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bpaf::{Bpaf, Parser};
use deck_sync_core::{Brightness, Deck};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::detection::{deck_kind, DeckKind};
use crate::media::load_key_image;

mod config;
mod detection;
mod listen;
mod media;

fn brightness() -> impl Parser<Brightness> {
    let percent = bpaf::short('p')
        .long("percent")
        .help("Brightness in percent, clamped to 0-100")
        .argument::<i32>("PERCENT")
        .map(Brightness::Percent);
    let fraction = bpaf::short('f')
        .long("fraction")
        .help("Brightness as a fraction of full, clamped to 0.0-1.0")
        .argument::<f64>("FRACTION")
        .map(Brightness::Fraction);
    bpaf::construct!([percent, fraction])
}

#[derive(Clone, Debug, Bpaf)]
enum SetCommand {
    /// Set the backlight brightness
    #[bpaf(command, fallback_to_usage)]
    Brightness(#[bpaf(external(brightness))] Brightness),
    /// Upload a pre-encoded key image
    #[bpaf(command, fallback_to_usage)]
    Key {
        /// Key index, row-major from the top left
        #[bpaf(positional("KEY"))]
        key: usize,
        /// Path to the image. Uploads a blank key when omitted.
        #[bpaf(positional("PATH"))]
        path: Option<PathBuf>,
    },
    /// Upload every key image listed in the config file
    #[bpaf(command)]
    Images,
}

/// Poll interval parsed from a human readable duration like `20ms`
#[derive(Debug, Clone, Copy)]
struct Interval(Duration);
impl FromStr for Interval {
    type Err = humantime::DurationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        humantime::parse_duration(s).map(Self)
    }
}

#[derive(Clone, Debug, Bpaf)]
enum Command {
    /// Show deck name, serial number and firmware version
    #[bpaf(command)]
    Info,
    /// Set specific options on the deck
    #[bpaf(command, fallback_to_usage)]
    Set(#[bpaf(external(set_command))] SetCommand),
    /// Clear key images
    #[bpaf(command)]
    Clear {
        /// Only clear this key
        #[bpaf(positional("KEY"))]
        key: Option<usize>,
    },
    /// Reset the deck and apply the configured brightness
    #[bpaf(command)]
    Reset,
    /// Print key presses and releases until interrupted
    #[bpaf(command)]
    Listen {
        /// Override the configured poll interval
        #[bpaf(short, long, argument("DURATION"))]
        interval: Option<Interval>,
    },
}

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options, version, descr(env!("CARGO_PKG_DESCRIPTION")))]
struct Cli {
    #[bpaf(external(deck_kind))]
    deck: DeckKind,
    #[bpaf(external(command))]
    command: Command,
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn apply_info(deck: &mut dyn Deck) -> Result<(), Box<dyn Error>> {
    let info = deck.info();
    let serial = deck.serial_number()?;
    let firmware = deck.firmware_version()?;
    println!("deck: {} ({:04x}:{:04x})", info.name, info.vendor_id, info.product_id);
    println!("serial: {}", serial.as_deref().unwrap_or("unknown"));
    println!("firmware: {firmware}");
    println!(
        "keys: {} ({}x{}), images {}x{} {} rotated {}°",
        info.layout.count,
        info.layout.cols,
        info.layout.rows,
        info.key_image.width,
        info.key_image.height,
        info.key_image.encoding,
        info.key_image.rotation,
    );
    Ok(())
}

pub fn apply_brightness(deck: &mut dyn Deck, brightness: Brightness) -> Result<(), Box<dyn Error>> {
    deck.as_brightness()
        .ok_or("deck does not support brightness")?
        .set_brightness(brightness)?;
    println!("set brightness to {}%", brightness.to_percent());
    Ok(())
}

pub fn apply_key_image(
    deck: &mut dyn Deck,
    key: usize,
    path: Option<&PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let format = deck.info().key_image;
    let image = path.map(|p| load_key_image(p, &format)).transpose()?;
    let len = image.as_ref().map_or(0, Vec::len);
    deck.as_key_images()
        .ok_or("deck does not support key images")?
        .set_key_image(key, image.as_deref(), &mut |i| {
            if len > 0 {
                print!("\ruploading {len} bytes to key {key} (page {i}) ... ");
            } else {
                print!("\rblanking key {key} (page {i}) ... ");
            }
            let _ = stdout().flush();
        })?;
    println!("done");
    Ok(())
}

pub fn apply_clear(deck: &mut dyn Deck, key: Option<usize>) -> Result<(), Box<dyn Error>> {
    let images = deck
        .as_key_images()
        .ok_or("deck does not support key images")?;
    match key {
        Some(key) => {
            images.clear_key(key)?;
            println!("cleared key {key}");
        },
        None => {
            images.clear_all()?;
            println!("cleared all keys");
        },
    }
    Ok(())
}

pub fn apply_reset(deck: &mut dyn Deck, brightness: u8) -> Result<(), Box<dyn Error>> {
    deck.reset()?;
    println!("reset {}", deck.info().name);
    apply_brightness(deck, Brightness::Percent(brightness.into()))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = cli().run();
    let config = Config::load_or_create()?;
    init_logging(&config.general.log_level);

    let mut deck = cli.deck.as_deck(&config.device)?;
    match cli.command {
        Command::Info => apply_info(deck.as_mut()),
        Command::Set(set_command) => match set_command {
            SetCommand::Brightness(brightness) => apply_brightness(deck.as_mut(), brightness),
            SetCommand::Key { key, path } => apply_key_image(deck.as_mut(), key, path.as_ref()),
            SetCommand::Images => {
                let keys = config.key_images()?;
                if keys.is_empty() {
                    println!("no [keys] entries in config");
                }
                for (key, path) in keys {
                    apply_key_image(deck.as_mut(), key, Some(&path))?;
                }
                Ok(())
            },
        },
        Command::Clear { key } => apply_clear(deck.as_mut(), key),
        Command::Reset => apply_reset(deck.as_mut(), config.general.brightness),
        Command::Listen { interval } => {
            let interval = interval.map_or(config.listen.interval, |i| i.0);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(listen::listen(deck.as_mut(), interval))
        },
    }
}

#[cfg(test)]
#[test]
fn deck_flags_select_kind() {
    let parsed = cli().run_inner(&["--mirabox293s", "info"]).unwrap();
    assert_eq!(parsed.deck, DeckKind::Mirabox293s);
    assert!(matches!(parsed.command, Command::Info));

    let parsed = cli().run_inner(&["clear", "3"]).unwrap();
    assert_eq!(parsed.deck, DeckKind::Auto, "no flag means auto-detect");
    assert!(matches!(parsed.command, Command::Clear { key: Some(3) }));

    assert!(cli().run_inner(&["--streamdeck", "info"]).is_err());
}

#[cfg(test)]
#[test]
fn generate_docs() {
    let app = env!("CARGO_PKG_NAME");
    let options = cli();

    std::fs::create_dir_all("docs").expect("failed to create docs directory");
    let roff = options.render_manpage(app, bpaf::doc::Section::General, None, None, None);
    std::fs::write("docs/deck-sync.1", roff).expect("failed to write manpage");

    let md = options.header("").render_markdown(app);
    std::fs::write("docs/README.md", md).expect("failed to write markdown docs");
}
