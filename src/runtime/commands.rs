use std::error::Error as StdError;
use std::io::BufRead;
use std::time::Duration;

use tracing::info;

use crate::bus::Bus;
use crate::cli::Command;
use crate::error::Error;
use crate::player::{MediaPlayer, format_elapsed};
use crate::registry::{Discovery, Registry};

/// Run one command against the players currently on the bus.
pub fn execute<B: Bus>(
    registry: &Registry<B>,
    command: &Command,
    wanted: Option<&str>,
) -> Result<(), Box<dyn StdError>> {
    let discovery = registry.discover()?;
    let player = || select(&discovery, wanted);

    match command {
        Command::List => print_list(&discovery),
        Command::Status => {
            for (label, value) in render_status(&player()?) {
                println!("{label:<11} {value}");
            }
        }
        Command::Play => player()?.play()?,
        Command::Pause => player()?.pause()?,
        Command::Stop => player()?.stop()?,
        Command::Next => player()?.next()?,
        Command::Previous => player()?.previous()?,
        Command::FastForward => player()?.fast_forward()?,
        Command::Rewind => player()?.rewind()?,
        Command::Release => player()?.release()?,
        Command::Press { code } => player()?.press(*code)?,
        Command::Hold { code } => player()?.hold(*code)?,
        Command::Equalizer { value } => player()?.set_equalizer(value.as_str())?,
        Command::Monitor => monitor(&mut player()?)?,
    }
    Ok(())
}

/// Pick the first player whose path or display name contains `wanted`, or
/// simply the first player when nothing is asked for.
pub fn select<B: Bus>(
    discovery: &Discovery<B>,
    wanted: Option<&str>,
) -> Result<MediaPlayer<B>, Error> {
    let mut players = discovery.iter();
    let found = match wanted {
        None => players.next(),
        Some(w) => players.find(|p| p.path().contains(w) || p.display_name().contains(w)),
    };
    found.ok_or_else(|| Error::NoPlayer(wanted.unwrap_or("any").to_string()))
}

/// Every property of `player` as (label, value) rows; unreadable ones show `-`.
pub fn render_status<B: Bus>(player: &MediaPlayer<B>) -> Vec<(&'static str, String)> {
    fn or_dash<T: ToString>(v: Option<T>) -> String {
        v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    }

    vec![
        ("Path", player.path().to_string()),
        ("Name", or_dash(player.name())),
        ("Device", or_dash(player.device())),
        ("Type", or_dash(player.player_type())),
        ("Subtype", or_dash(player.subtype())),
        ("Status", or_dash(player.status())),
        (
            "Position",
            or_dash(
                player
                    .position()
                    .map(|ms| format_elapsed(Duration::from_millis(u64::from(ms)))),
            ),
        ),
        ("Track", or_dash(player.track())),
        ("Playlist", or_dash(player.playlist())),
        ("Equalizer", or_dash(player.equalizer())),
        ("Repeat", or_dash(player.repeat())),
        ("Shuffle", or_dash(player.shuffle())),
        ("Scan", or_dash(player.scan())),
        ("Browsable", or_dash(player.is_browsable())),
        ("Searchable", or_dash(player.is_searchable())),
    ]
}

fn print_list<B: Bus>(discovery: &Discovery<B>) {
    for player in discovery.iter() {
        let name = player.name().unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}", player.path(), name, player.display_name());
    }
}

fn monitor<B: Bus>(player: &mut MediaPlayer<B>) -> Result<(), Box<dyn StdError>> {
    let label = player.display_name();
    player.subscribe(move |name, value| println!("{label}: {name} = {value}"))?;
    info!(player = %player.path(), "monitoring property changes");
    eprintln!("watching {}; press Enter to stop", player.path());

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    player.unsubscribe()?;
    Ok(())
}
