use clap::Args;
use studygoal_core::{format_duration, Config, SequencePhase, SequenceSnapshot, Subject};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args)]
pub struct SequenceArgs {
    /// Subject as "name:minutes"; repeat for more. Defaults to the configured presets.
    #[arg(long = "subject", value_name = "NAME:MIN")]
    subjects: Vec<Subject>,
    /// Start counting immediately
    #[arg(long)]
    start: bool,
    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum SequenceInput {
    Start,
    Pause,
    Stop,
    Next,
    Reset,
    Add(Subject),
    Help,
    Quit,
}

impl SequenceInput {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        match cmd {
            "s" | "start" => Ok(Self::Start),
            "p" | "pause" => Ok(Self::Pause),
            "x" | "stop" => Ok(Self::Stop),
            "n" | "next" => Ok(Self::Next),
            "r" | "reset" => Ok(Self::Reset),
            "a" | "add" => rest
                .trim()
                .parse()
                .map(Self::Add)
                .map_err(|e| format!("cannot add subject: {e}")),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

const HELP: &str =
    "commands: s start | p pause | x stop | n next | r reset | a <name:min> add | q quit";

fn render(snap: &SequenceSnapshot, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(snap)?);
        return Ok(());
    }
    let total = snap.subjects.len();
    match snap.phase {
        SequencePhase::Exhausted => println!("[done] all {total} subjects finished"),
        SequencePhase::Preparing => println!(
            "[prep] next subject in {}s ({}/{total} done)",
            snap.preparation_remaining_secs,
            snap.current_index + 1
        ),
        phase => {
            let label = if phase == SequencePhase::Counting {
                "running"
            } else {
                "idle"
            };
            match snap.current_subject.as_deref() {
                Some(name) => println!(
                    "[{label}] {}/{total} {name} | {} left",
                    snap.current_index + 1,
                    format_duration(snap.remaining_secs)
                ),
                None => println!("[{label}] no subjects; add one with: a <name:min>"),
            }
        }
    }
    Ok(())
}

pub fn run(args: SequenceArgs) -> Result<(), Box<dyn std::error::Error>> {
    super::block_on(session(args))
}

async fn session(args: SequenceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if !args.subjects.is_empty() {
        config.subjects = args.subjects;
    }
    let driver = config.sequence_driver()?;
    let mut snapshots = driver.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !args.json {
        eprintln!("{HELP}");
    }
    if args.start {
        driver.start();
    }
    let first = snapshots.borrow_and_update().clone();
    render(&first, args.json)?;
    let mut last_shown = settled(first);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                // Acknowledging republishes the same state minus the flag.
                let shown = settled(snap.clone());
                if shown == last_shown && !snap.alert_pending {
                    continue;
                }
                if snap.alert_pending {
                    announce(&snap, config.notifications.bell, args.json);
                }
                render(&snap, args.json)?;
                if snap.alert_pending {
                    driver.acknowledge_alert();
                }
                last_shown = shown;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match SequenceInput::parse(&line) {
                    Ok(SequenceInput::Start) => {
                        if driver.start().is_none() {
                            eprintln!("nothing to start");
                        }
                    }
                    Ok(SequenceInput::Pause) => { driver.pause(); }
                    Ok(SequenceInput::Stop) => { driver.stop(); }
                    Ok(SequenceInput::Next) => { driver.next_subject(); }
                    Ok(SequenceInput::Reset) => { driver.reset(); }
                    Ok(SequenceInput::Add(subject)) => { driver.add_subject(subject); }
                    Ok(SequenceInput::Help) => eprintln!("{HELP}"),
                    Ok(SequenceInput::Quit) => break,
                    Err(message) => eprintln!("{message}"),
                }
            }
        }
    }

    if args.json {
        render(&driver.snapshot(), true)?;
    }
    driver.stop();
    Ok(())
}

/// Snapshot as it looks once any pending alert has been drained.
fn settled(snap: SequenceSnapshot) -> SequenceSnapshot {
    SequenceSnapshot {
        alert_pending: false,
        ..snap
    }
}

/// Surface an expiry. The subject index has not moved yet while preparing,
/// so the current subject is the one that just ended.
fn announce(snap: &SequenceSnapshot, bell: bool, json: bool) {
    let name = snap.current_subject.as_deref().unwrap_or("subject");
    tracing::info!(subject = name, "time is up");
    if json {
        return;
    }
    if bell {
        print!("\x07");
    }
    println!("Time is up: {name}");
}
