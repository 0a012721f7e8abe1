use clap::Args;
use studygoal_core::{format_duration, goal_message, Config, GoalSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args)]
pub struct GoalArgs {
    /// Daily goal in minutes (defaults to goal.default_minutes)
    #[arg(long)]
    minutes: Option<i64>,
    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum GoalInput {
    StartPause,
    Focus,
    Reset,
    Goal(i64),
    Help,
    Quit,
}

impl GoalInput {
    fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or("");
        match cmd {
            "s" | "start" | "pause" => Ok(Self::StartPause),
            "f" | "focus" => Ok(Self::Focus),
            "r" | "reset" => Ok(Self::Reset),
            "g" | "goal" => {
                let minutes = words.next().ok_or("usage: g <minutes>")?;
                minutes
                    .parse()
                    .map(Self::Goal)
                    .map_err(|_| format!("not a number: {minutes}"))
            }
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

const HELP: &str = "commands: s start/pause | f toggle focus | r reset | g <min> set goal | q quit";

fn render(snap: &GoalSnapshot, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(snap)?);
        return Ok(());
    }
    println!(
        "[{}{}] total {} | focused {} | {}% of {} | {}",
        if snap.running { "running" } else { "paused" },
        if snap.focused { ", focus" } else { "" },
        format_duration(snap.total_secs),
        format_duration(snap.focused_secs),
        (snap.progress * 100.0) as u8,
        format_duration(snap.goal_secs),
        goal_message(snap.focused_secs, snap.goal_secs),
    );
    Ok(())
}

pub fn run(args: GoalArgs) -> Result<(), Box<dyn std::error::Error>> {
    super::block_on(session(args))
}

async fn session(args: GoalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let driver = Config::load_or_default().goal_driver()?;
    if let Some(minutes) = args.minutes {
        driver.set_goal_minutes(minutes);
    }
    let mut snapshots = driver.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !args.json {
        eprintln!("{HELP}");
    }
    render(&snapshots.borrow_and_update(), args.json)?;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                render(&snap, args.json)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match GoalInput::parse(&line) {
                    Ok(GoalInput::StartPause) => { driver.toggle_running(); }
                    Ok(GoalInput::Focus) => { driver.toggle_focus(); }
                    Ok(GoalInput::Reset) => { driver.reset(); }
                    Ok(GoalInput::Goal(minutes)) => { driver.set_goal_minutes(minutes); }
                    Ok(GoalInput::Help) => eprintln!("{HELP}"),
                    Ok(GoalInput::Quit) => break,
                    Err(message) => eprintln!("{message}"),
                }
            }
        }
    }

    driver.pause();
    let snap = driver.snapshot();
    if args.json {
        render(&snap, true)?;
    } else {
        println!(
            "session: total {}, focused {}",
            format_duration(snap.total_secs),
            format_duration(snap.focused_secs)
        );
    }
    Ok(())
}
