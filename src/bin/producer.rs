//! CLI producer (§6). Exactly the three literal invocations:
//! `producer <name> <x> <y> <delay>` sends one request after `delay`
//! virtual seconds; `producer -f <file>` streams one request per line;
//! `producer exit` sends the shutdown sentinel.

use std::fs;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use clap::Parser;
use dispatch_core::mq::InMemoryChannel;

#[derive(Parser, Debug)]
#[command(name = "producer", about = "Submits emergency requests to the dispatch scheduler")]
struct Args {
    /// Stream one request per line of this file instead of a single submission.
    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    /// Either `<name> <x> <y> <delay>` or the literal word `exit`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

fn main() {
    let args = Args::parse();

    // The request channel's real backing (POSIX mqueue, a socket, ...) is
    // an engineering exercise left to the deployment; standalone this
    // binary can only demonstrate formatting and validate input, since
    // there is no shared process to receive on an in-memory channel.
    let channel = InMemoryChannel::new();

    let exit_code = match run(&args, &channel) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("producer: {err}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(args: &Args, channel: &InMemoryChannel) -> std::io::Result<()> {
    if let Some(path) = &args.file {
        return submit_file(path, channel);
    }

    match args.rest.as_slice() {
        [only] if only == "exit" => submit_exit(channel),
        [name, x, y, delay] => submit_single(name, x, y, delay, channel),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "usage: producer <name> <x> <y> <delay> | producer -f <file> | producer exit",
        )),
    }
}

fn submit_single(name: &str, x: &str, y: &str, delay: &str, channel: &InMemoryChannel) -> std::io::Result<()> {
    fn parse<T: std::str::FromStr>(s: &str) -> std::io::Result<T> {
        s.parse()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("not a number: {s}")))
    }
    let x: i32 = parse(x)?;
    let y: i32 = parse(y)?;
    let delay: u64 = parse(delay)?;

    if delay > 0 {
        std::thread::sleep(Duration::from_secs(delay));
    }

    let message = format!("{name} {x} {y} {delay}");
    send(channel, &message)?;
    println!("submitted: {message}");
    Ok(())
}

fn submit_file(path: &str, channel: &InMemoryChannel) -> std::io::Result<()> {
    let file = fs::File::open(path)?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        send(channel, line)?;
        println!("submitted: {line}");
    }
    Ok(())
}

fn submit_exit(channel: &InMemoryChannel) -> std::io::Result<()> {
    send(channel, "exit")?;
    println!("submitted: exit");
    Ok(())
}

fn send(channel: &InMemoryChannel, message: &str) -> std::io::Result<()> {
    channel
        .send(message)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))
}
