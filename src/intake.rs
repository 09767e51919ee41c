//! The intake thread: drains a `RequestChannel`, parses each message and
//! hands it to the scheduler (§6).

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::model::EmergencyRequest;
use crate::mq::{RequestChannel, EXIT_SENTINEL};
use crate::scheduler::Scheduler;

const TAG: &str = "intake";

/// Poll interval while waiting for the next message, bounded so shutdown
/// is noticed promptly rather than blocking indefinitely.
const RECV_TIMEOUT: Duration = Duration::from_millis(200);

/// Consumes `channel` until the `exit` sentinel arrives or the scheduler
/// is independently shut down, submitting every well-formed request.
pub fn run(sched: Arc<Scheduler>, channel: Arc<dyn RequestChannel>) {
    loop {
        if sched.is_shutdown() {
            return;
        }

        let message = match channel.recv_timeout(RECV_TIMEOUT) {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(err) => {
                warn!(target: TAG, %err, "channel error, stopping intake");
                return;
            }
        };

        if message.trim() == EXIT_SENTINEL {
            info!(target: TAG, "exit sentinel received");
            sched.request_shutdown();
            return;
        }

        match parse_request(&message) {
            Ok(request) => {
                if let Err(err) = sched.submit(request) {
                    warn!(target: TAG, %err, "request rejected");
                }
            }
            Err(reason) => {
                warn!(target: TAG, message = %message, reason, "dropping malformed request");
            }
        }
    }
}

/// Parses `"<name> <x> <y> <timestamp>"`.
fn parse_request(message: &str) -> Result<EmergencyRequest, &'static str> {
    let mut parts = message.split_whitespace();
    let name = parts.next().ok_or("missing name")?.to_string();
    let x: i32 = parts.next().ok_or("missing x")?.parse().map_err(|_| "bad x")?;
    let y: i32 = parts.next().ok_or("missing y")?.parse().map_err(|_| "bad y")?;
    let timestamp: u64 = parts.next().ok_or("missing timestamp")?.parse().map_err(|_| "bad timestamp")?;
    if parts.next().is_some() {
        return Err("trailing fields");
    }
    Ok(EmergencyRequest {
        name,
        position: (x, y),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_message() {
        let req = parse_request("Incendio 20 5 1").unwrap();
        assert_eq!(req.name, "Incendio");
        assert_eq!(req.position, (20, 5));
        assert_eq!(req.timestamp, 1);
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(parse_request("Incendio 20").is_err());
    }

    #[test]
    fn rejects_trailing_fields() {
        assert!(parse_request("Incendio 20 5 1 extra").is_err());
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert!(parse_request("Incendio x 5 1").is_err());
    }
}
