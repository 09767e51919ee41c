//! The dispatch scheduler service: loads configuration, wires up the
//! request channel, and runs intake, workers and aging until shutdown.

use std::sync::Arc;

use clap::Parser;
use dispatch_core::mq::{InMemoryChannel, RequestChannel};
use dispatch_core::{scheduler, Config, Scheduler, VirtualClock};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dispatcherd", about = "Emergency-response dispatch scheduler")]
struct Args {
    #[arg(long, default_value = "rescuers.conf")]
    responders: String,

    #[arg(long, default_value = "emergencies.conf")]
    emergencies: String,

    #[arg(long, default_value = "env.conf")]
    env: String,

    #[arg(long, default_value_t = 16)]
    workers: usize,

    /// Print the loaded configuration and exit without starting the
    /// scheduler.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> anyhow::Result<()> {
    dispatch_core::logging::init();
    let args = Args::parse();

    let config = Config::load(&args.responders, &args.emergencies, &args.env)?;

    if args.dump_config {
        info!(
            target: "status",
            responder_types = config.responder_types.len(),
            emergency_types = config.emergency_types.len(),
            "debug dump requested"
        );
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let queue_name = config.environment.queue.clone();
    let sched = Scheduler::new(config, VirtualClock::real_time());

    #[cfg(feature = "posix-mq")]
    let channel: Arc<dyn RequestChannel> = {
        let name = queue_name.as_deref().unwrap_or("/dispatch-core");
        Arc::new(dispatch_core::mq::PosixMqChannel::create(name)?)
    };
    #[cfg(not(feature = "posix-mq"))]
    let channel: Arc<dyn RequestChannel> = {
        let _ = &queue_name;
        Arc::new(InMemoryChannel::new())
    };

    let handles = scheduler::spawn(Arc::clone(&sched), args.workers);

    let intake_sched = Arc::clone(&sched);
    let intake_channel = Arc::clone(&channel);
    let intake_handle = std::thread::Builder::new()
        .name("intake".to_string())
        .spawn(move || dispatch_core::intake::run(intake_sched, intake_channel))?;

    intake_handle.join().ok();
    handles.join();

    let counters = sched.counters();
    info!(
        admitted = counters.admitted,
        solved = counters.solved,
        not_solved = counters.not_solved,
        rejected = counters.rejected,
        "scheduler shut down"
    );

    Ok(())
}
