use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lynkbridge_bridge::{spawn_link_worker, Bridge, Link, WriterSink};
use lynkbridge_config::{persist, ConfigStore};
use tracing::info;

use crate::cmd::RunArgs;
use crate::exit::{config_error, io_error, serial_error, CliResult, INTERNAL, SUCCESS};

/// Poll interval for the blocking serial reads; also how often the workers
/// notice the shutdown flag.
const READ_POLL: Duration = Duration::from_millis(20);

pub fn run(args: RunArgs) -> CliResult<i32> {
    let cfg = persist::load(&args.config)
        .map_err(|err| config_error("failed loading configuration", err))?;
    let store = Arc::new(ConfigStore::new(cfg.clone()));

    let open = |path: &str| {
        serialport::new(path, cfg.baud_rate)
            .timeout(READ_POLL)
            .open()
            .map_err(|err| serial_error(&format!("failed opening {path}"), err))
    };
    let user_port = open(&args.user_port)?;
    let module_port = open(&args.module_port)?;

    let user_tx = user_port
        .try_clone()
        .map_err(|err| serial_error("failed cloning user port", err))?;
    let module_tx = module_port
        .try_clone()
        .map_err(|err| serial_error("failed cloning module port", err))?;

    let bridge = Arc::new(Bridge::new(store, WriterSink::new(user_tx, module_tx)));
    let shutdown = Arc::new(AtomicBool::new(false));

    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
        })
        .map_err(|err| crate::exit::CliError::new(INTERNAL, format!("signal handler: {err}")))?;
    }

    info!(
        user = %args.user_port,
        module = %args.module_port,
        baud = cfg.baud_rate,
        device_id = format_args!("0x{:02X}", cfg.device_id),
        mode = %cfg.mode,
        "bridge starting"
    );

    let user_worker = spawn_link_worker(Link::User, user_port, bridge.clone(), shutdown.clone())
        .map_err(|err| io_error("failed spawning user worker", err))?;
    let module_worker =
        spawn_link_worker(Link::Module, module_port, bridge.clone(), shutdown.clone())
            .map_err(|err| io_error("failed spawning module worker", err))?;

    let _ = user_worker.join();
    let _ = module_worker.join();

    let user = bridge.parser_stats(Link::User);
    let module = bridge.parser_stats(Link::Module);
    info!(
        user_frames = user.frames_decoded,
        user_rejected = user.frames_rejected,
        module_frames = module.frames_decoded,
        module_rejected = module.frames_rejected,
        "bridge stopped"
    );

    Ok(SUCCESS)
}
