use std::io::{self, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{info, warn};

use crate::bridge::Bridge;
use crate::link::Link;

const READ_CHUNK_SIZE: usize = 512;

/// Spawn the blocking worker that owns one link's inbound side.
///
/// The worker reads chunks and feeds the bridge byte by byte until EOF, an
/// unrecoverable read error, or the shutdown flag. Read timeouts and
/// `WouldBlock` are idle polls, not errors; interrupted reads retry. There is
/// no protocol-level timeout — a stalled stream simply never completes a
/// frame.
pub fn spawn_link_worker<R>(
    link: Link,
    mut reader: R,
    bridge: Arc<Bridge>,
    shutdown: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    std::thread::Builder::new()
        .name(format!("link-rx-{link}"))
        .spawn(move || {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            while !shutdown.load(Ordering::Relaxed) {
                match reader.read(&mut chunk) {
                    Ok(0) => {
                        info!(link = %link, "link closed, worker exiting");
                        break;
                    }
                    Ok(n) => bridge.on_bytes_received(link, &chunk[..n]),
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err)
                        if err.kind() == ErrorKind::TimedOut
                            || err.kind() == ErrorKind::WouldBlock =>
                    {
                        continue;
                    }
                    Err(err) => {
                        warn!(link = %link, error = %err, "link read failed, worker exiting");
                        break;
                    }
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Mutex;

    use bytes::BytesMut;
    use lynkbridge_config::{BridgeConfig, ConfigStore};
    use lynkbridge_frame::{encode_frame, Frame};

    use super::*;
    use crate::sink::EgressSink;

    #[derive(Default)]
    struct CaptureSink {
        user: Mutex<Vec<u8>>,
        module: Mutex<Vec<u8>>,
    }

    impl EgressSink for CaptureSink {
        fn write_to_user(&self, bytes: &[u8]) -> io::Result<()> {
            self.user.lock().unwrap().extend_from_slice(bytes);
            Ok(())
        }

        fn write_to_module(&self, bytes: &[u8]) -> io::Result<()> {
            self.module.lock().unwrap().extend_from_slice(bytes);
            Ok(())
        }
    }

    #[test]
    fn worker_drains_stream_then_exits_on_eof() {
        let cfg = BridgeConfig::default();
        let store = Arc::new(ConfigStore::new(cfg.clone()));
        let bridge = Arc::new(Bridge::new(store, CaptureSink::default()));

        let mut wire = BytesMut::new();
        encode_frame(&Frame::new(&cfg, 1, 0x20, &b"via-worker"[..]), &cfg, &mut wire).unwrap();

        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = spawn_link_worker(
            Link::User,
            Cursor::new(wire.to_vec()),
            bridge.clone(),
            shutdown,
        )
        .unwrap();
        handle.join().unwrap();

        assert_eq!(bridge.parser_stats(Link::User).frames_decoded, 1);
    }

    #[test]
    fn shutdown_flag_stops_worker() {
        struct IdleReader;
        impl Read for IdleReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                std::thread::sleep(std::time::Duration::from_millis(1));
                Err(io::Error::from(ErrorKind::TimedOut))
            }
        }

        let store = Arc::new(ConfigStore::default());
        let bridge = Arc::new(Bridge::new(store, CaptureSink::default()));

        let shutdown = Arc::new(AtomicBool::new(false));
        let handle =
            spawn_link_worker(Link::Module, IdleReader, bridge, shutdown.clone()).unwrap();

        shutdown.store(true, Ordering::Relaxed);
        handle.join().unwrap();
    }
}
