use std::io::{self, Write};
use std::sync::Mutex;

use crate::link::Link;

/// Injected egress capability: where forwarded frames leave the bridge.
///
/// Production supplies serial-port writers; tests supply capture sinks. The
/// bridge writes one fully encoded frame per call.
pub trait EgressSink: Send + Sync {
    fn write_to_user(&self, bytes: &[u8]) -> io::Result<()>;
    fn write_to_module(&self, bytes: &[u8]) -> io::Result<()>;

    fn write_to(&self, link: Link, bytes: &[u8]) -> io::Result<()> {
        match link {
            Link::User => self.write_to_user(bytes),
            Link::Module => self.write_to_module(bytes),
            Link::Wifi => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "no egress transport for the wifi link",
            )),
        }
    }
}

/// Egress over any pair of byte writers (serial ports in production).
pub struct WriterSink<U, M> {
    user: Mutex<U>,
    module: Mutex<M>,
}

impl<U: Write + Send, M: Write + Send> WriterSink<U, M> {
    pub fn new(user: U, module: M) -> Self {
        Self {
            user: Mutex::new(user),
            module: Mutex::new(module),
        }
    }
}

impl<U: Write + Send, M: Write + Send> EgressSink for WriterSink<U, M> {
    fn write_to_user(&self, bytes: &[u8]) -> io::Result<()> {
        let mut user = self.user.lock().unwrap();
        user.write_all(bytes)?;
        user.flush()
    }

    fn write_to_module(&self, bytes: &[u8]) -> io::Result<()> {
        let mut module = self.module.lock().unwrap();
        module.write_all(bytes)?;
        module.flush()
    }
}
