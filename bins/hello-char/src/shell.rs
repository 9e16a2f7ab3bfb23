use crate::command::{Command, CommandError};
use chardev_device::{CharDevice, DeviceSession, SessionId, WriteOutcome};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

/// Open sessions keyed by id, driven one command at a time.
pub struct Shell {
    device: CharDevice,
    sessions: BTreeMap<SessionId, DeviceSession>,
}

/// What the caller should do after a command ran.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Line(String),
    Quit,
}

impl Shell {
    pub fn new(device: CharDevice) -> Self {
        Self {
            device,
            sessions: BTreeMap::new(),
        }
    }

    pub fn execute(&mut self, cmd: Command) -> Result<Reply, CommandError> {
        let line = match cmd {
            Command::Open => {
                let session = self.device.open();
                let id = session.id();
                self.sessions.insert(id, session);
                format!("session {id}")
            }
            Command::Read { session, max_len } => {
                let bytes = self.session(session)?.read(max_len);
                if bytes.is_empty() {
                    "<eof>".to_string()
                } else {
                    String::from_utf8_lossy(&bytes).into_owned()
                }
            }
            Command::Write { session, mut data } => {
                data.push(b'\n');
                match self.session(session)?.write_checked(&data) {
                    WriteOutcome::Stored(n) => format!("wrote {n}"),
                    WriteOutcome::Truncated { stored, .. } => format!("wrote {stored} (truncated)"),
                }
            }
            Command::Close { session } => {
                self.sessions
                    .remove(&session)
                    .ok_or(CommandError::NoSuchSession(session))?
                    .close();
                format!("closed {session}")
            }
            Command::Stat => {
                let buffer = self.device.buffer();
                format!(
                    "device={} len={} generation={} open={}",
                    self.device.name(),
                    buffer.len(),
                    buffer.generation(),
                    self.device.open_sessions()
                )
            }
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Line(line))
    }

    fn session(&mut self, id: SessionId) -> Result<&mut DeviceSession, CommandError> {
        self.sessions
            .get_mut(&id)
            .ok_or(CommandError::NoSuchSession(id))
    }

    /// Runs commands read from `input` until `quit` or end of input.
    ///
    /// Lines are raw bytes. A line that does not parse or names an unknown
    /// session gets an `error:` reply and the loop carries on.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            let reply = match Command::parse(&line) {
                Ok(Some(cmd)) => self.execute(cmd),
                Ok(None) => continue,
                Err(e) => Err(e),
            };
            match reply {
                Ok(Reply::Line(text)) => writeln!(out, "{text}")?,
                Ok(Reply::Quit) => return Ok(()),
                Err(e) => {
                    warn!(error = %e, "command rejected");
                    writeln!(out, "error: {e}")?;
                }
            }
            out.flush()?;
        }
    }

    /// Closes every session still open.
    pub fn shutdown(&mut self) {
        let remaining = self.sessions.len();
        for (_, session) in std::mem::take(&mut self.sessions) {
            session.close();
        }
        info!(remaining, "shell shut down");
    }
}
