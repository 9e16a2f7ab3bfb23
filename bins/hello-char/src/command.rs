use chardev_device::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open,
    Read { session: SessionId, max_len: usize },
    /// Raw payload; the device is byte oriented, so it need not be UTF-8.
    Write { session: SessionId, data: Vec<u8> },
    Close { session: SessionId },
    Stat,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{command}' expects {usage}")]
    Usage {
        command: &'static str,
        usage: &'static str,
    },

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("no open session {0}")]
    NoSuchSession(SessionId),
}

fn number(token: &[u8]) -> Result<u64, CommandError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CommandError::NotANumber(String::from_utf8_lossy(token).into_owned()))
}

fn session(
    token: Option<&[u8]>,
    command: &'static str,
    usage: &'static str,
) -> Result<SessionId, CommandError> {
    let token = token.ok_or(CommandError::Usage { command, usage })?;
    Ok(SessionId(number(token)?))
}

/// Splits off the first whitespace-delimited token; the tail keeps its inner spacing.
fn split_token(s: &[u8]) -> (&[u8], &[u8]) {
    match s.iter().position(u8::is_ascii_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_ascii_start()),
        None => (s, &[][..]),
    }
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &[u8]) -> Result<Option<Self>, CommandError> {
        let (head, rest) = split_token(line.trim_ascii());
        let (first, tail) = split_token(rest);
        let first = (!first.is_empty()).then_some(first);

        let cmd = match head {
            b"" => return Ok(None),
            b"open" => Command::Open,
            b"read" => {
                const USAGE: &str = "<id> <max_len>";
                let session = session(first, "read", USAGE)?;
                let (max_len, _) = split_token(tail);
                if max_len.is_empty() {
                    return Err(CommandError::Usage {
                        command: "read",
                        usage: USAGE,
                    });
                }
                Command::Read {
                    session,
                    max_len: number(max_len)? as usize,
                }
            }
            b"write" => Command::Write {
                session: session(first, "write", "<id> <text...>")?,
                data: tail.to_vec(),
            },
            b"close" => Command::Close {
                session: session(first, "close", "<id>")?,
            },
            b"stat" => Command::Stat,
            b"quit" | b"exit" => Command::Quit,
            other => {
                return Err(CommandError::Unknown(
                    String::from_utf8_lossy(other).into_owned(),
                ));
            }
        };
        Ok(Some(cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(Command::parse(b"   \n"), Ok(None));
    }

    #[test]
    fn parses_read() {
        assert_eq!(
            Command::parse(b"read 3 256\r\n"),
            Ok(Some(Command::Read {
                session: SessionId(3),
                max_len: 256
            }))
        );
    }

    #[test]
    fn write_keeps_inner_spacing() {
        assert_eq!(
            Command::parse(b"write 1 Hello  from kernel!"),
            Ok(Some(Command::Write {
                session: SessionId(1),
                data: b"Hello  from kernel!".to_vec()
            }))
        );
    }

    #[test]
    fn write_carries_non_utf8_bytes() {
        assert_eq!(
            Command::parse(b"write 1 caf\xe9\n"),
            Ok(Some(Command::Write {
                session: SessionId(1),
                data: b"caf\xe9".to_vec()
            }))
        );
    }

    #[test]
    fn write_without_text_is_empty_write() {
        assert_eq!(
            Command::parse(b"write 2"),
            Ok(Some(Command::Write {
                session: SessionId(2),
                data: Vec::new()
            }))
        );
    }

    #[test]
    fn missing_and_bad_arguments() {
        assert!(matches!(
            Command::parse(b"read 1"),
            Err(CommandError::Usage { command: "read", .. })
        ));
        assert_eq!(
            Command::parse(b"close x"),
            Err(CommandError::NotANumber("x".into()))
        );
        assert_eq!(
            Command::parse(b"close \xff"),
            Err(CommandError::NotANumber("\u{fffd}".into()))
        );
        assert_eq!(
            Command::parse(b"frobnicate"),
            Err(CommandError::Unknown("frobnicate".into()))
        );
    }
}
