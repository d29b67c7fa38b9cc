use crate::config::WidgetId;
use crate::events::{HostEvent, KeyCommand};
use async_channel::Sender;
use rangekit::{Knobs, PointerInput};
use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/arcrange.sock";

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' is missing its {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("'{command}' takes no argument '{extra}'")]
    TrailingArgument { command: &'static str, extra: String },
    #[error("'{value}' is not a number")]
    InvalidNumber {
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("unknown key '{0}'")]
    InvalidKey(String),
}

struct Args<'a> {
    command: &'static str,
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next(&mut self, argument: &'static str) -> Result<&'a str, CommandError> {
        self.words.next().ok_or(CommandError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn number(&mut self, argument: &'static str) -> Result<f64, CommandError> {
        let word = self.next(argument)?;
        word.parse().map_err(|source| CommandError::InvalidNumber {
            value: word.to_string(),
            source,
        })
    }

    fn widget(&mut self) -> Result<WidgetId, CommandError> {
        self.next("widget id").map(WidgetId::new)
    }

    fn finish(mut self) -> Result<(), CommandError> {
        match self.words.next() {
            Some(extra) => Err(CommandError::TrailingArgument {
                command: self.command,
                extra: extra.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Parses one line of the socket protocol.
pub fn parse_command(line: &str) -> Result<HostEvent, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err(CommandError::Empty);
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "down" => "down",
        "touch" => "touch",
        "move" => "move",
        "up" => "up",
        "cancel" => "cancel",
        "key" => "key",
        "set" => "set",
        "drop" => "drop",
        "reload" => "reload",
        _ => return Err(CommandError::Unknown(name.to_string())),
    };
    let mut args = Args { command, words };

    let event = match command {
        "down" | "touch" => {
            let widget = args.widget()?;
            let (x, y) = (args.number("x")?, args.number("y")?);
            let input = if command == "touch" {
                PointerInput::touch(x, y)
            } else {
                PointerInput::mouse(x, y)
            };
            HostEvent::PointerDown { widget, input }
        }
        "move" => {
            let (x, y) = (args.number("x")?, args.number("y")?);
            HostEvent::PointerMove(PointerInput::mouse(x, y))
        }
        "up" => HostEvent::PointerUp,
        "cancel" => HostEvent::PointerCancel,
        "key" => {
            let widget = args.widget()?;
            let name = args.next("key")?;
            let key = name
                .parse::<KeyCommand>()
                .map_err(|_| CommandError::InvalidKey(name.to_string()))?;
            HostEvent::Key { widget, key }
        }
        "set" => {
            let widget = args.widget()?;
            let first = args.number("value")?;
            let values = match args.words.clone().next() {
                Some(_) => Knobs::Two(first, args.number("second value")?),
                None => Knobs::One(first),
            };
            HostEvent::SetValue { widget, values }
        }
        "drop" => HostEvent::Teardown(args.widget()?),
        _ => HostEvent::ConfigReload,
    };

    args.finish()?;
    Ok(event)
}

pub async fn run_server(tx: Sender<HostEvent>, socket_path: PathBuf) {
    if fs_err::metadata(&socket_path).is_ok() {
        let _ = fs_err::remove_file(&socket_path);
    }

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket_path.display(), e);
            return;
        }
    };
    log::info!("Listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_command(&line) {
                            Ok(event) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(CommandError::Empty) => {}
                            Err(e) => log::warn!("Ignoring '{}': {}", line.trim(), e),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(s: &str) -> WidgetId {
        WidgetId::new(s)
    }

    #[test]
    fn test_pointer_commands() {
        assert_eq!(
            parse_command("down volume 40 25.5").unwrap(),
            HostEvent::PointerDown {
                widget: widget("volume"),
                input: PointerInput::mouse(40.0, 25.5),
            }
        );
        assert_eq!(
            parse_command("TOUCH hue -3 4").unwrap(),
            HostEvent::PointerDown {
                widget: widget("hue"),
                input: PointerInput::touch(-3.0, 4.0),
            }
        );
        assert_eq!(
            parse_command("  move 1 2  ").unwrap(),
            HostEvent::PointerMove(PointerInput::mouse(1.0, 2.0))
        );
        assert_eq!(parse_command("up").unwrap(), HostEvent::PointerUp);
        assert_eq!(parse_command("cancel").unwrap(), HostEvent::PointerCancel);
    }

    #[test]
    fn test_widget_commands() {
        assert_eq!(
            parse_command("key price ArrowUp").unwrap(),
            HostEvent::Key {
                widget: widget("price"),
                key: KeyCommand::Up,
            }
        );
        assert_eq!(
            parse_command("set price 10 90").unwrap(),
            HostEvent::SetValue {
                widget: widget("price"),
                values: Knobs::Two(10.0, 90.0),
            }
        );
        assert_eq!(
            parse_command("set volume 7").unwrap(),
            HostEvent::SetValue {
                widget: widget("volume"),
                values: Knobs::One(7.0),
            }
        );
        assert_eq!(parse_command("drop volume").unwrap(), HostEvent::Teardown(widget("volume")));
        assert_eq!(parse_command("reload").unwrap(), HostEvent::ConfigReload);
    }

    #[test]
    fn test_malformed_commands() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(parse_command("jump"), Err(CommandError::Unknown("jump".into())));
        assert_eq!(
            parse_command("down volume 3"),
            Err(CommandError::MissingArgument {
                command: "down",
                argument: "y",
            })
        );
        assert!(matches!(
            parse_command("move x 3"),
            Err(CommandError::InvalidNumber { value, .. }) if value == "x"
        ));
        assert_eq!(parse_command("key volume home"), Err(CommandError::InvalidKey("home".into())));
        assert_eq!(
            parse_command("up now"),
            Err(CommandError::TrailingArgument {
                command: "up",
                extra: "now".into(),
            })
        );
        assert_eq!(
            parse_command("set price 1 2 3"),
            Err(CommandError::TrailingArgument {
                command: "set",
                extra: "3".into(),
            })
        );
    }
}
