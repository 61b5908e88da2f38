// Pilot commands and their text form `function|arg1,arg2`.

use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FireVerniers { target: String, amount: f64 },
    ChangeEngines { target: String, delta: f64 },
    FireRcs { target: String, direction: f64 },
    AccelerateTime { delta: i64 },
    Open { path: String },
}

/// Commands received in one message; applied together or not at all.
pub type CommandBatch = Vec<Command>;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    MissingSeparator(String),
    UnknownFunction(String),
    WrongArgumentCount {
        function: &'static str,
        expected: usize,
        found: usize,
    },
    InvalidNumber {
        function: &'static str,
        value: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MissingSeparator(token) => {
                write!(f, "expected exactly one '|' in {token:?}")
            }
            CommandError::UnknownFunction(function) => write!(f, "unknown function {function:?}"),
            CommandError::WrongArgumentCount {
                function,
                expected,
                found,
            } => write!(f, "{function} takes {expected} argument(s), got {found}"),
            CommandError::InvalidNumber { function, value } => {
                write!(f, "{function}: {value:?} is not a number")
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    pub fn function(&self) -> &'static str {
        match self {
            Command::FireVerniers { .. } => "fire_verniers",
            Command::ChangeEngines { .. } => "change_engines",
            Command::FireRcs { .. } => "fire_rcs",
            Command::AccelerateTime { .. } => "accelerate_time",
            Command::Open { .. } => "open",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = self.function();
        match self {
            Command::FireVerniers { target, amount } => write!(f, "{function}|{target},{amount}"),
            Command::ChangeEngines { target, delta } => write!(f, "{function}|{target},{delta}"),
            Command::FireRcs { target, direction } => {
                write!(f, "{function}|{target},{direction}")
            }
            Command::AccelerateTime { delta } => write!(f, "{function}|{delta}"),
            Command::Open { path } => write!(f, "{function}|{path}"),
        }
    }
}

fn arguments<'a>(
    function: &'static str,
    args: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, CommandError> {
    let args: Vec<&str> = if args.is_empty() {
        Vec::new()
    } else {
        args.split(',').collect()
    };
    if args.len() != expected {
        return Err(CommandError::WrongArgumentCount {
            function,
            expected,
            found: args.len(),
        });
    }
    Ok(args)
}

fn number(function: &'static str, value: &str) -> Result<f64, CommandError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::InvalidNumber {
            function,
            value: value.to_string(),
        })
}

/// Parses a single `function|args` token.
pub fn parse_command(token: &str) -> Result<Command, CommandError> {
    let (function, args) = token
        .split_once('|')
        .filter(|(_, args)| !args.contains('|'))
        .ok_or_else(|| CommandError::MissingSeparator(token.to_string()))?;

    match function {
        "fire_verniers" => {
            let args = arguments("fire_verniers", args, 2)?;
            Ok(Command::FireVerniers {
                target: args[0].to_string(),
                amount: number("fire_verniers", args[1])?,
            })
        }
        "change_engines" => {
            let args = arguments("change_engines", args, 2)?;
            Ok(Command::ChangeEngines {
                target: args[0].to_string(),
                delta: number("change_engines", args[1])?,
            })
        }
        "fire_rcs" => {
            let args = arguments("fire_rcs", args, 2)?;
            Ok(Command::FireRcs {
                target: args[0].to_string(),
                direction: number("fire_rcs", args[1])?,
            })
        }
        "accelerate_time" => {
            let args = arguments("accelerate_time", args, 1)?;
            let delta = args[0]
                .parse::<i64>()
                .map_err(|_| CommandError::InvalidNumber {
                    function: "accelerate_time",
                    value: args[0].to_string(),
                })?;
            Ok(Command::AccelerateTime { delta })
        }
        "open" => {
            let args = arguments("open", args, 1)?;
            Ok(Command::Open {
                path: args[0].to_string(),
            })
        }
        other => Err(CommandError::UnknownFunction(other.to_string())),
    }
}

/// Parses a space-separated batch. Malformed commands are logged and dropped
/// without affecting the rest of the batch.
pub fn parse_batch(text: &str) -> CommandBatch {
    text.split_whitespace()
        .filter_map(|token| match parse_command(token) {
            Ok(command) => Some(command),
            Err(e) => {
                warn!(command = token, error = %e, "skipping malformed command");
                None
            }
        })
        .collect()
}
