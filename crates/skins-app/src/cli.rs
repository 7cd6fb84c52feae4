//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{Result, bail};

pub const USAGE: &str = "\
usage: skins [--packages DIR] [--config FILE] <command>

commands:
  list                  list every available skin
  set [PACKAGE NAME]    apply a skin, or pick one
  save [NAME]           save the current settings as a user skin
  delete [NAME]         delete a user skin, or pick one

pickers: N picks row N, ?N previews it, empty input cancels

environment:
  SKINS_PACKAGES        packages directory (overridden by --packages)
  SKINS_CONFIG          configuration file (overridden by --config)
  RUST_LOG              log filter (default: info)";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Set {
        package: Option<String>,
        name: Option<String>,
    },
    Save {
        name: Option<String>,
    },
    Delete {
        name: Option<String>,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub packages: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub command: Command,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut packages = None;
        let mut config = None;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => {
                    return Ok(Self {
                        packages,
                        config,
                        command: Command::Help,
                    });
                },
                "--packages" => match args.next() {
                    Some(dir) => packages = Some(PathBuf::from(dir)),
                    None => bail!("--packages needs a directory"),
                },
                "--config" => match args.next() {
                    Some(file) => config = Some(PathBuf::from(file)),
                    None => bail!("--config needs a file"),
                },
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            None | Some("help") => Command::Help,
            Some("list") => Command::List,
            Some("set") => Command::Set {
                package: positional.next(),
                name: positional.next(),
            },
            Some("save") => Command::Save {
                name: positional.next(),
            },
            Some("delete") => Command::Delete {
                name: positional.next(),
            },
            Some(other) => bail!("unknown command {other}"),
        };
        if let Some(extra) = positional.next() {
            bail!("unexpected argument {extra}");
        }

        Ok(Self {
            packages,
            config,
            command,
        })
    }
}
