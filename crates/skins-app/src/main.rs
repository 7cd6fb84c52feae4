//! Skins manager command-line entry point.
//!
//! Works on a packages directory laid out like the editor's: skins are read
//! from every `*.skins` file, settings from `User/*.sublime-settings`.
//! Pickers and name prompts are answered on stdin.

mod cli;
mod stdio;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};

use cli::{Args, Command, USAGE};
use skins_core::{Host, Outcome, SkinController};
use skins_host::{DirectoryResources, FileSettings, SettingsStore, Window};
use skins_types::config::SkinsConfig;
use stdio::{Answer, StdioWindow};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse(std::env::args().skip(1))?;
    if args.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = resolve_config(&args)?;
    log::debug!("Using packages at {}", config.packages_path.display());

    let stdin = std::io::stdin();
    let mut window = StdioWindow::new(stdin.lock(), std::io::stdout());
    match run(config, args.command, &mut window)? {
        Outcome::Failed(e) => bail!(e),
        outcome => log::debug!("Finished with {outcome:?}"),
    }
    Ok(())
}

/// Config file from `--config`/`SKINS_CONFIG`, packages directory from
/// `--packages`/`SKINS_PACKAGES` if given.
fn resolve_config(args: &Args) -> Result<SkinsConfig> {
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os("SKINS_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("skins.toml"));
    let mut config = SkinsConfig::load(&config_path)?;
    if let Some(dir) = args
        .packages
        .clone()
        .or_else(|| std::env::var_os("SKINS_PACKAGES").map(PathBuf::from))
    {
        config.packages_path = dir;
    }
    if !config.packages_path.is_dir() {
        bail!(
            "packages directory {} does not exist",
            config.packages_path.display()
        );
    }
    Ok(config)
}

/// Run one command to completion, answering pickers and prompts from the
/// window's input.
fn run<R: BufRead, W: Write>(
    config: SkinsConfig,
    command: Command,
    window: &mut StdioWindow<R, W>,
) -> Result<Outcome> {
    let mut resources = DirectoryResources::new(&config.packages_path);
    let mut settings = FileSettings::new(&config.packages_path);
    let delay = Duration::from_millis(config.preview_delay_ms);
    let mut controller = SkinController::new(config);

    macro_rules! host {
        () => {
            &mut Host {
                resources: &mut resources,
                settings: &mut settings,
                window: &mut *window,
            }
        };
    }

    let mut outcome = match command {
        Command::Help => return Ok(Outcome::NothingToDo),
        Command::List => {
            list(&controller, &resources, &mut settings, window)?;
            return Ok(Outcome::NothingToDo);
        },
        Command::Set { package, name } => {
            controller.set_skin(host!(), package.as_deref(), name.as_deref())
        },
        Command::Save { name } => controller.save_user_skin(host!(), name.as_deref()),
        Command::Delete { name } => controller.delete_user_skin(host!(), name.as_deref()),
    };

    loop {
        outcome = match outcome {
            Outcome::AwaitingSelection => match window.read_answer()? {
                Answer::Preview(index) => {
                    if let Some(ticket) = controller.on_highlight(index) {
                        std::thread::sleep(delay);
                        controller.preview(host!(), ticket);
                    }
                    Outcome::AwaitingSelection
                },
                Answer::Choose(index) => controller.on_select(host!(), Some(index)),
                Answer::Cancel => controller.on_select(host!(), None),
            },
            Outcome::AwaitingInput => match window.read_text()? {
                Some(text) => controller.on_input_done(host!(), &text),
                None => controller.on_input_cancel(),
            },
            done => return Ok(done),
        };
    }
}

fn list<R: BufRead, W: Write>(
    controller: &SkinController,
    resources: &DirectoryResources,
    settings: &mut FileSettings,
    window: &mut StdioWindow<R, W>,
) -> std::io::Result<()> {
    let config = controller.config();
    let active = settings
        .load_settings(&config.preferences)
        .ok()
        .and_then(|p| p.get(&config.active_skin_key).cloned())
        .and_then(|v| v.as_str().map(str::to_string));

    let mut count = 0;
    for skin in controller.repository().enumerate_all(resources) {
        let id = skin.id();
        let marker = if active.as_deref() == Some(id.as_str()) { '*' } else { ' ' };
        window.print_line(&format!("{marker} {id}"))?;
        count += 1;
    }
    if count == 0 {
        window.status_message("No skins found!");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use skins_types::error::SkinsError;
    use std::fs;
    use std::io::Cursor;

    const SCHEME: &str = "Packages/Color Scheme - Default/Monokai.sublime-color-scheme";
    const THEME: &str = "Packages/Theme - Default/Default.sublime-theme";

    fn packages() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Color Scheme - Default")).unwrap();
        fs::create_dir_all(root.join("Theme - Default")).unwrap();
        fs::create_dir_all(root.join("Theme - Pack")).unwrap();
        fs::create_dir_all(root.join("User")).unwrap();
        fs::write(root.join("Color Scheme - Default/Monokai.sublime-color-scheme"), "{}").unwrap();
        fs::write(root.join("Theme - Default/Default.sublime-theme"), "[]").unwrap();
        fs::write(
            root.join("Theme - Pack/Pack.skins"),
            json!({
                "Dark": {
                    "Preferences": {"color_scheme": SCHEME, "theme": THEME},
                    "Widget": {"font_size": 9}
                }
            })
            .to_string(),
        )
        .unwrap();
        dir
    }

    fn config(dir: &tempfile::TempDir) -> SkinsConfig {
        SkinsConfig {
            packages_path: dir.path().to_path_buf(),
            preview_delay_ms: 0,
            ..SkinsConfig::default()
        }
    }

    fn window(input: &str) -> StdioWindow<Cursor<Vec<u8>>, Vec<u8>> {
        StdioWindow::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn read_json(path: std::path::PathBuf) -> Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn set_by_name_writes_settings() {
        let dir = packages();
        let out = run(
            config(&dir),
            Command::Set {
                package: Some("Theme - Pack".into()),
                name: Some("Dark".into()),
            },
            &mut window(""),
        )
        .unwrap();
        assert!(matches!(out, Outcome::Applied(_)));
        let prefs = read_json(dir.path().join("User/Preferences.sublime-settings"));
        assert_eq!(prefs["skin"], json!("Theme - Pack/Dark"));
        assert_eq!(prefs["color_scheme"], json!(SCHEME));
        let widget = read_json(dir.path().join("User/Widget.sublime-settings"));
        assert_eq!(widget["font_size"], json!(9));
    }

    #[test]
    fn set_via_picker_answer() {
        let dir = packages();
        let out = run(
            config(&dir),
            Command::Set {
                package: None,
                name: None,
            },
            &mut window("1\n"),
        )
        .unwrap();
        assert!(matches!(out, Outcome::Applied(ref id) if id == "Theme - Pack/Dark"));
    }

    #[test]
    fn picker_cancel_aborts() {
        let dir = packages();
        let out = run(
            config(&dir),
            Command::Set {
                package: None,
                name: None,
            },
            &mut window("\n"),
        )
        .unwrap();
        assert!(matches!(out, Outcome::Aborted));
    }

    #[test]
    fn preview_then_cancel_restores_preferences() {
        let dir = packages();
        fs::write(
            dir.path().join("User/Preferences.sublime-settings"),
            json!({"theme": "Old.sublime-theme"}).to_string(),
        )
        .unwrap();
        let mut w = window("?1\n\n");
        let out = run(
            config(&dir),
            Command::Set {
                package: None,
                name: None,
            },
            &mut w,
        )
        .unwrap();
        assert!(matches!(out, Outcome::Aborted));
        let prefs = read_json(dir.path().join("User/Preferences.sublime-settings"));
        assert_eq!(prefs, json!({"theme": "Old.sublime-theme"}));
    }

    #[test]
    fn preview_then_choose_applies() {
        let dir = packages();
        let out = run(
            config(&dir),
            Command::Set {
                package: None,
                name: None,
            },
            &mut window("?1\n1\n"),
        )
        .unwrap();
        assert!(matches!(out, Outcome::Applied(ref id) if id == "Theme - Pack/Dark"));
        let prefs = read_json(dir.path().join("User/Preferences.sublime-settings"));
        assert_eq!(prefs["theme"], json!(THEME));
    }

    #[test]
    fn delete_without_user_skins_fails() {
        let dir = packages();
        let out = run(config(&dir), Command::Delete { name: None }, &mut window("")).unwrap();
        assert!(matches!(out, Outcome::Failed(SkinsError::EmptyCollection)));
    }

    #[test]
    fn save_prompted_then_delete() {
        let dir = packages();
        fs::write(
            dir.path().join("User/Preferences.sublime-settings"),
            json!({"color_scheme": SCHEME, "theme": THEME}).to_string(),
        )
        .unwrap();

        let out = run(config(&dir), Command::Save { name: None }, &mut window("Mine\n")).unwrap();
        assert!(matches!(out, Outcome::Saved(ref n) if n == "Mine"));
        let saved = read_json(dir.path().join("User/Saved Skins.skins"));
        assert_eq!(saved["Mine"]["Preferences"]["theme"], json!(THEME));

        let out = run(config(&dir), Command::Delete { name: None }, &mut window("1\n")).unwrap();
        assert!(matches!(out, Outcome::Deleted(ref n) if n == "Mine"));
        assert_eq!(read_json(dir.path().join("User/Saved Skins.skins")), json!({}));
    }

    #[test]
    fn list_marks_active() {
        let dir = packages();
        fs::write(
            dir.path().join("User/Preferences.sublime-settings"),
            "{ \"skin\": \"Theme - Pack/Dark\", }",
        )
        .unwrap();
        let mut w = window("");
        run(config(&dir), Command::List, &mut w).unwrap();
        let out = String::from_utf8(w.into_output()).unwrap();
        assert_eq!(out, "* Theme - Pack/Dark\n");
    }
}
