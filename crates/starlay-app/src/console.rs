use std::io::BufRead;

use kanal::Sender;
use starlay_types::ControlEvent;

pub const HELP: &str = "\
commands:
  on | off                 toggle translation overlays
  cg on | cg off           toggle cutscene playback
  interval <ms>            set the polling interval
  region <index>           select the active region
  capture                  hash and archive the active region
  edit <text>              set the pending translation (\\n for newlines)
  save                     store the pending translation
  preview | clear          show or hide the pending translation
  status                   print runtime state
  quit                     tear down overlays and exit";

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ControlEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let event = match command.to_ascii_lowercase().as_str() {
        "on" => ControlEvent::SetTranslationEnabled(true),
        "off" => ControlEvent::SetTranslationEnabled(false),
        "translate" => ControlEvent::SetTranslationEnabled(parse_switch(rest)?),
        "cg" | "cutscene" => ControlEvent::SetCutsceneEnabled(parse_switch(rest)?),
        "interval" => ControlEvent::SetInterval(
            rest.parse()
                .map_err(|_| format!("invalid interval '{rest}'"))?,
        ),
        "region" => ControlEvent::SelectRegion(
            rest.parse()
                .map_err(|_| format!("invalid region index '{rest}'"))?,
        ),
        "capture" => ControlEvent::CaptureNow,
        "edit" => ControlEvent::EditTranslation(rest.replace("\\n", "\n")),
        "save" => ControlEvent::SaveTranslation,
        "preview" => ControlEvent::Preview,
        "clear" | "unpreview" => ControlEvent::ClearPreview,
        "status" => ControlEvent::Status,
        "quit" | "exit" => ControlEvent::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(event))
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(format!("expected on/off, got '{other}'")),
    }
}

/// Read operator commands from stdin on a plain thread, so a pending read
/// never holds up runtime shutdown
pub fn spawn_console(control_tx: Sender<ControlEvent>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Console read failed: {e}");
                        break;
                    }
                };

                if line.trim().eq_ignore_ascii_case("help") {
                    println!("{HELP}");
                    continue;
                }

                match parse_command(&line) {
                    Ok(Some(event)) => {
                        if control_tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("{e}"),
                }
            }
            tracing::debug!("Console closed");
        })?;
    Ok(())
}
