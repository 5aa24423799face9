//! Interactive session over one studio

use crate::files::{load_sketch, save_variant, save_variants, variant_data_url};
use anyhow::Result;
use netsketch_core::{DiagramStudio, StudioError, VariantId, VariantStatus, WorkflowState};
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Help text printed by `help`
pub const HELP: &str = "\
commands:
  generate              render every style variant of the sketch
  list                  show variants and their status
  select <id>           choose a variant to edit, e.g. select flat-2d-1
  edit <instruction>    change the selected variant, e.g. edit move node HUB left
  save <id> <path>      write one variant to a file (`-` prints a data URL)
  save-all <dir>        write every ready variant into a directory
  upload <path|url>     replace the sketch with a file or data: URL (discards all variants)
  key                   select an API key
  help                  show this text
  quit                  leave the session";

/// One parsed session line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Generate,
    List,
    Select(VariantId),
    Edit(String),
    Save(VariantId, PathBuf),
    SaveAll(PathBuf),
    Upload(String),
    Key,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse one input line; blank lines yield `None`
    ///
    /// # Errors
    /// A usage message for unknown commands or bad arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word {
            "generate" | "gen" => Self::Generate,
            "list" | "ls" => Self::List,
            "select" => Self::Select(parse_id(rest)?),
            "edit" => {
                if rest.is_empty() {
                    return Err("usage: edit <instruction>".to_string());
                }
                Self::Edit(rest.to_string())
            }
            "save" => {
                let (id, path) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "usage: save <id> <path>".to_string())?;
                Self::Save(parse_id(id)?, PathBuf::from(path.trim()))
            }
            "save-all" => Self::SaveAll(required_path(rest, "save-all <dir>")?),
            "upload" => {
                if rest.is_empty() {
                    return Err("usage: upload <path|data-url>".to_string());
                }
                Self::Upload(rest.to_string())
            }
            "key" => Self::Key,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command `{other}`; try `help`")),
        };
        Ok(Some(command))
    }
}

fn parse_id(text: &str) -> Result<VariantId, String> {
    text.trim().parse().map_err(|e| format!("{e}"))
}

fn required_path(text: &str, usage: &str) -> Result<PathBuf, String> {
    if text.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(PathBuf::from(text))
    }
}

/// Render the variant list, marking the selection
#[must_use]
pub fn render_variants(state: &WorkflowState) -> String {
    if state.variants().is_empty() {
        return "no variants yet; run `generate`".to_string();
    }
    let mut out = String::new();
    for variant in state.variants() {
        let marker = if state.selected() == Some(variant.id) {
            '*'
        } else {
            ' '
        };
        let status = match (&variant.status, &variant.image, &variant.error) {
            (VariantStatus::Ready, Some(image), _) => {
                format!("ready ({}, {} bytes)", image.media_type, image.len())
            }
            (VariantStatus::Failed, _, Some(error)) => format!("failed: {error}"),
            (VariantStatus::Pending, _, _) => "pending".to_string(),
            (status, _, _) => format!("{status:?}").to_lowercase(),
        };
        let _ = writeln!(
            out,
            "{marker} {:<18} {:<20} {status}",
            variant.id.to_string(),
            variant.style().label()
        );
    }
    out.trim_end().to_string()
}

/// Run one command; `Ok(false)` ends the session
///
/// # Errors
/// Filesystem errors from `upload` and `save`. Workflow errors are printed
/// and the session continues.
pub async fn execute(studio: &DiagramStudio, command: SessionCommand) -> Result<bool> {
    match command {
        SessionCommand::Generate => match studio.generate_all().await {
            Ok(Some(report)) => {
                println!(
                    "{} ready, {} failed",
                    report.succeeded.len(),
                    report.failed.len()
                );
                for (id, error) in &report.failed {
                    println!("  {id}: {error}");
                }
            }
            Ok(None) => println!("nothing to generate; upload a sketch first"),
            Err(e) => report_error(&e),
        },
        SessionCommand::List => println!("{}", render_variants(&studio.snapshot())),
        SessionCommand::Select(id) => match studio.select(id) {
            Ok(()) => println!("selected {id}"),
            Err(e) => report_error(&e),
        },
        SessionCommand::Edit(instruction) => match studio.edit(&instruction).await {
            Ok(Some(outcome)) => println!("{} updated", outcome.variant),
            Ok(None) => println!("nothing to edit; select a ready variant first"),
            Err(e) => report_error(&e),
        },
        SessionCommand::Save(id, path) if path.as_os_str() == "-" => {
            println!("{}", variant_data_url(&studio.snapshot(), id)?);
        }
        SessionCommand::Save(id, path) => {
            save_variant(&studio.snapshot(), id, &path)?;
            println!("wrote {}", path.display());
        }
        SessionCommand::SaveAll(dir) => {
            for path in save_variants(&studio.snapshot(), &dir)? {
                println!("wrote {}", path.display());
            }
        }
        SessionCommand::Upload(source) => {
            studio.upload(load_sketch(&source)?);
            println!("sketch replaced; previous variants discarded");
        }
        SessionCommand::Key => match studio.ensure_credential().await {
            Ok(()) => println!("API key active"),
            Err(e) => report_error(&e),
        },
        SessionCommand::Help => println!("{HELP}"),
        SessionCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn report_error(err: &StudioError) {
    tracing::debug!(error = ?err, "command failed");
    println!("error: {err}");
    if err.needs_credential() {
        println!("hint: run `key` to select an API key");
    } else if err.is_retryable() {
        println!("hint: this may succeed if you try again");
    }
}

/// Read commands from `input` until `quit` or end of input
///
/// # Errors
/// Propagates read errors and the errors of [`execute`].
pub async fn run<R>(studio: &DiagramStudio, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    println!("{HELP}");
    while let Some(line) = lines.next_line().await? {
        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };
        match execute(studio, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {e:#}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netsketch_core::StyleCategory;
    use netsketch_test_utils::{sample_png, setup_test_studio, ScriptedGenerator};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn parses_commands() {
        let id = VariantId::new(StyleCategory::TopDown3d, 2);
        assert_eq!(SessionCommand::parse("   "), Ok(None));
        assert_eq!(
            SessionCommand::parse("select top-down-3d-2"),
            Ok(Some(SessionCommand::Select(id)))
        );
        assert_eq!(
            SessionCommand::parse("edit  move node HUB left "),
            Ok(Some(SessionCommand::Edit("move node HUB left".to_string())))
        );
        assert_eq!(
            SessionCommand::parse("save top-down-3d-2 out/hub.png"),
            Ok(Some(SessionCommand::Save(id, PathBuf::from("out/hub.png"))))
        );
        assert_eq!(
            SessionCommand::parse("upload data:image/png;base64,AQID"),
            Ok(Some(SessionCommand::Upload(
                "data:image/png;base64,AQID".to_string()
            )))
        );
        assert_eq!(SessionCommand::parse("q"), Ok(Some(SessionCommand::Quit)));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(SessionCommand::parse("edit").is_err());
        assert!(SessionCommand::parse("select flat-2d-3").is_err());
        assert!(SessionCommand::parse("save flat-2d-1").is_err());
        assert!(SessionCommand::parse("dance").is_err());
    }

    #[tokio::test]
    async fn scripted_session_generates_and_edits() {
        let generator = Arc::new(ScriptedGenerator::new());
        let studio = setup_test_studio(Arc::clone(&generator));
        studio.upload(sample_png(24, 24));

        let input: &[u8] = b"generate\nselect flat-2d-2\nedit add a firewall\nquit\nlist\n";
        run(&studio, input).await.unwrap();

        // quit stops before `list`; six variants plus one edit were requested
        assert_eq!(generator.call_count(), 7);
        let state = studio.snapshot();
        assert_eq!(
            state.selected(),
            Some(VariantId::new(StyleCategory::Flat2d, 2))
        );
    }

    #[tokio::test]
    async fn upload_accepts_data_url() {
        let studio = setup_test_studio(Arc::new(ScriptedGenerator::new()));
        let keep = execute(
            &studio,
            SessionCommand::Upload("data:image/png;base64,AQID".to_string()),
        )
        .await
        .unwrap();

        assert!(keep);
        let state = studio.snapshot();
        assert_eq!(state.source().unwrap().bytes, vec![1, 2, 3]);
    }

    #[test]
    fn renders_empty_and_selected() {
        let mut state = WorkflowState::new();
        assert!(render_variants(&state).contains("no variants"));

        state.set_source(sample_png(4, 4));
        let batch = state.begin_generation().unwrap();
        let id = VariantId::new(StyleCategory::Flat2d, 1);
        state.update_variant(batch, id, Ok(sample_png(4, 4))).unwrap();
        state.select_variant(id).unwrap();

        let text = render_variants(&state);
        assert!(text.starts_with("* flat-2d-1"));
        assert!(text.contains("pending"));
    }
}
