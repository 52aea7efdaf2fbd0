//! Slash-command parsing and execution used by the chat loop.
//!
//! Commands mutate app state directly; the variants of [`CommandResult`]
//! tell the loop when a follow-up network call is needed.

use std::path::PathBuf;

use crate::core::app::App;
use crate::core::message::Message;
use crate::core::providers::{self, AUTO_ROUTE_DISPLAY_NAME, KNOWN_PROVIDERS};
use crate::core::session::MODES;

pub enum CommandResult {
    /// Command handled entirely client-side.
    Continue,
    /// Not a command; send as a chat message.
    ProcessAsMessage(String),
    /// Upload this file, then hold it as the pending attachment.
    Attach(PathBuf),
    /// Push the (already applied) provider selection to the server.
    SetProvider(String),
}

struct CommandUsage {
    syntax: &'static str,
    description: &'static str,
}

const USAGES: &[CommandUsage] = &[
    CommandUsage {
        syntax: "/attach <path>",
        description: "upload an image to send with the next message",
    },
    CommandUsage {
        syntax: "/detach",
        description: "remove the pending attachment",
    },
    CommandUsage {
        syntax: "/mode [name]",
        description: "select a response mode for the next message (no name clears it)",
    },
    CommandUsage {
        syntax: "/provider [name]",
        description: "pin a provider, or list the available ones",
    },
    CommandUsage {
        syntax: "/log [filename]",
        description: "enable transcript logging, or pause/resume it",
    },
    CommandUsage {
        syntax: "/dump [filename]",
        description: "export the conversation to a text file",
    },
    CommandUsage {
        syntax: "/help",
        description: "show this help",
    },
];

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match command_name {
        "help" => handle_help(app),
        "attach" => handle_attach(app, args),
        "detach" => handle_detach(app),
        "mode" => handle_mode(app, args),
        "provider" => handle_provider(app, args),
        "log" => handle_log(app, args),
        "dump" => handle_dump(app, args),
        _ => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

fn handle_help(app: &mut App) -> CommandResult {
    let mut help = format!(
        "neurochat {} ({})\n",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );
    for usage in USAGES {
        help.push_str(&format!("{} — {}\n", usage.syntax, usage.description));
    }
    app.append_message(Message::app_info(help.trim_end().to_string()));
    CommandResult::Continue
}

fn handle_attach(app: &mut App, args: &str) -> CommandResult {
    if args.is_empty() {
        app.append_message(Message::app_error("Usage: /attach <path>"));
        return CommandResult::Continue;
    }
    CommandResult::Attach(PathBuf::from(args))
}

fn handle_detach(app: &mut App) -> CommandResult {
    if app.session.attachment.take().is_some() {
        app.append_message(Message::app_info("Attachment removed."));
    } else {
        app.append_message(Message::app_info("No attachment to remove."));
    }
    CommandResult::Continue
}

fn handle_mode(app: &mut App, args: &str) -> CommandResult {
    if args.is_empty() {
        app.session.clear_mode();
        app.append_message(Message::app_info(format!(
            "Mode cleared. Available modes: {}",
            MODES.join(", ")
        )));
        return CommandResult::Continue;
    }
    match app.session.select_mode(args) {
        Ok(()) => {
            let mode = app.session.mode.as_deref().unwrap_or(args).to_string();
            app.append_message(Message::app_info(format!(
                "Mode '{mode}' will apply to your next message."
            )));
        }
        Err(err) => app.append_message(Message::app_error(err)),
    }
    CommandResult::Continue
}

fn handle_provider(app: &mut App, args: &str) -> CommandResult {
    if args.is_empty() {
        let known = KNOWN_PROVIDERS
            .iter()
            .map(|info| info.id)
            .collect::<Vec<_>>()
            .join(", ");
        app.append_message(Message::app_info(format!(
            "Current provider: {}. Available: {known}, or {} for auto-routing.",
            providers::display_name(&app.session.provider),
            AUTO_ROUTE_DISPLAY_NAME
        )));
        return CommandResult::Continue;
    }

    let provider = args.to_ascii_lowercase();
    app.select_provider(&provider);
    CommandResult::SetProvider(provider)
}

fn handle_dump(app: &mut App, args: &str) -> CommandResult {
    let filename = if args.is_empty() {
        format!(
            "neurochat-log-{}.txt",
            chrono::Local::now().format("%Y-%m-%d")
        )
    } else {
        args.to_string()
    };
    match crate::utils::logging::dump_transcript(&app.messages, &filename) {
        Ok(()) => app.append_message(Message::app_info(format!(
            "Conversation saved to: {filename}"
        ))),
        Err(err) => app.append_message(Message::app_error(format!("Dump error: {err}"))),
    }
    CommandResult::Continue
}

fn handle_log(app: &mut App, args: &str) -> CommandResult {
    let result = if args.is_empty() {
        app.logging.toggle_logging()
    } else {
        app.logging.set_log_file(args.to_string())
    };
    match result {
        Ok(message) => app.append_message(Message::app_info(message)),
        Err(err) => app.append_message(Message::app_error(format!("Log error: {err}"))),
    }
    CommandResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Sender;
    use crate::core::providers::AUTO_ROUTE;

    #[test]
    fn plain_text_is_forwarded_as_a_message() {
        let mut app = App::new(AUTO_ROUTE);
        match process_input(&mut app, "hello there") {
            CommandResult::ProcessAsMessage(text) => assert_eq!(text, "hello there"),
            _ => panic!("expected message passthrough"),
        }
    }

    #[test]
    fn unknown_commands_are_forwarded_too() {
        let mut app = App::new(AUTO_ROUTE);
        assert!(matches!(
            process_input(&mut app, "/frobnicate now"),
            CommandResult::ProcessAsMessage(_)
        ));
    }

    #[test]
    fn attach_requires_a_path() {
        let mut app = App::new(AUTO_ROUTE);
        assert!(matches!(
            process_input(&mut app, "/attach"),
            CommandResult::Continue
        ));
        assert_eq!(app.messages.back().unwrap().sender, Sender::AppError);

        match process_input(&mut app, "/attach pics/cat.png") {
            CommandResult::Attach(path) => assert_eq!(path, PathBuf::from("pics/cat.png")),
            _ => panic!("expected attach"),
        }
    }

    #[test]
    fn detach_clears_the_pending_attachment() {
        use crate::core::session::PendingAttachment;
        let mut app = App::new(AUTO_ROUTE);
        app.session.set_attachment(PendingAttachment {
            data: "aGVsbG8=".into(),
            media_type: "image/png".into(),
            file_name: "a.png".into(),
        });
        process_input(&mut app, "/detach");
        assert!(app.session.attachment.is_none());
    }

    #[test]
    fn mode_selects_and_clears() {
        let mut app = App::new(AUTO_ROUTE);
        process_input(&mut app, "/mode think");
        assert_eq!(app.session.mode.as_deref(), Some("think"));

        process_input(&mut app, "/mode");
        assert!(app.session.mode.is_none());

        process_input(&mut app, "/mode daydream");
        assert!(app.session.mode.is_none());
        assert_eq!(app.messages.back().unwrap().sender, Sender::AppError);
    }

    #[test]
    fn provider_applies_locally_and_requests_a_server_push() {
        let mut app = App::new(AUTO_ROUTE);
        match process_input(&mut app, "/provider Claude") {
            CommandResult::SetProvider(provider) => assert_eq!(provider, "claude"),
            _ => panic!("expected provider push"),
        }
        assert_eq!(app.session.provider, "claude");

        // Bare /provider just reports.
        assert!(matches!(
            process_input(&mut app, "/provider"),
            CommandResult::Continue
        ));
        assert!(app
            .messages
            .back()
            .unwrap()
            .content
            .contains("Current provider: Claude"));
    }

    #[test]
    fn dump_exports_to_the_given_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut app = App::new(AUTO_ROUTE);
        app.append_message(Message::user("question"));

        process_input(&mut app, &format!("/dump {}", path.display()));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("You: question"));

        // A second dump to the same file is refused.
        process_input(&mut app, &format!("/dump {}", path.display()));
        assert_eq!(app.messages.back().unwrap().sender, Sender::AppError);
    }

    #[test]
    fn help_lists_every_command() {
        let mut app = App::new(AUTO_ROUTE);
        process_input(&mut app, "/help");
        let help = &app.messages.back().unwrap().content;
        for usage in USAGES {
            assert!(help.contains(usage.syntax), "missing {}", usage.syntax);
        }
    }
}
