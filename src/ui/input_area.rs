use crate::app::{App, AppMsg};
use crate::models::{CoachPreset, Role};
use crate::services::export::ExportFormat;
use crate::services::settings::{ColorScheme, DisplayMode};

/// A parsed input line. List positions are zero-based here and one-based
/// on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Help,
    Quit,
    Welcome,
    Start,
    Show,
    SetKey(String),
    ClearKey,
    Models,
    Model(String),
    Genres,
    Genre(String),
    Theme(ColorScheme),
    Mode(DisplayMode),
    Favourites,
    AddFavourite(String),
    RemoveFavourite(usize),
    UseFavourite(usize),
    StarMessage(usize),
    Sessions,
    Open(usize),
    Rename(usize, String),
    Delete(usize),
    Move(usize, Option<usize>),
    NewFolder(String),
    RenameFolder(usize, String),
    ToggleFolder(usize),
    DeleteFolder(usize),
    Clear,
    Export(ExportFormat),
    Presets,
    SavePreset(CoachPreset),
    RemovePreset(String),
}

/// What the front end does with a resolved command.
#[derive(Debug)]
pub enum Action {
    Dispatch(AppMsg),
    Help,
    Welcome,
    Show,
    Models,
    Genres,
    Favourites,
    Sessions,
    Presets,
    Nothing,
    Quit,
}

pub const HELP: &str = "\
Type a message and press Enter to chat. An empty line sends the current draft.

  /key <api-key> | /key clear     set or forget the OpenRouter key
  /models, /model <id>            list or pick a model (or coach preset)
  /genres, /genre <id>            list or pick a genre
  /favs, /fav <prompt>            list or add favourite prompts
  /unfav <n>, /use <n>            remove a favourite, or load it as the draft
  /star <n>                       favourite the n-th message of this chat
  /sessions, /open <n>            list archived sessions, or restore one
  /rename <n> <name>, /delete <n> rename or delete a session
  /move <n> <folder-n|none>       file a session into a folder
  /folder <name>                  create a folder
  /rename-folder <n> <name>       rename a folder
  /toggle <n>, /delete-folder <n> collapse/expand or delete a folder
  /clear                          archive this chat and start a new one
  /export txt|json                archive and write conversation.txt/.json
  /show                           print the current conversation
  /theme system|light|dark        display theme
  /mode writer|admin              display mode
  /presets                        list coach presets
  /preset <id> | <name> | <genres,...|*> | <system prompt>   (admin mode)
  /unpreset <id>                  remove a coach preset (admin mode)
  /welcome, /start                show the welcome screen, or dismiss it
  /quit                           leave";

/// Every command name `parse` accepts, in the order `HELP` lists them.
pub const COMMANDS: &[&str] = &[
    "/key",
    "/models",
    "/model",
    "/genres",
    "/genre",
    "/favs",
    "/fav",
    "/unfav",
    "/use",
    "/star",
    "/sessions",
    "/open",
    "/rename",
    "/delete",
    "/move",
    "/folder",
    "/rename-folder",
    "/toggle",
    "/delete-folder",
    "/clear",
    "/export",
    "/show",
    "/theme",
    "/mode",
    "/presets",
    "/preset",
    "/unpreset",
    "/welcome",
    "/start",
    "/quit",
    "/help",
];

fn split_command(line: &str) -> (&str, &str) {
    let body = &line[1..];
    match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    }
}

fn position(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("Expected a list number, got '{}'", arg)),
    }
}

fn position_and_text(args: &str) -> Result<(usize, String), String> {
    let (n, text) = args
        .split_once(char::is_whitespace)
        .ok_or_else(|| "Expected a list number and a name".to_string())?;
    let text = text.trim();
    if text.is_empty() {
        return Err("Name must not be empty".to_string());
    }
    Ok((position(n)?, text.to_string()))
}

fn required(args: &str, what: &str) -> Result<String, String> {
    if args.is_empty() {
        Err(format!("Missing {}", what))
    } else {
        Ok(args.to_string())
    }
}

fn parse_preset(args: &str) -> Result<CoachPreset, String> {
    let parts: Vec<&str> = args.splitn(4, '|').map(str::trim).collect();
    let &[id, name, genres, prompt] = parts.as_slice() else {
        return Err("Usage: /preset <id> | <name> | <genres,...|*> | <system prompt>".to_string());
    };
    if id.is_empty() || name.is_empty() || prompt.is_empty() {
        return Err("Preset id, name and system prompt are required".to_string());
    }
    let genres = if genres == "*" {
        Vec::new()
    } else {
        genres
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect()
    };
    Ok(CoachPreset {
        id: id.to_string(),
        name: name.to_string(),
        desc: None,
        system_prompt: prompt.to_string(),
        genres,
    })
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if !line.starts_with('/') {
        return Ok(Command::Say(line.to_string()));
    }

    let (name, args) = split_command(line);
    let command = match name {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "welcome" => Command::Welcome,
        "start" => Command::Start,
        "show" => Command::Show,
        "key" if args == "clear" => Command::ClearKey,
        "key" => Command::SetKey(required(args, "API key")?),
        "models" => Command::Models,
        "model" => Command::Model(required(args, "model id")?),
        "genres" => Command::Genres,
        "genre" => Command::Genre(required(args, "genre id")?),
        "theme" => Command::Theme(
            ColorScheme::from_str(args).ok_or_else(|| format!("Unknown theme '{}'", args))?,
        ),
        "mode" => Command::Mode(
            DisplayMode::from_str(args).ok_or_else(|| format!("Unknown mode '{}'", args))?,
        ),
        "favs" => Command::Favourites,
        "fav" => Command::AddFavourite(required(args, "prompt")?),
        "unfav" => Command::RemoveFavourite(position(args)?),
        "use" => Command::UseFavourite(position(args)?),
        "star" => Command::StarMessage(position(args)?),
        "sessions" => Command::Sessions,
        "open" => Command::Open(position(args)?),
        "rename" => {
            let (n, name) = position_and_text(args)?;
            Command::Rename(n, name)
        }
        "delete" => Command::Delete(position(args)?),
        "move" => {
            let (n, folder) = args
                .split_once(char::is_whitespace)
                .ok_or_else(|| "Usage: /move <n> <folder-n|none>".to_string())?;
            let folder = match folder.trim() {
                "none" => None,
                other => Some(position(other)?),
            };
            Command::Move(position(n)?, folder)
        }
        "folder" => Command::NewFolder(required(args, "folder name")?),
        "rename-folder" => {
            let (n, name) = position_and_text(args)?;
            Command::RenameFolder(n, name)
        }
        "toggle" => Command::ToggleFolder(position(args)?),
        "delete-folder" => Command::DeleteFolder(position(args)?),
        "clear" => Command::Clear,
        "export" => Command::Export(
            ExportFormat::from_str(args).ok_or_else(|| "Usage: /export txt|json".to_string())?,
        ),
        "presets" => Command::Presets,
        "preset" => Command::SavePreset(parse_preset(args)?),
        "unpreset" => Command::RemovePreset(required(args, "preset id")?),
        other => return Err(format!("Unknown command '/{}'. Try /help.", other)),
    };
    Ok(command)
}

impl Command {
    /// Turn list positions into ids against the current state.
    pub fn resolve(self, app: &App) -> Result<Action, String> {
        let session_id = |n: usize| {
            app.archive()
                .sessions()
                .get(n)
                .map(|s| s.id.clone())
                .ok_or_else(|| format!("No session #{}", n + 1))
        };
        let folder_id = |n: usize| {
            app.archive()
                .folders()
                .get(n)
                .map(|f| f.id.clone())
                .ok_or_else(|| format!("No folder #{}", n + 1))
        };
        let favourite = |n: usize| {
            app.favourites()
                .list()
                .get(n)
                .cloned()
                .ok_or_else(|| format!("No favourite #{}", n + 1))
        };

        let msg = match self {
            Command::Say(text) if text.trim().is_empty() => match app.engine().draft() {
                Some(draft) => AppMsg::SendMessage(draft.to_string()),
                None => return Ok(Action::Nothing),
            },
            Command::Say(text) => AppMsg::SendMessage(text),
            Command::Help => return Ok(Action::Help),
            Command::Quit => return Ok(Action::Quit),
            Command::Welcome => return Ok(Action::Welcome),
            Command::Show => return Ok(Action::Show),
            Command::Models => return Ok(Action::Models),
            Command::Genres => return Ok(Action::Genres),
            Command::Favourites => return Ok(Action::Favourites),
            Command::Sessions => return Ok(Action::Sessions),
            Command::Presets => return Ok(Action::Presets),
            Command::Start => AppMsg::Start,
            Command::SetKey(key) => AppMsg::SetApiKey(key),
            Command::ClearKey => AppMsg::ClearApiKey,
            Command::Model(id) => AppMsg::SelectModel(id),
            Command::Genre(id) => AppMsg::SelectGenre(id),
            Command::Theme(theme) => AppMsg::SetTheme(theme),
            Command::Mode(mode) => AppMsg::SetMode(mode),
            Command::AddFavourite(prompt) => AppMsg::AddFavourite(prompt),
            Command::RemoveFavourite(n) => AppMsg::RemoveFavourite(favourite(n)?),
            Command::UseFavourite(n) => AppMsg::SelectFavourite(favourite(n)?),
            Command::StarMessage(n) => {
                let message = app
                    .engine()
                    .messages()
                    .get(n)
                    .ok_or_else(|| format!("No message #{}", n + 1))?;
                if message.role != Role::User {
                    return Err("Only your own messages can be favourited".to_string());
                }
                AppMsg::AddFavourite(message.content.clone())
            }
            Command::Open(n) => AppMsg::RestoreSession(session_id(n)?),
            Command::Rename(n, name) => AppMsg::RenameSession(session_id(n)?, name),
            Command::Delete(n) => AppMsg::DeleteSession(session_id(n)?),
            Command::Move(n, folder) => {
                let folder = folder.map(folder_id).transpose()?;
                AppMsg::MoveSession(session_id(n)?, folder)
            }
            Command::NewFolder(name) => AppMsg::CreateFolder(name),
            Command::RenameFolder(n, name) => AppMsg::RenameFolder(folder_id(n)?, name),
            Command::ToggleFolder(n) => AppMsg::ToggleFolder(folder_id(n)?),
            Command::DeleteFolder(n) => AppMsg::DeleteFolder(folder_id(n)?),
            Command::Clear => AppMsg::ClearConversation,
            Command::Export(format) => AppMsg::Export(format),
            Command::SavePreset(preset) => AppMsg::SavePreset(preset),
            Command::RemovePreset(id) => AppMsg::RemovePreset(id),
        };
        Ok(Action::Dispatch(msg))
    }
}
