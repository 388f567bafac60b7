//! Typed input to edit commands.
//!
//! A line starting with `:` is a command; anything else is text typed into
//! the active buffer followed by a newline.

use aivi_application::EditCommand;
use aivi_core::buffer::Direction;
use aivi_infrastructure::revision::StepDirection;

/// What one line of input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Commands(Vec<EditCommand>),
    Help,
    Quit,
    Unknown(String),
}

/// Upper bound for a typed repeat count.
pub const MAX_REPEAT: usize = 10_000;

/// `(command, help)` pairs, also used for completion.
pub const COMMANDS: &[(&str, &str)] = &[
    (":ai", "send the buffers to the current viewpoint"),
    (":vp", "advance to the next viewpoint, or `:vp <name>` to pick one"),
    (":w", "save a new revision"),
    (":r", "reload the session file"),
    (":sw", "switch between edit and command buffer"),
    (":n", "next sub-revision"),
    (":p", "previous sub-revision"),
    (":t", "toggle reply / pre-exchange text"),
    (":dd", "delete the current line"),
    (":m", "mark the current line"),
    (":mj", "mark the current line and move down"),
    (":y", "yank marked lines"),
    (":pp", "paste above the current line"),
    (":/", "search for the command buffer text"),
    (":sn", "next search hit"),
    (":sp", "previous search hit"),
    (":up", "move up [count]"),
    (":down", "move down [count]"),
    (":left", "move left [count]"),
    (":right", "move right [count]"),
    (":bs", "backspace [count]"),
    (":nl", "split the line at the cursor"),
    (":help", "show this list"),
    (":q", "quit"),
];

pub fn parse_input(line: &str) -> Input {
    let Some(command) = line.strip_prefix(':') else {
        let mut commands: Vec<EditCommand> = line.chars().map(EditCommand::InsertChar).collect();
        commands.push(EditCommand::Newline);
        return Input::Commands(commands);
    };

    let command = command.trim();
    let (name, argument) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));
    let count = argument
        .split_whitespace()
        .next()
        .and_then(|word| word.parse::<usize>().ok())
        .unwrap_or(1)
        .min(MAX_REPEAT);
    let single = |command: EditCommand| Input::Commands(vec![command]);
    let repeated = |command: EditCommand| Input::Commands(vec![command; count]);

    match name {
        "ai" => single(EditCommand::TriggerExchange),
        "vp" if argument.is_empty() => single(EditCommand::AdvanceViewpoint),
        "vp" => single(EditCommand::SelectViewpoint(argument.to_string())),
        "w" => single(EditCommand::Save),
        "r" => single(EditCommand::Load),
        "sw" => single(EditCommand::SwitchBuffer),
        "n" => single(EditCommand::StepSubrevision(StepDirection::Forward)),
        "p" => single(EditCommand::StepSubrevision(StepDirection::Backward)),
        "t" => single(EditCommand::ToggleCompare),
        "dd" => repeated(EditCommand::DeleteLine),
        "m" => single(EditCommand::MarkLine),
        "mj" => repeated(EditCommand::MarkAndAdvance),
        "y" => single(EditCommand::YankMarked),
        "pp" => single(EditCommand::Paste),
        "/" => single(EditCommand::Search),
        "sn" => single(EditCommand::SearchNext),
        "sp" => single(EditCommand::SearchPrev),
        "up" => repeated(EditCommand::Move(Direction::Up)),
        "down" => repeated(EditCommand::Move(Direction::Down)),
        "left" => repeated(EditCommand::Move(Direction::Left)),
        "right" => repeated(EditCommand::Move(Direction::Right)),
        "bs" => repeated(EditCommand::DeleteChar),
        "nl" => single(EditCommand::Newline),
        "help" | "h" => Input::Help,
        "q" | "quit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}
