//! Command-line parsing.
//!
//! Verbs are looked up in a static table and turned into a typed [`Command`].
//! Unknown verbs and wrong argument counts are reported as errors before
//! anything is executed.

use crate::error::{SimError, SimResult};

/// Operation tag for each accepted verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Help,
    CreateUser,
    Login,
    Logout,
    Users,
    WhoAmI,
    Pwd,
    Ls,
    Cd,
    Mkdir,
    Touch,
    Write,
    Append,
    Read,
    Stat,
    Rm,
    Mv,
    Cp,
    Clear,
    Exit,
}

/// Verb table. Aliases map to the same tag.
const VERBS: &[(&str, Verb)] = &[
    ("help", Verb::Help),
    ("createuser", Verb::CreateUser),
    ("login", Verb::Login),
    ("logout", Verb::Logout),
    ("users", Verb::Users),
    ("whoami", Verb::WhoAmI),
    ("pwd", Verb::Pwd),
    ("ls", Verb::Ls),
    ("cd", Verb::Cd),
    ("mkdir", Verb::Mkdir),
    ("touch", Verb::Touch),
    ("write", Verb::Write),
    ("append", Verb::Append),
    ("read", Verb::Read),
    ("cat", Verb::Read),
    ("stat", Verb::Stat),
    ("rm", Verb::Rm),
    ("mv", Verb::Mv),
    ("cp", Verb::Cp),
    ("clear", Verb::Clear),
    ("exit", Verb::Exit),
    ("quit", Verb::Exit),
];

impl Verb {
    /// Look up a verb, ignoring case.
    pub fn lookup(word: &str) -> Option<Verb> {
        let word = word.to_ascii_lowercase();
        VERBS
            .iter()
            .find(|(name, _)| *name == word)
            .map(|(_, verb)| *verb)
    }

    pub fn usage(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::CreateUser => "createuser <username> <lastname>",
            Self::Login => "login <username>",
            Self::Logout => "logout",
            Self::Users => "users",
            Self::WhoAmI => "whoami",
            Self::Pwd => "pwd",
            Self::Ls => "ls [path]",
            Self::Cd => "cd <directory>",
            Self::Mkdir => "mkdir <dirname>",
            Self::Touch => "touch <filename>",
            Self::Write => "write <filename> <content>",
            Self::Append => "append <filename> <content>",
            Self::Read => "read <filename>",
            Self::Stat => "stat <path>",
            Self::Rm => "rm <name>",
            Self::Mv => "mv <source> <destination>",
            Self::Cp => "cp <source> <destination>",
            Self::Clear => "clear",
            Self::Exit => "exit",
        }
    }
}

/// A parsed command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    CreateUser { username: String, lastname: String },
    Login { username: String },
    Logout,
    Users,
    WhoAmI,
    Pwd,
    Ls { path: Option<String> },
    Cd { path: String },
    Mkdir { path: String },
    Touch { path: String },
    Write { path: String, content: String },
    Append { path: String, content: String },
    Read { path: String },
    Stat { path: String },
    Rm { path: String },
    Mv { source: String, destination: String },
    Cp { source: String, destination: String },
    Clear,
    Exit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> SimResult<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = split_word(line);
        let verb = Verb::lookup(word).ok_or_else(|| SimError::UnknownCommand(word.to_string()))?;

        let command = match verb {
            Verb::Write | Verb::Append => {
                let (path, content) = split_word(rest);
                if path.is_empty() || content.is_empty() {
                    return Err(SimError::Usage(verb.usage()));
                }
                let (path, content) = (path.to_string(), content.to_string());
                if verb == Verb::Write {
                    Command::Write { path, content }
                } else {
                    Command::Append { path, content }
                }
            }
            _ => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                Self::from_args(verb, &args)?
            }
        };
        Ok(Some(command))
    }

    fn from_args(verb: Verb, args: &[&str]) -> SimResult<Command> {
        let owned = |i: usize| args[i].to_string();
        let command = match (verb, args.len()) {
            (Verb::Help, 0) => Command::Help,
            (Verb::CreateUser, 2) => Command::CreateUser {
                username: owned(0),
                lastname: owned(1),
            },
            (Verb::Login, 1) => Command::Login { username: owned(0) },
            (Verb::Logout, 0) => Command::Logout,
            (Verb::Users, 0) => Command::Users,
            (Verb::WhoAmI, 0) => Command::WhoAmI,
            (Verb::Pwd, 0) => Command::Pwd,
            (Verb::Ls, 0) => Command::Ls { path: None },
            (Verb::Ls, 1) => Command::Ls {
                path: Some(owned(0)),
            },
            (Verb::Cd, 1) => Command::Cd { path: owned(0) },
            (Verb::Mkdir, 1) => Command::Mkdir { path: owned(0) },
            (Verb::Touch, 1) => Command::Touch { path: owned(0) },
            (Verb::Read, 1) => Command::Read { path: owned(0) },
            (Verb::Stat, 1) => Command::Stat { path: owned(0) },
            (Verb::Rm, 1) => Command::Rm { path: owned(0) },
            (Verb::Mv, 2) => Command::Mv {
                source: owned(0),
                destination: owned(1),
            },
            (Verb::Cp, 2) => Command::Cp {
                source: owned(0),
                destination: owned(1),
            },
            (Verb::Clear, 0) => Command::Clear,
            (Verb::Exit, 0) => Command::Exit,
            _ => return Err(SimError::Usage(verb.usage())),
        };
        Ok(command)
    }
}

/// Split off the first whitespace-delimited word; the remainder keeps its
/// inner spacing.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim_start()),
        None => (s, ""),
    }
}
