//! Interactive shell: runs parsed commands against the simulator and renders
//! the replies on a [`Console`].

use serde::Serialize;

use crate::command::Command;
use crate::console::Console;
use crate::engine::{EntryInfo, FileSystem, WriteOutcome};
use crate::error::{SimError, SimResult};
use crate::fs::NodeKind;
use crate::session::Session;
use crate::users::{User, UserRegistry};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BANNER: &[&str] = &[
    "============================================================",
    "  SIMFS - Multi-User File System Simulator",
    "============================================================",
    "Type 'help' for available commands",
    "Type 'createuser <username> <lastname>' to create a user",
    "Type 'login <username>' to login",
    "------------------------------------------------------------",
];

const HELP_TEXT: &str = "\
Available Commands:
==================

USER MANAGEMENT:
  createuser <username> <lastname>  - Create a new user account
  login <username>                  - Login as a user
  logout                            - Logout current user
  users                             - List all registered users
  whoami                            - Show current user information

FILE SYSTEM NAVIGATION:
  pwd                               - Print working directory
  ls [path]                         - List directory contents
  cd <directory>                    - Change directory
  cd ..                             - Go to parent directory
  cd /                              - Go to root directory
  stat <path>                       - Show file or directory details

FILE & DIRECTORY OPERATIONS:
  mkdir <dirname>                   - Create a new directory
  touch <filename>                  - Create an empty file
  write <filename> <content>        - Write content to a file (creates it if missing)
  append <filename> <content>       - Append content to a file
  read <filename>                   - Read file content
  cat <filename>                    - Read file content (alias for read)
  rm <name>                         - Delete a file or empty directory
  mv <source> <destination>         - Move file/directory to another directory
  cp <source> <destination>         - Copy a file

SYSTEM:
  clear                             - Clear the screen
  exit / quit                       - Exit the terminal

Note: creating, changing, deleting and reading files requires a logged-in user.";

/// How replies are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per reply.
    Json,
}

/// Shell settings.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Host name shown in the prompt.
    pub host: String,
    pub format: OutputFormat,
    /// Print the welcome banner on start.
    pub banner: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            host: "filesystem".to_string(),
            format: OutputFormat::Text,
            banner: true,
        }
    }
}

/// Registered user with a marker for the session's active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStatus {
    pub username: String,
    pub lastname: String,
    pub active: bool,
}

/// Typed result of one command, before rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reply", rename_all = "camelCase")]
pub enum Reply {
    Message { text: String },
    Help { text: &'static str },
    Path { path: String },
    /// Working directory changed; silent in text mode.
    Directory { path: String },
    Listing { path: String, entries: Vec<EntryInfo> },
    Content { name: String, content: String },
    Entry { path: String, entry: EntryInfo },
    Users { users: Vec<UserStatus> },
    WhoAmI { user: Option<User>, cwd: String },
    Clear,
    Exit { text: String },
}

impl Reply {
    fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }
}

/// Command loop state: file system, users, the session and its console.
pub struct Shell<C: Console> {
    fs: FileSystem,
    users: UserRegistry,
    session: Session,
    console: C,
    config: ShellConfig,
    running: bool,
}

impl<C: Console> Shell<C> {
    pub fn new(console: C, config: ShellConfig) -> Self {
        let fs = FileSystem::new();
        let session = fs.new_session();
        Self {
            fs,
            users: UserRegistry::new(),
            session,
            console,
            config,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn file_system(&self) -> &FileSystem {
        &self.fs
    }

    pub fn users(&self) -> &UserRegistry {
        &self.users
    }

    /// Prompt for the next line, e.g. `Liddell@filesystem:/docs$ `.
    pub fn prompt(&self) -> String {
        let who = self
            .users
            .whoami(&self.session)
            .map(|u| u.lastname.as_str())
            .unwrap_or("guest");
        format!("{}@{}:{}$ ", who, self.config.host, self.fs.pwd(&self.session))
    }

    pub fn show_prompt(&mut self) {
        let prompt = self.prompt();
        self.console.write(&prompt);
    }

    pub fn print_banner(&mut self) {
        for line in BANNER {
            self.console.write_line(line);
        }
    }

    /// Parse, execute and render one input line. Errors are printed, never
    /// propagated. Returns whether the shell keeps running.
    pub fn execute_line(&mut self, line: &str) -> bool {
        let result = Command::parse(line).and_then(|command| match command {
            Some(command) => self.execute(command).and_then(|reply| self.render(&reply)),
            None => Ok(()),
        });
        if let Err(e) = result {
            tracing::debug!(code = e.code(), "command rejected: {}", e);
            self.render_error(&e);
        }
        self.running
    }

    /// Run one command against the simulator.
    pub fn execute(&mut self, command: Command) -> SimResult<Reply> {
        tracing::trace!(?command, "execute");
        let session = &mut self.session;
        let reply = match command {
            Command::Help => Reply::Help { text: HELP_TEXT },
            Command::CreateUser { username, lastname } => {
                self.users.create_user(&username, &lastname)?;
                Reply::message(format!("User '{}' created successfully", username))
            }
            Command::Login { username } => {
                let user = self.users.login(session, &username)?;
                Reply::message(format!("Welcome {}!", user.lastname))
            }
            Command::Logout => match self.users.logout(session) {
                Some(username) => Reply::message(format!("User '{}' logged out", username)),
                None => Reply::message("No user logged in"),
            },
            Command::Users => Reply::Users {
                users: self
                    .users
                    .list()
                    .iter()
                    .map(|u| UserStatus {
                        username: u.username.clone(),
                        lastname: u.lastname.clone(),
                        active: session.user() == Some(u.username.as_str()),
                    })
                    .collect(),
            },
            Command::WhoAmI => Reply::WhoAmI {
                user: self.users.whoami(session).cloned(),
                cwd: self.fs.pwd(session),
            },
            Command::Pwd => Reply::Path {
                path: self.fs.pwd(session),
            },
            Command::Ls { path } => {
                let entries = self.fs.ls(session, path.as_deref())?;
                Reply::Listing {
                    path: path.unwrap_or_else(|| self.fs.pwd(session)),
                    entries,
                }
            }
            Command::Cd { path } => Reply::Directory {
                path: self.fs.cd(session, &path)?,
            },
            Command::Mkdir { path } => {
                self.fs.mkdir(session, &path)?;
                Reply::message(format!("Directory '{}' created successfully", path))
            }
            Command::Touch { path } => {
                self.fs.touch(session, &path)?;
                Reply::message(format!("File '{}' created successfully", path))
            }
            Command::Write { path, content } => match self.fs.write(session, &path, &content)? {
                WriteOutcome::Created => {
                    Reply::message(format!("File '{}' created successfully", path))
                }
                WriteOutcome::Updated => {
                    Reply::message(format!("File '{}' updated successfully", path))
                }
            },
            Command::Append { path, content } => {
                self.fs.append(session, &path, &content)?;
                Reply::message(format!("Content appended to '{}'", path))
            }
            Command::Read { path } => Reply::Content {
                content: self.fs.read(session, &path)?,
                name: path,
            },
            Command::Stat { path } => Reply::Entry {
                entry: self.fs.stat(session, &path)?,
                path,
            },
            Command::Rm { path } => {
                self.fs.rm(session, &path)?;
                Reply::message(format!("'{}' deleted successfully", path))
            }
            Command::Mv {
                source,
                destination,
            } => {
                self.fs.mv(session, &source, &destination)?;
                Reply::message(format!("Moved '{}' to '{}'", source, destination))
            }
            Command::Cp {
                source,
                destination,
            } => {
                self.fs.cp(session, &source, &destination)?;
                Reply::message(format!(
                    "File copied from '{}' to '{}'",
                    source, destination
                ))
            }
            Command::Clear => Reply::Clear,
            Command::Exit => {
                self.running = false;
                Reply::Exit {
                    text: "Exiting SIMFS. Goodbye!".to_string(),
                }
            }
        };
        Ok(reply)
    }

    fn render(&mut self, reply: &Reply) -> SimResult<()> {
        if self.config.format == OutputFormat::Json {
            let json = serde_json::to_string(reply)?;
            self.console.write_line(&json);
            return Ok(());
        }

        let console = &mut self.console;
        match reply {
            Reply::Message { text } | Reply::Path { path: text } | Reply::Exit { text } => {
                console.write_line(text)
            }
            Reply::Help { text } => console.write_line(text),
            Reply::Directory { .. } => {}
            Reply::Listing { entries, .. } => render_listing(console, entries),
            Reply::Content { name, content } => {
                console.write_line(&format!("--- Contents of '{}' ---", name));
                console.write_line(content);
                console.write_line("--- End of file ---");
            }
            Reply::Entry { path, entry } => render_entry(console, path, entry),
            Reply::Users { users } => {
                if users.is_empty() {
                    console.write_line("No users registered");
                    return Ok(());
                }
                console.write_line("Registered Users:");
                for user in users {
                    let mark = if user.active { "✓" } else { " " };
                    console.write_line(&format!(
                        "  [{}] {} ({})",
                        mark, user.username, user.lastname
                    ));
                }
            }
            Reply::WhoAmI { user, cwd } => match user {
                Some(user) => {
                    console.write_line(&format!(
                        "Current user: {} (Last name: {})",
                        user.username, user.lastname
                    ));
                    console.write_line(&format!("Working directory: {}", cwd));
                }
                None => console.write_line("No user logged in"),
            },
            Reply::Clear => console.clear(),
        }
        Ok(())
    }

    fn render_error(&mut self, error: &SimError) {
        match self.config.format {
            OutputFormat::Json => self.console.write_line(&error.to_json().to_string()),
            OutputFormat::Text => self.console.write_line(&format!("Error: {}", error)),
        }
    }
}

fn render_listing<C: Console>(console: &mut C, entries: &[EntryInfo]) {
    if entries.is_empty() {
        console.write_line("(empty directory)");
        return;
    }

    console.write_line(&format!(
        "{:<12} {:<20} {:<10} {:<15} {}",
        "Type", "Name", "Size", "Owner", "Modified"
    ));
    console.write_line(&"-".repeat(80));
    for entry in entries {
        let size = match entry.size {
            Some(size) => size.to_string(),
            None => "<DIR>".to_string(),
        };
        console.write_line(&format!(
            "{:<12} {:<20} {:<10} {:<15} {}",
            entry.kind.as_str(),
            entry.name,
            size,
            entry.owner,
            entry.modified.format(TIME_FORMAT)
        ));
    }
}

fn render_entry<C: Console>(console: &mut C, path: &str, entry: &EntryInfo) {
    console.write_line(&format!("  Path:     {}", path));
    console.write_line(&format!("  Name:     {}", entry.name));
    console.write_line(&format!("  Type:     {}", entry.kind.as_str()));
    if entry.kind == NodeKind::File {
        console.write_line(&format!("  Size:     {}", entry.size.unwrap_or(0)));
    }
    console.write_line(&format!("  Owner:    {}", entry.owner));
    console.write_line(&format!("  Created:  {}", entry.created.format(TIME_FORMAT)));
    console.write_line(&format!("  Modified: {}", entry.modified.format(TIME_FORMAT)));
}
