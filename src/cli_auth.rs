use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

use songify_server::catalog_store::{CatalogStore, SqliteCatalogStore};
use songify_server::database;
use songify_server::user::{SqliteUserStore, UserManager, UserRole};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the Songify database file, created if missing.
    #[clap(value_parser = parse_path)]
    pub db_path: PathBuf,
}

#[derive(Parser)]
#[command(name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Creates a user with the given handle, holding the User role unless
    /// another one is given.
    AddUser {
        user_handle: String,
        #[clap(long, default_value = "User")]
        role: String,
    },

    /// Creates a password authentication for the given user.
    /// Fails if the user already has a password set.
    AddLogin {
        user_handle: String,
        password: String,
    },

    /// Change the password of a user, fails if no password was set.
    UpdateLogin {
        user_handle: String,
        password: String,
    },

    /// Deletes the password authentication for a given user.
    DeleteLogin { user_handle: String },

    /// Shows authentication information of a given user.
    Show { user_handle: String },

    /// Verifies the password of a given user without creating a token.
    CheckPassword {
        user_handle: String,
        password: String,
    },

    /// Shows all user handles.
    UserHandles,

    /// Shows all available roles and their permissions.
    ListRoles,

    /// Adds a role to a user.
    AddRole { user_handle: String, role: String },

    /// Removes a role from a user.
    RemoveRole { user_handle: String, role: String },

    /// Shows the path of the current db.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

fn parse_role(role: &str) -> Result<UserRole, CommandExecutionResult> {
    UserRole::from_str(role).ok_or_else(|| {
        let valid = UserRole::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        CommandExecutionResult::Error(format!(
            "Invalid role '{}'. Valid roles are: {}",
            role, valid
        ))
    })
}

fn find_user_id(
    user_manager: &UserManager,
    user_handle: &str,
) -> Result<String, CommandExecutionResult> {
    match user_manager.get_user_id(user_handle) {
        Ok(Some(user_id)) => Ok(user_id),
        Ok(None) => Err(CommandExecutionResult::Error(format!(
            "User '{}' not found",
            user_handle
        ))),
        Err(err) => Err(CommandExecutionResult::Error(format!("{}", err))),
    }
}

fn show_user(user_manager: &UserManager, user_handle: &str) -> CommandExecutionResult {
    let user_id = match find_user_id(user_manager, user_handle) {
        Ok(user_id) => user_id,
        Err(err) => return err,
    };

    println!("User id: {}", user_id);
    println!("\nUser Credentials:");
    println!("{:#?}", user_manager.get_user_credentials(user_handle));

    println!("\nAuth Tokens:");
    match user_manager.get_user_tokens(user_handle) {
        Ok(tokens) => {
            for token in tokens.iter() {
                println!("{:#?}", token);
            }
        }
        Err(err) => println!("Failed to get tokens: {}", err),
    }

    match user_manager.get_user_roles(&user_id) {
        Ok(roles) => {
            println!("\nRoles:");
            if roles.is_empty() {
                println!("  (no roles assigned)");
            }
            for role in roles.iter() {
                println!("  - {}", role);
            }
        }
        Err(err) => println!("\nFailed to get roles: {}", err),
    }

    match user_manager.get_user_permissions(&user_id) {
        Ok(permissions) => {
            println!("\nResolved Permissions:");
            if permissions.is_empty() {
                println!("  (no permissions)");
            }
            for permission in permissions.iter() {
                println!("  - {:?}", permission);
            }
        }
        Err(err) => println!("\nFailed to get permissions: {}", err),
    }
    CommandExecutionResult::Ok
}

fn check_password(
    user_manager: &UserManager,
    user_handle: &str,
    password: &str,
) -> CommandExecutionResult {
    let user_credentials = match user_manager.get_user_credentials(user_handle) {
        Ok(Some(x)) => x,
        Ok(None) => {
            return CommandExecutionResult::Error(format!("User {} not found.", user_handle))
        }
        Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
    };
    let password_credentials = match user_credentials.username_password {
        Some(x) => x,
        None => {
            return CommandExecutionResult::Error(format!(
                "User {} has no password set.",
                user_handle
            ))
        }
    };
    match password_credentials.verify(password) {
        Ok(true) => println!("The password provided is correct!"),
        Ok(false) => println!("Wrong password."),
        Err(err) => println!(
            "Could not verify the password, something went wrong: {}",
            err
        ),
    }
    CommandExecutionResult::Ok
}

fn execute_command(line: String, user_manager: &UserManager, db_path: &str) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    let cli = match cli {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            return CommandExecutionResult::Ok;
        }
    };

    println!("{} {}", PROMPT, &line);
    let outcome = match cli.command {
        InnerCommand::AddUser { user_handle, role } => {
            let role = match parse_role(&role) {
                Ok(role) => role,
                Err(err) => return err,
            };
            user_manager.add_user(&user_handle, role).map(|user_id| {
                println!("Created user '{}' ({}) as {}", user_handle, user_id, role)
            })
        }
        InnerCommand::AddLogin {
            user_handle,
            password,
        } => user_manager.create_password_credentials(&user_handle, password),
        InnerCommand::UpdateLogin {
            user_handle,
            password,
        } => user_manager.update_password_credentials(&user_handle, password),
        InnerCommand::DeleteLogin { user_handle } => {
            user_manager.delete_password_credentials(&user_handle)
        }
        InnerCommand::Show { user_handle } => return show_user(user_manager, &user_handle),
        InnerCommand::CheckPassword {
            user_handle,
            password,
        } => return check_password(user_manager, &user_handle, &password),
        InnerCommand::UserHandles => user_manager
            .get_all_user_handles()
            .map(|handles| println!("{:#?}", handles)),
        InnerCommand::ListRoles => {
            println!("Available Roles:\n");
            for role in UserRole::ALL.iter() {
                println!("Role: {}", role);
                println!("Permissions:");
                for permission in role.permissions() {
                    println!("  - {:?}", permission);
                }
                println!();
            }
            Ok(())
        }
        InnerCommand::AddRole { user_handle, role } => {
            let role_enum = match parse_role(&role) {
                Ok(role) => role,
                Err(err) => return err,
            };
            let user_id = match find_user_id(user_manager, &user_handle) {
                Ok(user_id) => user_id,
                Err(err) => return err,
            };
            user_manager
                .add_user_role(&user_id, role_enum)
                .map(|_| println!("Role '{}' added to user '{}'", role_enum, user_handle))
        }
        InnerCommand::RemoveRole { user_handle, role } => {
            let role_enum = match parse_role(&role) {
                Ok(role) => role,
                Err(err) => return err,
            };
            let user_id = match find_user_id(user_manager, &user_handle) {
                Ok(user_id) => user_id,
                Err(err) => return err,
            };
            user_manager
                .remove_user_role(&user_id, role_enum)
                .map(|_| println!("Role '{}' removed from user '{}'", role_enum, user_handle))
        }
        InnerCommand::Where => {
            println!("{}", db_path);
            Ok(())
        }
        InnerCommand::Exit => return CommandExecutionResult::Exit,
    };

    match outcome {
        Ok(()) => CommandExecutionResult::Ok,
        Err(err) => CommandExecutionResult::Error(format!("{}", err)),
    }
}

#[derive(rustyline_derive::Hinter)]
struct CommandsHelper {
    commands_names: Vec<String>,
}

impl CommandsHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        CommandsHelper { commands_names }
    }
}

impl Completer for CommandsHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for CommandsHelper {}
impl Validator for CommandsHelper {}
impl Helper for CommandsHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let db_path = cli_args.db_path.display().to_string();

    let conn = database::open(&cli_args.db_path)?;
    let catalog_store: Arc<dyn CatalogStore> = Arc::new(SqliteCatalogStore::new(conn.clone()));
    let user_store = Arc::new(SqliteUserStore::new(conn));
    let user_manager = UserManager::new(catalog_store, user_store);

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<CommandsHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(CommandsHelper::new()));
    let _ = rl.clear_screen();

    loop {
        let readline = rl.readline(PROMPT);

        let _ = rl.clear_screen();
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &user_manager, &db_path) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => {
                        eprintln!("Error: {}", err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}
