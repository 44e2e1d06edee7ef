use std::{
    error::Error,
    io::{self, Write},
    path::Path,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use bankdesk::{
    AdminRole, NewAdmin, PasswordHash, ValidatedPassword, create_admin, initialize_db,
};

/// A utility for adding a back-office admin to the database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: String,

    /// The email the admin logs in with.
    #[arg(long)]
    email: String,

    /// The admin's given name.
    #[arg(long)]
    first_name: String,

    /// The admin's family name.
    #[arg(long)]
    last_name: String,

    /// Either ADMIN or SUPER_ADMIN.
    #[arg(long, default_value_t = AdminRole::Admin)]
    role: AdminRole,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    println!("Creating admin {}", args.email);

    let user_inputs = [
        args.email.as_str(),
        args.first_name.as_str(),
        args.last_name.as_str(),
    ];
    let Some(password_hash) = get_new_password_hash(&user_inputs) else {
        return Ok(());
    };

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    let admin = create_admin(
        NewAdmin {
            email: args.email,
            password_hash,
            first_name: args.first_name,
            last_name: args.last_name,
            role: args.role,
        },
        &connection,
    )?;

    println!("Created admin {} with ID {}", admin.email, admin.id);

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            print_error("Database path must include a file extension (e.g., 'bank.db').");
            exit(1);
        }
    }
}

fn get_new_password_hash(user_inputs: &[&str]) -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = read_password("Enter a password: ")?;

        let validated_password = match ValidatedPassword::new(&first_password, user_inputs) {
            Ok(password) => password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        let second_password = read_password("Enter the same password again: ")?;

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
            }
        }
    }
}

/// Returns `None` when stdin is closed or cannot be read.
fn read_password(prompt: &str) -> Option<String> {
    let _ = io::stdout().flush();

    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
