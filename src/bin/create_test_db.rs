use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use bankdesk::{
    AccountStatus, AccountType, AdminRole, NewAdmin, NewBankAccount, NewUser, PasswordHash,
    Transaction, TransactionType, ValidatedPassword, add_funds, create_admin, create_bank_account,
    create_transaction, create_user, initialize_db,
};

/// A utility for creating a seeded database for manual testing of the bankdesk API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const ADMIN_EMAIL: &str = "admin@bankdesk.test";
const ADMIN_PASSWORD: &str = "test";

struct SeedCustomer {
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    accounts: &'static [SeedAccount],
}

struct SeedAccount {
    number: &'static str,
    account_type: AccountType,
    status: AccountStatus,
    /// Amount in cents added through the ledger.
    opening_deposit: i64,
    /// `(amount, fee)` in cents of each pending withdrawal.
    pending: &'static [(i64, i64)],
}

const CUSTOMERS: &[SeedCustomer] = &[
    SeedCustomer {
        first_name: "Jane",
        last_name: "Doe",
        email: "jane.doe@example.com",
        accounts: &[
            SeedAccount {
                number: "100200300",
                account_type: AccountType::Checking,
                status: AccountStatus::Active,
                opening_deposit: 150_000,
                pending: &[(2_000, 100), (12_550, 0)],
            },
            SeedAccount {
                number: "100200301",
                account_type: AccountType::Savings,
                status: AccountStatus::Active,
                opening_deposit: 500_000,
                pending: &[],
            },
        ],
    },
    SeedCustomer {
        first_name: "John",
        last_name: "Smith",
        email: "john.smith@example.com",
        accounts: &[SeedAccount {
            number: "200300400",
            account_type: AccountType::Business,
            status: AccountStatus::PendingApproval,
            opening_deposit: 25_000,
            pending: &[(9_999, 250)],
        }],
    },
    SeedCustomer {
        first_name: "Mei",
        last_name: "Tanaka",
        email: "mei.tanaka@example.com",
        accounts: &[],
    },
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'bank.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating admin {ADMIN_EMAIL} with password \"{ADMIN_PASSWORD}\"...");

    create_admin(
        NewAdmin {
            email: ADMIN_EMAIL.to_owned(),
            password_hash: PasswordHash::new(
                ValidatedPassword::new_unchecked(ADMIN_PASSWORD),
                PasswordHash::DEFAULT_COST,
            )?,
            first_name: "Test".to_owned(),
            last_name: "Admin".to_owned(),
            role: AdminRole::SuperAdmin,
        },
        &connection,
    )?;

    let now = OffsetDateTime::now_utc();

    for seed in CUSTOMERS {
        println!("Creating customer {}...", seed.email);

        let customer = create_user(
            NewUser {
                first_name: seed.first_name.to_owned(),
                last_name: seed.last_name.to_owned(),
                email: seed.email.to_owned(),
                phone_number: None,
                is_verified: true,
            },
            &connection,
        )?;

        for seed_account in seed.accounts {
            let account = create_bank_account(
                NewBankAccount {
                    user_id: customer.id,
                    account_name: format!("{} {}", seed.first_name, seed_account.account_type),
                    account_number: seed_account.number.to_owned(),
                    account_type: seed_account.account_type,
                    status: seed_account.status,
                    currency: "USD".to_owned(),
                },
                &connection,
            )?;

            add_funds(
                customer.id,
                Some(account.id),
                Decimal::new(seed_account.opening_deposit, 2),
                now,
                &mut connection,
            )?;

            for &(amount, fee) in seed_account.pending {
                create_transaction(
                    Transaction::build(TransactionType::Withdrawal, Decimal::new(amount, 2))
                        .fee(Decimal::new(fee, 2))
                        .account(customer.id, account.id)
                        .currency(&account.currency)
                        .description("Card payment")
                        .recipient("Corner Store", "900800700", "Example Bank")
                        .category("Shopping"),
                    now,
                    &connection,
                )?;
            }
        }
    }

    println!("Success!");

    Ok(())
}
