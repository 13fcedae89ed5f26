use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "kakeibo_admin")]
#[command(about = "Admin utilities for the household ledger (bootstrap users/categories)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./kakeibo.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Category(Category),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Create the built-in default categories.
    Seed,
    List,
}

fn prompt_line(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    out.write_all(prompt.as_bytes())?;
    out.flush()?;

    let mut buf = String::new();
    std::io::stdin().read_line(&mut buf)?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let p1 = prompt_line("Password: ")?;
        if p1.is_empty() {
            eprintln!("Password must not be empty.");
            continue;
        }

        let p2 = prompt_line("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        eprintln!("Passwords do not match. Try again.");
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Category(Category {
            command: CategoryCommand::Seed,
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let created = engine.seed_default_categories().await?;
            println!("created {created} categories");
        }
        Command::Category(Category {
            command: CategoryCommand::List,
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            for category in engine.list_categories(true).await? {
                let marker = if category.archived { " (archived)" } else { "" };
                println!("{}  {}{marker}", category.id, category.name);
            }
        }
    }

    Ok(())
}
