use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use stackctl::controller::{ListPhase, StackListController};
use stackctl::model::{RemoteConfig, Stack};
use stackctl::remote::StackClient;
use stackctl::repository::StackRepository;
use stackctl::ui::{AssumeYes, ConfirmDialog, ConsoleConfirm, ConsoleNotifier};

#[derive(Parser)]
#[command(name = "stackctl")]
#[command(about = "Stack template administration", long_about = None)]
struct Cli {
    /// Base URL of the stacks API
    #[arg(long, env = "STACKCTL_URL")]
    url: String,

    /// Bearer token for the stacks API
    #[arg(long, env = "STACKCTL_TOKEN")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stacks
    List {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single stack
    Show {
        stack_id: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a stack from the default template
    Create {
        /// Name for the new stack (defaults to a generated unique name)
        #[arg(long)]
        name: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Duplicate an existing stack under a fresh name
    Duplicate { stack_id: String },

    /// Replace a stack with a JSON payload
    Update {
        stack_id: String,
        /// Path to the stack payload
        #[arg(long)]
        file: PathBuf,
    },

    /// Delete one or more stacks (several ids form one confirmed batch)
    Delete {
        #[arg(required = true)]
        stack_ids: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Delete every stack owned by the current user
    DeleteMine {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show the acting user identity
    Whoami {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let client = StackClient::new(RemoteConfig {
        base_url: cli.url.trim_end_matches('/').to_string(),
        token: cli.token,
    })?;

    // Ownership filtering needs the acting user resolved before the first
    // load; nothing past this point can work without a valid identity.
    let who = client.whoami().await.context("resolve current user")?;

    match cli.command {
        Commands::Whoami { json } => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&who).context("serialize whoami")?
                );
            } else {
                println!("user: {}", who.user);
                println!("user_id: {}", who.user_id);
                println!("admin: {}", who.admin);
            }
        }

        Commands::Show { stack_id, json } => {
            let repo = StackRepository::new(client);
            let stack = repo.fetch_stack(&stack_id).await?;
            print_stack(&stack, json)?;
        }

        Commands::Update { stack_id, file } => {
            let repo = StackRepository::new(client);
            let payload = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let stack: Stack = serde_json::from_str(&payload).context("parse stack payload")?;
            let updated = repo.update_stack(&stack_id, &stack).await?;
            println!("Updated {}", updated.name);
        }

        Commands::List { json } => {
            let repo = StackRepository::new(client);
            let mut ctrl = controller(repo, &who.user_id, false);
            load_or_bail(&mut ctrl).await?;
            let view = ctrl.view();
            if json {
                let stacks: Vec<&Stack> = view.rows.iter().map(|r| &r.stack).collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&stacks).context("serialize stacks")?
                );
            } else {
                for row in &view.rows {
                    let marker = if row.own { "*" } else { " " };
                    let id = row.stack.id.as_deref().unwrap_or("-");
                    let creator = row.stack.creator.as_deref().unwrap_or("-");
                    println!("{} {} {} ({})", marker, id, row.stack.name, creator);
                }
                if view.rows.is_empty() {
                    println!("(no stacks)");
                }
            }
        }

        Commands::Create { name, json } => {
            let mut ctrl = controller(StackRepository::new(client), &who.user_id, false);
            load_or_bail(&mut ctrl).await?;

            let mut template = ctrl.repository().stack_template()?;
            if let Some(name) = name {
                template.name = name;
            }
            let created = ctrl
                .repository()
                .create_stack(&template)
                .await
                .context("create stack")?;
            ctrl.load_stacks().await;

            if json {
                print_stack(&created, true)?;
            } else {
                println!(
                    "Created {} ({})",
                    created.name,
                    created.id.as_deref().unwrap_or("-")
                );
            }
        }

        Commands::Duplicate { stack_id } => {
            let mut ctrl = controller(StackRepository::new(client), &who.user_id, false);
            load_or_bail(&mut ctrl).await?;

            let Some(stack) = ctrl.repository().get_by_id(&stack_id).cloned() else {
                anyhow::bail!("stack {} not found in the current listing", stack_id);
            };
            ctrl.duplicate_stack(&stack).await;
        }

        Commands::Delete { stack_ids, yes } => {
            let mut ctrl = controller(StackRepository::new(client), &who.user_id, yes);
            load_or_bail(&mut ctrl).await?;

            let missing: Vec<&str> = stack_ids
                .iter()
                .filter(|id| ctrl.repository().get_by_id(id.as_str()).is_none())
                .map(|id| id.as_str())
                .collect();
            if !missing.is_empty() {
                anyhow::bail!(
                    "stacks not found in the current listing: {}",
                    missing.join(", ")
                );
            }

            if let [stack_id] = stack_ids.as_slice() {
                let Some(stack) = ctrl.repository().get_by_id(stack_id).cloned() else {
                    anyhow::bail!("stack {} not found in the current listing", stack_id);
                };
                ctrl.delete_stack(&stack).await;
            } else {
                for id in &stack_ids {
                    ctrl.set_selected(id, true);
                }
                ctrl.delete_selected().await;
            }
        }

        Commands::DeleteMine { yes } => {
            let mut ctrl = controller(StackRepository::new(client), &who.user_id, yes);
            load_or_bail(&mut ctrl).await?;
            ctrl.select_all();
            ctrl.delete_selected().await;
        }
    }

    Ok(())
}

fn controller(
    repo: StackRepository,
    user_id: &str,
    assume_yes: bool,
) -> StackListController<ConsoleNotifier, Box<dyn ConfirmDialog>> {
    let dialog: Box<dyn ConfirmDialog> = if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(ConsoleConfirm)
    };
    StackListController::new(repo, Some(user_id.to_string()), ConsoleNotifier, dialog)
}

async fn load_or_bail(
    ctrl: &mut StackListController<ConsoleNotifier, Box<dyn ConfirmDialog>>,
) -> Result<()> {
    ctrl.load_stacks().await;
    if ctrl.phase() == ListPhase::Error {
        anyhow::bail!(
            "load stacks: {}",
            ctrl.error().unwrap_or("unknown failure")
        );
    }
    Ok(())
}

fn print_stack(stack: &Stack, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(stack).context("serialize stack")?
        );
        return Ok(());
    }
    println!("id: {}", stack.id.as_deref().unwrap_or("-"));
    println!("name: {}", stack.name);
    if !stack.description.is_empty() {
        println!("description: {}", stack.description);
    }
    println!("scope: {}", stack.scope);
    if !stack.tags.is_empty() {
        println!("tags: {}", stack.tags.join(", "));
    }
    if let Some(creator) = &stack.creator {
        println!("creator: {}", creator);
    }
    Ok(())
}
