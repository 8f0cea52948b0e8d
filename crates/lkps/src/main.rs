use anyhow::Result;
use dotenvy::dotenv;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use lkcore::core::{config, init_logger};
use lkcore::profile::{self, EstablishmentPicker, ProfileEdit};
use lkcore::requests::{read_rows, FilterField, SortColumn, TableEngine};
use lkcore::storage::{FileStore, ProfileCache};
use lkcore::telegram::webapp_auth::parse_init_data;
use lkcore::telegram::{
    unwrap_response, AuthConfig, AuthOrchestrator, AuthService, ContactFlow, ContactResponse, HostBridge, ProfileView,
    QrFlow, TelegramUser, ViewBinding, WebhookClient,
};

mod cli;
mod terminal;

use cli::{CacheAction, Cli, Commands, UserArgs};
use terminal::{StdinCamera, TerminalHost, TerminalView};

/// Entry point of the terminal front-end
///
/// # Errors
/// Returns an error if initialization fails (logging, storage) or a
/// command gets unusable input.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH, cli.verbose)?;

    match cli.command {
        Commands::Auth { user, no_pacing } => run_auth(&user, no_pacing).await,
        Commands::Qr { user, code } => run_qr(&user, code).await,
        Commands::Contact {
            user,
            raw,
            granted,
            declined,
        } => {
            let response = match (raw, granted, declined) {
                (Some(raw), _, _) => ContactResponse::Raw(raw),
                (None, true, _) => ContactResponse::Granted,
                (None, false, true) => ContactResponse::Declined,
                (None, false, false) => anyhow::bail!("one of --raw, --granted or --declined is required"),
            };
            run_contact(&user, response).await
        }
        Commands::Table {
            file,
            date_created,
            date_completed,
            establishment,
            sort,
            desc,
        } => {
            let filters = [
                (FilterField::DateCreated, date_created),
                (FilterField::DateCompleted, date_completed),
                (FilterField::Establishment, establishment),
            ];
            run_table(&file, &filters, sort, desc)
        }
        Commands::Phone { value } => {
            println!("{}", lkcore::format_phone_number(value.as_deref()));
            Ok(())
        }
        Commands::Unwrap { input } => run_unwrap(input),
        Commands::Cache { action } => run_cache(action),
        Commands::Profile {
            first_name,
            last_name,
            establishment,
        } => match establishment {
            Some(name) => run_pick_establishment(&name),
            None => run_profile(first_name, last_name),
        },
    }
}

fn open_cache() -> Result<ProfileCache> {
    let dir = config::expand_home(&config::STORAGE_DIR);
    let store = FileStore::open(&dir)?;
    log::debug!("Profile storage: {}", dir);
    Ok(ProfileCache::new(Arc::new(store)))
}

fn webhook() -> Option<Arc<dyn AuthService>> {
    match WebhookClient::from_env() {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            log::error!("❌ Webhook client unavailable: {}", e);
            None
        }
    }
}

fn resolve_user(args: &UserArgs) -> Result<Option<TelegramUser>> {
    if let Some(init_data) = args.init_data.as_deref() {
        return Ok(parse_init_data(init_data)?.user);
    }

    let user = TelegramUser {
        id: args.user_id,
        username: args.username.clone(),
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        phone_number: args.phone.clone(),
        photo_url: None,
    };
    Ok((user != TelegramUser::default()).then_some(user))
}

fn terminal_binding() -> ViewBinding {
    let view = Arc::new(TerminalView);
    ViewBinding::new(view.clone(), view.clone(), view.clone(), view)
}

async fn run_auth(args: &UserArgs, no_pacing: bool) -> Result<()> {
    let user = resolve_user(args)?;
    let host = TerminalHost::new(user.clone());
    let view = terminal_binding();

    view.show_telegram_user(user.as_ref());

    let config = if no_pacing {
        AuthConfig::immediate()
    } else {
        AuthConfig::default()
    };
    let orchestrator = AuthOrchestrator::new(webhook(), open_cache()?, view, config);

    let outcome = orchestrator
        .authorize(&user.unwrap_or_default(), || host.ready())
        .await;

    log::info!("Authorization finished: {:?}", outcome);
    Ok(())
}

async fn run_qr(args: &UserArgs, code: Option<String>) -> Result<()> {
    let host = Arc::new(TerminalHost::new(resolve_user(args)?).with_qr_code(code));
    let flow = QrFlow::new(host, Arc::new(StdinCamera), webhook(), terminal_binding());

    let outcome = flow
        .scan(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("❌ Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    log::info!("QR scan finished: {:?}", outcome);
    Ok(())
}

async fn run_contact(args: &UserArgs, response: ContactResponse) -> Result<()> {
    let host: Arc<dyn HostBridge> = Arc::new(TerminalHost::new(resolve_user(args)?).with_contact(response));
    let flow = ContactFlow::new(host, open_cache()?, terminal_binding());

    let outcome = flow.request().await;
    log::info!("Contact request finished: {:?}", outcome);
    Ok(())
}

fn run_table(
    file: &Path,
    filters: &[(FilterField, String)],
    sort: Option<SortColumn>,
    desc: bool,
) -> Result<()> {
    let html = fs_err::read_to_string(file)?;
    let mut engine = TableEngine::new(read_rows(&html)?, Arc::new(TerminalView));

    for (field, value) in filters.iter().filter(|(_, value)| !value.is_empty()) {
        engine.set_filter(*field, value);
    }
    if let Some(column) = sort {
        engine.click_header(column);
        if desc {
            engine.click_header(column);
        }
    }

    terminal::print_rows(&engine.apply());
    Ok(())
}

fn run_unwrap(input: Option<String>) -> Result<()> {
    let input = match input {
        Some(input) => input,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let raw = serde_json::from_str(input.trim()).unwrap_or(serde_json::Value::String(input));
    println!("{}", serde_json::to_string_pretty(&unwrap_response(raw))?);
    Ok(())
}

fn run_cache(action: CacheAction) -> Result<()> {
    let cache = open_cache()?;
    match action {
        CacheAction::Show => match cache.load() {
            Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            None => println!("Кэш профиля пуст или устарел"),
        },
        CacheAction::Clear => {
            cache.clear();
            println!("Кэш профиля очищен");
        }
    }
    Ok(())
}

fn run_pick_establishment(name: &str) -> Result<()> {
    let snapshot = open_cache()?.load().unwrap_or_default();
    let mut picker = EstablishmentPicker::new(&snapshot.restaurants);

    picker.open();
    match picker.select(name) {
        Some(selected) => println!("🏠 Выбрано заведение: {}", selected),
        None => {
            picker.cancel();
            anyhow::bail!("establishment {:?} not found, available: {}", name, picker.items().join(", "))
        }
    }
    Ok(())
}

fn run_profile(first_name: Option<String>, last_name: Option<String>) -> Result<()> {
    let cache = open_cache()?;
    let mut snapshot = cache.load().unwrap_or_default();

    if first_name.is_none() && last_name.is_none() {
        println!(
            "{}, {}!",
            profile::greeting_now(),
            profile::greeting_name(&snapshot.full_name)
        );
        return Ok(());
    }

    let current = ProfileEdit::from_full_name(&snapshot.full_name);
    let edit = ProfileEdit {
        first_name: first_name.unwrap_or(current.first_name),
        last_name: last_name.unwrap_or(current.last_name),
    };

    snapshot.full_name = edit.full_name();
    cache.save(&snapshot);

    let view = TerminalView;
    view.set_full_name(&snapshot.full_name);
    view.set_greeting_name(edit.greeting_name());
    Ok(())
}
