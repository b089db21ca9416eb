use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use dialoguer::{Confirm, Password};
use dotenvy::dotenv;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use console::form::{
    capitalize, CategoryForm, ClientForm, CountryForm, DistrictForm, EntityForm, FormMode, FormScreen, MasterForm, RegionForm,
    ServiceForm,
};
use console::pagination::{NavButton, PageSlot};
use console::resources::Managed;
use console::toast::ToastKind;
use console::{Console, ModalBroadcaster, Navigation, Resource};
use models::catalog::{Category, Service};
use models::geo::{Country, District, Region};
use models::people::{Client, ClientInput, Master, MasterInput};
use models::{EntityId, LocalizedName};

#[derive(Parser)]
#[command(name = "console", version, about = "Marketplace admin console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the token for later commands.
    Login {
        #[arg(short, long, default_value = "admin")]
        username: String,
        #[arg(short, long, env = "CONSOLE_PASSWORD")]
        password: Option<String>,
    },
    Logout,
    /// Show whether a session is stored.
    Status,
    /// Resolve a console path the way the shell would.
    Open { path: String },
    List {
        resource: Resource,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        /// Parent filter as `key=value`, e.g. `countryId=...`.
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    Show { resource: Resource, id: String },
    Delete {
        resource: Resource,
        id: String,
        /// List page the record is on.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    Create {
        resource: Resource,
        #[command(flatten)]
        fields: FormArgs,
    },
    /// Change only the given fields of a record.
    Update {
        resource: Resource,
        id: String,
        #[command(flatten)]
        fields: FormArgs,
    },
    /// Upload a file and print its id.
    Upload { path: PathBuf },
    Stats {
        #[arg(default_value = "summary")]
        name: String,
    },
}

/// Form inputs; masters and clients are read from a JSON file.
#[derive(Args)]
struct FormArgs {
    #[arg(long)]
    uz: Option<String>,
    #[arg(long)]
    ru: Option<String>,
    #[arg(long)]
    en: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Category icon to upload.
    #[arg(long)]
    icon: Option<PathBuf>,
    /// JSON payload for masters and clients.
    #[arg(long)]
    file: Option<PathBuf>,
}

/// Call `$f::<Entity>(args..)` for the entity type behind a [`Resource`].
macro_rules! for_resource {
    ($resource:expr, $f:ident($($arg:expr),* $(,)?)) => {
        match $resource {
            Resource::Countries => $f::<Country>($($arg),*).await,
            Resource::Regions => $f::<Region>($($arg),*).await,
            Resource::Districts => $f::<District>($($arg),*).await,
            Resource::Categories => $f::<Category>($($arg),*).await,
            Resource::Services => $f::<Service>($($arg),*).await,
            Resource::Masters => $f::<Master>($($arg),*).await,
            Resource::Clients => $f::<Client>($($arg),*).await,
        }
    };
}

fn main() -> ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_cli();
    let cli = Cli::parse();

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };
    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = configs::AppConfig::load_and_validate()?;
    common::env::ensure_parent_dir(&cfg.session.storage_path).await?;
    let console = Console::from_config(&cfg).await?;
    debug!(base_url = %console.api().base_url(), "console configured");

    let result = dispatch(&console, cli.command).await;
    print_toasts(&console);
    result
}

async fn dispatch(console: &Console, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => Password::new().with_prompt("Password").interact()?,
            };
            console.session().login(&username, &password).await?;
            println!("Logged in as {username}. Continue at {}", console.shell().after_login());
        }
        Command::Logout => {
            console.session().logout().await?;
            println!("Logged out.");
        }
        Command::Status => match console.session().token() {
            Some(_) => println!("Authenticated against {}", console.api().base_url()),
            None => println!("Not logged in."),
        },
        Command::Open { path } => match console.shell().navigate(&path) {
            Navigation::Render(route) => println!("render {route}"),
            Navigation::Redirect { to, from: Some(from) } => println!("redirect to {to} (return to {from})"),
            Navigation::Redirect { to, from: None } => println!("redirect to {to}"),
        },
        Command::List { resource, page, limit, filters } => {
            let filters = parse_filters(&filters)?;
            for_resource!(resource, list(console, page, limit, &filters))?;
        }
        Command::Show { resource, id } => {
            let value = console.api().call(Method::GET, &format!("{}/{id}", resource.api_path()), None).await?;
            print_json(value.as_ref())?;
        }
        Command::Delete { resource, id, page, yes } => {
            for_resource!(resource, delete(console, EntityId::new(id), page, yes))?;
        }
        Command::Create { resource, fields } => save(console, resource, FormMode::Create, fields).await?,
        Command::Update { resource, id, fields } => {
            save(console, resource, FormMode::Edit(EntityId::new(id)), fields).await?
        }
        Command::Upload { path } => {
            let bytes = tokio::fs::read(&path).await.with_context(|| format!("cannot read {}", path.display()))?;
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("upload").to_string();
            let id = console.api().upload_file(bytes, &name).await?;
            println!("{id}");
        }
        Command::Stats { name } => {
            let value = console.api().statistics(&name).await?;
            print_json(Some(&value))?;
        }
    }
    Ok(())
}

async fn list<E: Managed>(console: &Console, page: u32, limit: Option<u32>, filters: &[(String, String)]) -> anyhow::Result<()> {
    let mut screen = console.list::<E>().starting_at(page);
    for (key, value) in filters {
        screen = screen.with_filter(key.as_str(), value.as_str());
    }
    match limit {
        Some(limit) => screen.set_limit(limit).await?,
        None => screen.mount().await?,
    }
    if limit.is_some() && page > 1 {
        screen.change_page(page).await?;
    }

    println!("{}", screen.resource().title());
    println!("{}", screen.render().to_text());
    let meta = screen.pagination();
    if let Some(control) = screen.pagination_control() {
        let slots: Vec<String> = control
            .window()
            .into_iter()
            .map(|slot| match slot {
                PageSlot::Page(p) if p == control.page() => format!("[{p}]"),
                PageSlot::Page(p) => p.to_string(),
                PageSlot::Ellipsis => "...".to_string(),
            })
            .collect();
        let enabled: Vec<String> = NavButton::ALL
            .into_iter()
            .filter(|b| !control.is_disabled(*b))
            .map(|b| format!("{b:?}->{}", control.target(b)))
            .collect();
        println!("pages: {}  ({})", slots.join(" "), enabled.join(", "));
    }
    println!("{} record(s), page {} of {}", meta.total_count, meta.page, meta.page_count);
    Ok(())
}

async fn delete<E: Managed>(console: &Console, id: EntityId, page: u32, yes: bool) -> anyhow::Result<()> {
    let mut screen = console.list::<E>().starting_at(page);
    screen.mount().await?;
    if !screen.request_delete(&id) {
        bail!("{} '{id}' is not on page {page}; pass --page", capitalize(E::KIND.label()));
    }
    if !answer_modal(console.modal(), yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    screen.process_pending().await?;
    Ok(())
}

fn screen<F: EntityForm>(console: &Console, mode: &FormMode) -> FormScreen<F> {
    match mode {
        FormMode::Create => console.create_form(),
        FormMode::Edit(id) => console.edit_form(id.clone()),
    }
}

fn apply_name(name: &mut LocalizedName, fields: &FormArgs) {
    for (slot, value) in [(&mut name.uz, &fields.uz), (&mut name.ru, &fields.ru), (&mut name.en, &fields.en)] {
        if let Some(v) = value {
            *slot = v.clone();
        }
    }
}

async fn save(console: &Console, resource: Resource, mode: FormMode, fields: FormArgs) -> anyhow::Result<()> {
    let api = console.api();
    let id = |v: &Option<String>| v.as_deref().map(EntityId::new);
    match resource {
        Resource::Countries => {
            let mut s = screen::<CountryForm>(console, &mode);
            s.mount().await?;
            apply_name(&mut s.form.name, &fields);
            submit(console, &s).await
        }
        Resource::Regions => {
            let mut s = screen::<RegionForm>(console, &mode);
            s.mount().await?;
            apply_name(&mut s.form.name, &fields);
            if let Some(country) = id(&fields.country) {
                s.form.country.select(Some(country));
            }
            submit(console, &s).await
        }
        Resource::Districts => {
            let mut s = screen::<DistrictForm>(console, &mode);
            s.mount().await?;
            apply_name(&mut s.form.name, &fields);
            if let Some(country) = id(&fields.country) {
                s.form.location.select_country(api, country).await?;
            }
            if let Some(region) = id(&fields.region) {
                s.form.location.regions.select(Some(region));
            }
            submit(console, &s).await
        }
        Resource::Categories => {
            let mut s = screen::<CategoryForm>(console, &mode);
            s.mount().await?;
            apply_name(&mut s.form.name, &fields);
            if let Some(path) = &fields.icon {
                s.form.icon.attach(api, path).await?;
            }
            submit(console, &s).await
        }
        Resource::Services => {
            let mut s = screen::<ServiceForm>(console, &mode);
            s.mount().await?;
            apply_name(&mut s.form.name, &fields);
            if let Some(category) = id(&fields.category) {
                s.form.category.select(Some(category));
            }
            submit(console, &s).await
        }
        Resource::Masters => {
            let input: MasterInput = read_payload(resource, &fields).await?;
            let mut s = screen::<MasterForm>(console, &mode);
            s.mount().await?;
            s.form = MasterForm::from_input(&input);
            s.form.prepare(api).await?;
            submit(console, &s).await
        }
        Resource::Clients => {
            let input: ClientInput = read_payload(resource, &fields).await?;
            let mut s = screen::<ClientForm>(console, &mode);
            s.mount().await?;
            s.form = ClientForm::from_input(&input);
            s.form.prepare(api).await?;
            submit(console, &s).await
        }
    }
}

async fn submit<F: EntityForm>(console: &Console, screen: &FormScreen<F>) -> anyhow::Result<()> {
    match screen.submit().await {
        Ok(route) => {
            println!("Saved. Continue at {route}");
            Ok(())
        }
        Err(e) => {
            if console.modal().is_open() {
                answer_modal(console.modal(), true)?;
            }
            Err(e.into())
        }
    }
}

/// People records have too many fields for flags; they are read from a JSON file.
async fn read_payload<T: DeserializeOwned>(resource: Resource, fields: &FormArgs) -> anyhow::Result<T> {
    let path = fields.file.as_ref().ok_or_else(|| anyhow!("{} payloads are read from --file", resource.label()))?;
    let text = tokio::fs::read_to_string(path).await.with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).context("payload is not valid JSON")
}

/// Render the open modal as a terminal prompt and resolve it.
fn answer_modal(modal: &ModalBroadcaster, assume_yes: bool) -> anyhow::Result<bool> {
    let view = modal.current().ok_or_else(|| anyhow!("no dialog is open"))?;
    println!("{}\n{}", view.title, view.message);
    if view.hide_cancel_button {
        modal.confirm();
        return Ok(true);
    }
    let accepted = assume_yes
        || Confirm::new()
            .with_prompt(format!("{}?", view.confirm_text))
            .default(false)
            .interact()?;
    if accepted {
        modal.confirm();
    } else {
        modal.cancel();
    }
    Ok(accepted)
}

fn parse_filters(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|f| {
            f.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| anyhow!("filter '{f}' must look like key=value"))
        })
        .collect()
}

fn print_json(value: Option<&Value>) -> anyhow::Result<()> {
    match value {
        Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
        None => println!("(no content)"),
    }
    Ok(())
}

fn print_toasts(console: &Console) {
    for toast in console.toaster().current() {
        let tag = match toast.kind {
            ToastKind::Loading => "..",
            ToastKind::Success => "ok",
            ToastKind::Error => "!!",
            ToastKind::Info => "--",
        };
        eprintln!("[{tag}] {}", toast.message);
        console.toaster().dismiss(toast.id);
    }
}
