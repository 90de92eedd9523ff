use std::io::Write as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use joinbarber::app::{Route, Router};
use joinbarber::config::{ClientConfig, ConfigError};
use joinbarber::net::api::{AuthClient, ClientBuildError};
use joinbarber::net::types::Role;
use joinbarber::pages::welcome::{Field, Mode, Submission, WelcomeForm};
use joinbarber::state::session::{Notice, Session};
use joinbarber::state::storage::FileStore;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ClientBuild(#[from] ClientBuildError),
    #[error("terminal io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Invalid(String),
    #[error("{title}: {message}")]
    Rejected { title: String, message: String },
}

#[derive(Parser, Debug)]
#[command(name = "joinbarber", about = "Join Barber client: sign in, sign up, and open your dashboard")]
struct Cli {
    #[arg(long, env = "JOINBARBER_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "JOINBARBER_STORE_PATH")]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive welcome screen and dashboards (default).
    Welcome,
    /// Show the screen the stored session would open.
    Whoami,
    /// Sign in and store the session.
    SignIn(SignInArgs),
    /// Register an account.
    ///
    /// The session returned by the server is stored, so later runs start
    /// signed in as the new account. Run `sign-out` to discard it.
    SignUp(SignUpArgs),
    /// Forget the stored session and notify the server.
    SignOut,
}

#[derive(Args, Debug)]
struct SignInArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "JOINBARBER_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct SignUpArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "JOINBARBER_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to the password when omitted.
    #[arg(long)]
    password_confirmation: Option<String>,
    #[arg(long, value_enum, default_value_t = RoleArg::Barber)]
    role: RoleArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Customer,
    Shop,
    Barber,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Customer => Role::Customer,
            RoleArg::Shop => Role::Shop,
            RoleArg::Barber => Role::Barber,
        }
    }
}

type AppSession = Session<FileStore>;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    if let Some(store_path) = cli.store_path {
        config = config.with_store_path(store_path);
    }
    tracing::debug!(base_url = %config.base_url, store = %config.store_path.display(), "client configured");

    let store = FileStore::new(config.store_path.clone());
    let session = Session::new(AuthClient::new(&config, store)?);
    session.init().await;

    match cli.command.unwrap_or(Command::Welcome) {
        Command::Welcome => run_welcome(&session).await,
        Command::Whoami => {
            run_whoami(&session);
            Ok(())
        }
        Command::SignIn(args) => run_sign_in(&session, args).await,
        Command::SignUp(args) => run_sign_up(&session, args).await,
        Command::SignOut => {
            session.sign_out().await;
            println!("Signed out.");
            Ok(())
        }
    }
}

// =============================================================================
// ONE-SHOT COMMANDS
// =============================================================================

fn run_whoami(session: &AppSession) {
    let state = session.state();
    let route = Route::for_state(&state);
    match state.user {
        Some(user) => println!("{} <{}> ({}) -> {}", user.display_name(), user.email, user.role, route.title()),
        None => println!("Not signed in -> {}", route.title()),
    }
}

async fn run_sign_in(session: &AppSession, args: SignInArgs) -> Result<(), CliError> {
    let mut form = WelcomeForm::new();
    form.set_mode(Mode::SignIn);
    form.set_field(Field::Email, args.email);
    form.set_field(Field::Password, args.password);
    finish_submission(form.submit(session).await, &form)
}

async fn run_sign_up(session: &AppSession, args: SignUpArgs) -> Result<(), CliError> {
    let mut form = WelcomeForm::new();
    let confirmation = args.password_confirmation.unwrap_or_else(|| args.password.clone());
    form.set_field(Field::FirstName, args.first_name);
    form.set_field(Field::LastName, args.last_name);
    form.set_field(Field::Phone, args.phone);
    form.set_field(Field::Email, args.email);
    form.set_field(Field::Password, args.password);
    form.set_field(Field::PasswordConfirmation, confirmation);
    form.select_role(args.role.into());
    finish_submission(form.submit(session).await, &form)
}

fn finish_submission(submission: Submission, form: &WelcomeForm) -> Result<(), CliError> {
    match submission {
        Submission::Completed(notice) if notice.is_success() => {
            print_notice(&notice);
            Ok(())
        }
        Submission::Completed(notice) => Err(CliError::Rejected { title: notice.title, message: notice.message }),
        Submission::Invalid => Err(CliError::Invalid(render_form_errors(form))),
        Submission::Busy => Err(CliError::Invalid("another request is still running".to_owned())),
    }
}

// =============================================================================
// INTERACTIVE
// =============================================================================

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self { lines: BufReader::new(tokio::io::stdin()).lines() }
    }

    /// Print `label` and read one line. `None` on end of input.
    async fn ask(&mut self, label: &str) -> Result<Option<String>, CliError> {
        print!("{label}: ");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

async fn run_welcome(session: &AppSession) -> Result<(), CliError> {
    let mut router = Router::new(session.subscribe());
    let mut form = WelcomeForm::new();
    let mut prompt = Prompt::new();

    loop {
        let keep_going = match router.current() {
            Route::Loading => {
                session.init().await;
                true
            }
            Route::Welcome => welcome_screen(session, &mut form, &mut prompt).await?,
            dashboard => dashboard_screen(session, dashboard, &mut prompt).await?,
        };
        if !keep_going {
            return Ok(());
        }
        if let Some(route) = router.refresh() {
            if route == Route::Welcome {
                form = WelcomeForm::new();
            }
        }
    }
}

async fn welcome_screen(session: &AppSession, form: &mut WelcomeForm, prompt: &mut Prompt) -> Result<bool, CliError> {
    println!();
    println!("== {} ==", Route::Welcome.title());
    println!("Sign in to manage your barbershop or join a queue");

    let switch_hint = format!("{} [enter], sign [i]n, sign [u]p, [q]uit", form.mode().title());
    let Some(choice) = prompt.ask(&switch_hint).await? else {
        return Ok(false);
    };
    match choice.trim() {
        "q" => return Ok(false),
        "i" => form.set_mode(Mode::SignIn),
        "u" => form.set_mode(Mode::SignUp),
        _ => {}
    }

    for field in form.mode().fields() {
        let mut label = format!("{} ({})", field.label(), field.placeholder());
        if let Some(error) = form.error(*field) {
            label = format!("{label} [{error}]");
        }
        if !field.is_secret() && !form.value(*field).is_empty() {
            label = format!("{label} [{}]", form.value(*field));
        }
        let Some(value) = prompt.ask(&label).await? else {
            return Ok(false);
        };
        if !value.is_empty() || field.is_secret() {
            form.set_field(*field, value);
        }
    }

    if form.mode() == Mode::SignUp {
        for (i, role) in Role::ALL.iter().enumerate() {
            let marker = if *role == form.role() { "*" } else { " " };
            println!(" {marker} {}. {} - {}", i + 1, role.label(), role.description());
        }
        let Some(choice) = prompt.ask("Account Type [enter keeps *]").await? else {
            return Ok(false);
        };
        if let Some(role) = choice.trim().parse::<usize>().ok().and_then(|n| Role::ALL.get(n.wrapping_sub(1))) {
            form.select_role(*role);
        }
    }

    println!("-> {}", form.mode().submit_label());
    match form.submit(session).await {
        Submission::Completed(notice) => print_notice(&notice),
        Submission::Invalid => println!("{}", render_form_errors(form)),
        Submission::Busy => println!("Still working, try again."),
    }
    Ok(true)
}

async fn dashboard_screen(session: &AppSession, route: Route, prompt: &mut Prompt) -> Result<bool, CliError> {
    println!();
    println!("== {} ==", route.title());
    if let Some(user) = session.state().user {
        println!("Signed in as {} ({})", user.display_name(), user.role);
    }
    let Some(choice) = prompt.ask("sign [o]ut, [q]uit").await? else {
        return Ok(false);
    };
    match choice.trim() {
        "o" => {
            session.sign_out().await;
            Ok(true)
        }
        "q" => Ok(false),
        _ => Ok(true),
    }
}

fn print_notice(notice: &Notice) {
    println!("{}\n{}", notice.title, notice.message);
}

fn render_form_errors(form: &WelcomeForm) -> String {
    form.errors()
        .iter()
        .map(|(field, message)| format!("{}: {message}", field.key()))
        .collect::<Vec<_>>()
        .join("\n")
}
