use clap::{Parser, Subcommand};
use hosted_checkout::application::machine::{Event, PaymentState, transition};
use hosted_checkout::application::session::SessionHandle;
use hosted_checkout::config::{GatewayConfig, ServeConfig};
use hosted_checkout::domain::input::validate;
use hosted_checkout::domain::payment::PaymentStatus;
use hosted_checkout::domain::redirect::{ReturnParameters, strip_query};
use hosted_checkout::infrastructure::in_memory::InMemoryPage;
use hosted_checkout::interfaces::http;
use miette::{IntoDiagnostic, Result, miette};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a payment, create a checkout preference and print the checkout URL
    Pay {
        /// Amount in BRL
        #[arg(long, allow_hyphen_values = true)]
        amount: String,

        /// Payer email
        #[arg(long)]
        email: String,

        /// URL of the page the payer returns to
        #[arg(long)]
        page_url: String,

        #[command(flatten)]
        gateway: GatewayConfig,
    },
    /// Interpret the provider's return parameters in a page URL
    Reconcile {
        /// Page URL as the provider redirected back to it
        #[arg(long)]
        page_url: String,
    },
    /// Run the relay backend that creates preferences with the server-held token
    Serve(ServeConfig),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Pay {
            amount,
            email,
            page_url,
            gateway,
        } => pay(amount, email, page_url, gateway).await,
        Command::Reconcile { page_url } => reconcile(&page_url),
        Command::Serve(config) => serve(config).await,
    }
}

async fn pay(amount: String, email: String, page_url: String, config: GatewayConfig) -> Result<()> {
    // Bad input is reported before a missing credential.
    validate(&amount, &email).into_diagnostic()?;
    let gateway = config.gateway().into_diagnostic()?;
    let page = Arc::new(InMemoryPage::new(page_url));
    let session = SessionHandle::spawn(gateway, page.clone());

    session.load().await.into_diagnostic()?;
    session.set_amount(amount).await.into_diagnostic()?;
    session.set_payer_email(email).await.into_diagnostic()?;
    session.submit().await.into_diagnostic()?;

    let snapshot = session.outcome().await.into_diagnostic()?;
    if let Some(url) = snapshot.state.redirect() {
        println!("{url}");
        return Ok(());
    }

    let result = snapshot.result();
    if result.status == PaymentStatus::Error {
        return Err(miette!("{}", result.message));
    }
    println!("{result}");
    Ok(())
}

fn reconcile(page_url: &str) -> Result<()> {
    let Some(params) = ReturnParameters::from_page_url(page_url) else {
        println!("no return parameters in {page_url}");
        return Ok(());
    };

    let state = transition(&PaymentState::Idle, Event::Returned(params)).into_diagnostic()?;
    println!("{}", state.result());
    if let Some(clean) = strip_query(page_url) {
        println!("URL: {clean}");
    }
    Ok(())
}

async fn serve(config: ServeConfig) -> Result<()> {
    let gateway = config.provider.gateway().into_diagnostic()?;
    let handle = http::start(config.listen, Arc::new(gateway))
        .await
        .into_diagnostic()?;
    tracing::info!(url = %handle.url, "relay running");

    tokio::signal::ctrl_c().await.into_diagnostic()?;
    tracing::info!("shutting down");
    handle.shutdown().await;
    Ok(())
}
