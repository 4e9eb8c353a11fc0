use super::machine::{Event, PaymentState, SubmissionToken, transition};
use crate::domain::checkout::{CheckoutRequest, PreferenceResponse};
use crate::domain::input::validate;
use crate::domain::payment::{PaymentResult, PaymentStatus};
use crate::domain::ports::{CheckoutGatewayRef, PageRef};
use crate::domain::redirect::{ReturnParameters, strip_query};
use crate::error::{CheckoutError, Result, TransitionError};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 32;

/// Everything a UI needs to render the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub amount: String,
    pub payer_email: String,
    pub state: PaymentState,
}

impl Snapshot {
    pub fn result(&self) -> PaymentResult {
        self.state.result()
    }

    pub fn status(&self) -> PaymentStatus {
        self.state.status()
    }
}

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Load(Reply<bool>),
    SetAmount(String, Reply<()>),
    SetPayerEmail(String, Reply<()>),
    Submit(Reply<Option<SubmissionToken>>),
    Reset(Reply<()>),
}

struct Completion {
    token: SubmissionToken,
    outcome: Result<PreferenceResponse>,
}

/// Handle to a running checkout session.
///
/// The session owns the form fields and the [`PaymentState`]; every change goes
/// through [`transition`]. Dropping the last handle stops the session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    /// Starts a session on the current tokio runtime.
    pub fn spawn(gateway: CheckoutGatewayRef, page: PageRef) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshots) = watch::channel(Snapshot::default());
        let session = CheckoutSession {
            gateway,
            page,
            snapshot: snapshot_tx,
            last_token: SubmissionToken::default(),
        };
        tokio::spawn(session.run(command_rx));
        Self {
            commands,
            snapshots,
        }
    }

    /// Reconciles provider return parameters in the page URL, if any.
    ///
    /// Returns whether parameters were found and consumed.
    pub async fn load(&self) -> Result<bool> {
        self.request(Command::Load).await
    }

    pub async fn set_amount(&self, amount: impl Into<String>) -> Result<()> {
        let amount = amount.into();
        self.request(|reply| Command::SetAmount(amount, reply)).await
    }

    pub async fn set_payer_email(&self, payer_email: impl Into<String>) -> Result<()> {
        let payer_email = payer_email.into();
        self.request(|reply| Command::SetPayerEmail(payer_email, reply))
            .await
    }

    /// Validates the form and starts a gateway call.
    ///
    /// Returns the token of the started call, or `None` when validation failed
    /// and the session settled in `error` without any network activity.
    pub async fn submit(&self) -> Result<Option<SubmissionToken>> {
        self.request(Command::Submit).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.request(Command::Reset).await
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Waits until no gateway call is pending: the session either settled or
    /// is redirecting to the provider.
    pub async fn outcome(&self) -> Result<Snapshot> {
        let mut snapshots = self.subscribe();
        let snapshot = snapshots
            .wait_for(|s| s.status() != PaymentStatus::Processing || s.state.redirect().is_some())
            .await
            .map_err(|_| CheckoutError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| CheckoutError::SessionClosed)?;
        response.await.map_err(|_| CheckoutError::SessionClosed)?
    }
}

struct CheckoutSession {
    gateway: CheckoutGatewayRef,
    page: PageRef,
    snapshot: watch::Sender<Snapshot>,
    last_token: SubmissionToken,
}

impl CheckoutSession {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let (completion_tx, mut completions) = mpsc::unbounded_channel();
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command, &completion_tx),
                    None => break,
                },
                Some(completion) = completions.recv() => self.complete(completion),
            }
        }
        debug!("checkout session stopped");
    }

    fn handle(&mut self, command: Command, completions: &mpsc::UnboundedSender<Completion>) {
        match command {
            Command::Load(reply) => {
                let _ = reply.send(self.load());
            }
            Command::SetAmount(amount, reply) => {
                let _ = reply.send(self.edit(|s| s.amount = amount));
            }
            Command::SetPayerEmail(payer_email, reply) => {
                let _ = reply.send(self.edit(|s| s.payer_email = payer_email));
            }
            Command::Submit(reply) => {
                let _ = reply.send(self.submit(completions));
            }
            Command::Reset(reply) => {
                let _ = reply.send(self.reset());
            }
        }
    }

    fn current(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    fn apply(&mut self, event: Event) -> std::result::Result<(), TransitionError> {
        let next = transition(&self.current().state, event)?;
        self.snapshot.send_modify(|s| s.state = next);
        Ok(())
    }

    fn edit(&mut self, change: impl FnOnce(&mut Snapshot)) -> Result<()> {
        if self.current().status() == PaymentStatus::Processing {
            return Err(TransitionError::SubmissionInFlight.into());
        }
        self.snapshot.send_modify(change);
        Ok(())
    }

    fn load(&mut self) -> Result<bool> {
        let location = self.page.location();
        let Some(params) = ReturnParameters::from_page_url(&location) else {
            return Ok(false);
        };

        let next = transition(&self.current().state, Event::Returned(params.clone()))?;
        if let Some(clean) = strip_query(&location) {
            self.page.replace_location(&clean);
        }
        info!(
            status = %params.status,
            payment_id = %params.payment_id,
            "reconciled provider return"
        );
        self.snapshot.send_modify(|s| s.state = next);
        Ok(true)
    }

    fn submit(
        &mut self,
        completions: &mpsc::UnboundedSender<Completion>,
    ) -> Result<Option<SubmissionToken>> {
        let form = self.current();
        let input = match validate(&form.amount, &form.payer_email) {
            Ok(input) => input,
            Err(err) => {
                debug!(%err, "checkout input rejected");
                self.apply(Event::Rejected(err))?;
                return Ok(None);
            }
        };

        let token = self.last_token.next();
        self.apply(Event::Submitted(token))?;
        self.last_token = token;

        let request = match CheckoutRequest::build(&input, &self.page.location(), Utc::now()) {
            Ok(request) => request,
            Err(err) => {
                warn!(%token, %err, "cannot build checkout request");
                self.apply(Event::Failed {
                    token,
                    reason: err.reason(),
                })?;
                return Ok(Some(token));
            }
        };

        info!(
            %token,
            external_reference = %request.external_reference,
            "creating checkout preference"
        );
        let gateway = self.gateway.clone();
        let completions = completions.clone();
        tokio::spawn(async move {
            let outcome = gateway.create_preference(&request).await;
            let _ = completions.send(Completion { token, outcome });
        });

        Ok(Some(token))
    }

    fn complete(&mut self, Completion { token, outcome }: Completion) {
        let event = match outcome.and_then(|response| response.checkout_url().map(str::to_owned)) {
            Ok(url) => Event::Redirected { token, url },
            Err(err) => {
                warn!(%token, %err, "checkout preference failed");
                Event::Failed {
                    token,
                    reason: err.reason(),
                }
            }
        };

        let redirect = match &event {
            Event::Redirected { url, .. } => Some(url.clone()),
            _ => None,
        };
        if let Err(err) = self.apply(event) {
            debug!(%token, %err, "discarding gateway completion");
            return;
        }
        if let Some(url) = redirect {
            info!(%token, %url, "redirecting to checkout");
            self.page.navigate(&url);
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.apply(Event::Reset)?;
        self.snapshot.send_modify(|s| {
            s.amount.clear();
            s.payer_email.clear();
        });
        Ok(())
    }
}
