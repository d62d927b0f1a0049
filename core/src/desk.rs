//! The desk: one explicitly constructed container per session.
//!
//! EVENT FLOW (every mutating call):
//!   1. The call goes to exactly one store or the user service.
//!   2. The stores' outboxes are drained, transactions first.
//!   3. Each event is applied to user progress, logged, and handed
//!      to every observer in subscription order.
//!   4. If progress changed and a DeskStore is attached, it is saved.
//!
//! Form validation happens here, before step 1. Nothing is global:
//! two desks never share state.

use crate::{
    analyzer::NoiseSource,
    auth::{AuthResponse, LoginData, RegisterData, UserService},
    case_store::{Case, CaseDraft, CaseStatus, CaseStore},
    clock::{Clock, IntervalTimer, ManualClock},
    command::{CommandReply, DeskCommand},
    config::DeskConfig,
    error::DeskResult,
    event::{DeskEvent, DeskObserver},
    progress::UserProgress,
    rng::{RngBank, StreamSlot},
    store::DeskStore,
    summary::DeskSummary,
    transaction_store::{Transaction, TransactionDraft, TransactionStatus, TransactionStore},
    validation,
};
use std::sync::Arc;

/// Fixed start time for test desks: 2024-01-15T00:00:00Z.
const TEST_EPOCH_MILLIS: i64 = 1_705_276_800_000;

pub struct Desk {
    config: DeskConfig,
    clock: Arc<dyn Clock>,
    seed: u64,
    transactions: TransactionStore,
    cases: CaseStore,
    users: UserService,
    progress: UserProgress,
    persistence: Option<(DeskStore, String)>,
    sync_timer: IntervalTimer,
    observers: Vec<Box<dyn DeskObserver>>,
}

impl Desk {
    /// A desk whose scoring noise comes from the seeded bank.
    pub fn new(config: DeskConfig, seed: u64, clock: Arc<dyn Clock>) -> Self {
        let noise = RngBank::new(seed).for_stream(StreamSlot::ScoringNoise);
        Self::with_noise(config, seed, clock, Box::new(noise))
    }

    /// A desk with an explicit noise source, e.g. `NoNoise` in tests.
    pub fn with_noise(
        config: DeskConfig,
        seed: u64,
        clock: Arc<dyn Clock>,
        noise: Box<dyn NoiseSource>,
    ) -> Self {
        let bank = RngBank::new(seed);
        let transactions = TransactionStore::new(&config, clock.clone(), noise);
        let cases = CaseStore::new(
            config.derivation.clone(),
            clock.clone(),
            bank.for_stream(StreamSlot::CaseIds),
        );
        let sync_timer = IntervalTimer::new(config.sync_interval_ms);
        Self {
            config,
            clock,
            seed,
            transactions,
            cases,
            users: UserService::new(),
            progress: UserProgress::default(),
            persistence: None,
            sync_timer,
            observers: Vec::new(),
        }
    }

    /// A seeded desk on a manual clock pinned to a fixed day.
    pub fn build_test(seed: u64) -> Self {
        Self::new(
            DeskConfig::default_test(),
            seed,
            Arc::new(ManualClock::new(TEST_EPOCH_MILLIS)),
        )
    }

    /// Attach durable storage for user progress under `profile`.
    /// Progress already saved for the profile replaces the in-memory flags.
    pub fn with_progress_store(mut self, store: DeskStore, profile: &str) -> DeskResult<Self> {
        store.migrate()?;
        match store.load_progress(profile)? {
            Some(saved) => {
                log::debug!("Restored progress for profile {profile}: {saved:?}");
                self.progress = saved;
            }
            None => store.save_progress(profile, &self.progress, self.clock.now_millis())?,
        }
        self.persistence = Some((store, profile.to_string()));
        Ok(self)
    }

    pub fn subscribe(&mut self, observer: Box<dyn DeskObserver>) {
        self.observers.push(observer);
    }

    // ── Read access ────────────────────────────────────────────────

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.transactions()
    }

    pub fn transaction_store(&self) -> &TransactionStore {
        &self.transactions
    }

    pub fn cases(&self) -> &[Case] {
        self.cases.cases()
    }

    pub fn case_store(&self) -> &CaseStore {
        &self.cases
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn summary(&self) -> DeskSummary {
        DeskSummary::compute(self.transactions.transactions(), self.cases.cases())
    }

    pub fn filtered_cases(&self, query: &str, risk_filter: &str, status_filter: &str) -> Vec<Case> {
        self.cases.get_filtered_cases(query, risk_filter, status_filter)
    }

    // ── Transactions ───────────────────────────────────────────────

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> DeskResult<Transaction> {
        validation::validate_transaction(&draft, &self.config.validation)?;
        let transaction = self.transactions.add_transaction(draft);
        self.dispatch()?;
        Ok(transaction)
    }

    pub fn update_transaction_status(
        &mut self,
        id: &str,
        status: TransactionStatus,
    ) -> DeskResult<bool> {
        let found = self.transactions.update_transaction_status(id, status);
        self.dispatch()?;
        Ok(found)
    }

    // ── Cases ──────────────────────────────────────────────────────

    pub fn add_case(&mut self, draft: CaseDraft) -> DeskResult<Case> {
        validation::validate_case(&draft, &self.config.validation)?;
        let case = self.cases.add_case(draft);
        self.dispatch()?;
        Ok(case)
    }

    pub fn update_case_status(&mut self, id: &str, status: CaseStatus) -> DeskResult<bool> {
        let found = self.cases.update_case_status(id, status);
        self.dispatch()?;
        Ok(found)
    }

    /// Derive cases from the current transactions. Returns the new cases.
    pub fn sync_cases(&mut self) -> DeskResult<Vec<Case>> {
        let derived = self
            .cases
            .sync_with_transactions(self.transactions.transactions());
        self.dispatch()?;
        Ok(derived)
    }

    // ── Periodic sync ──────────────────────────────────────────────

    /// Run a sync now and start the periodic timer.
    pub fn mount(&mut self) -> DeskResult<Vec<Case>> {
        let derived = self.sync_cases()?;
        self.sync_timer.arm(self.clock.now_millis());
        Ok(derived)
    }

    /// Run a sync if the timer is armed and due. Returns the new cases.
    pub fn poll(&mut self) -> DeskResult<Vec<Case>> {
        if self.sync_timer.fire_if_due(self.clock.now_millis()) {
            self.sync_cases()
        } else {
            Ok(Vec::new())
        }
    }

    /// Stop the periodic timer. Stored data is untouched.
    pub fn unmount(&mut self) {
        self.sync_timer.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        self.sync_timer.is_armed()
    }

    // ── Session ────────────────────────────────────────────────────

    pub fn register(&mut self, data: RegisterData) -> DeskResult<AuthResponse> {
        validation::validate_registration(&data, &self.config.validation)?;
        let response = self.users.register(data)?;
        log::info!("Registered {} ({})", response.user.email, response.user.organization);
        let event = DeskEvent::UserRegistered {
            user_id: response.user.id.clone(),
            email: response.user.email.clone(),
            date: self.clock.today(),
        };
        self.route(vec![event])?;
        Ok(response)
    }

    pub fn login(&self, data: &LoginData) -> DeskResult<AuthResponse> {
        validation::validate_login(data)?;
        self.users.login(data)
    }

    pub fn request_password_reset(&self, email: &str) -> DeskResult<()> {
        validation::validate_email(email)?;
        self.users.request_password_reset(email)
    }

    pub fn complete_onboarding(&mut self) -> DeskResult<()> {
        self.progress.set_first_time_complete();
        self.persist_progress()
    }

    /// Back to first-time state. Stores keep their contents.
    pub fn reset_user_data(&mut self) -> DeskResult<()> {
        self.progress.reset();
        self.persist_progress()
    }

    // ── Commands ───────────────────────────────────────────────────

    pub fn execute(&mut self, command: DeskCommand) -> DeskResult<CommandReply> {
        let reply = match command {
            DeskCommand::AddTransaction { transaction } => CommandReply::Transaction {
                transaction: self.add_transaction(transaction)?,
            },
            DeskCommand::UpdateTransactionStatus { id, status } => CommandReply::Updated {
                found: self.update_transaction_status(&id, status)?,
            },
            DeskCommand::ListTransactions => CommandReply::Transactions {
                transactions: self.transactions().to_vec(),
            },
            DeskCommand::HighRiskTransactions => CommandReply::Transactions {
                transactions: self.transactions.high_risk_transactions(),
            },
            DeskCommand::FlaggedTransactions => CommandReply::Transactions {
                transactions: self.transactions.flagged_transactions(),
            },
            DeskCommand::AddCase { case } => CommandReply::Case {
                case: self.add_case(case)?,
            },
            DeskCommand::UpdateCaseStatus { id, status } => CommandReply::Updated {
                found: self.update_case_status(&id, status)?,
            },
            DeskCommand::SyncCases => CommandReply::Cases {
                cases: self.sync_cases()?,
            },
            DeskCommand::FilterCases { query, risk, status } => CommandReply::Cases {
                cases: self.filtered_cases(&query, &risk, &status),
            },
            DeskCommand::Register { data } => CommandReply::Auth {
                response: self.register(data)?,
            },
            DeskCommand::Login { data } => CommandReply::Auth {
                response: self.login(&data)?,
            },
            DeskCommand::ForgotPassword { email } => {
                self.request_password_reset(&email)?;
                CommandReply::Ack
            }
            DeskCommand::CompleteOnboarding => {
                self.complete_onboarding()?;
                CommandReply::Progress {
                    progress: self.progress.clone(),
                }
            }
            DeskCommand::ResetUserData => {
                self.reset_user_data()?;
                CommandReply::Progress {
                    progress: self.progress.clone(),
                }
            }
            DeskCommand::Poll => CommandReply::Cases {
                cases: self.poll()?,
            },
            DeskCommand::GetProgress => CommandReply::Progress {
                progress: self.progress.clone(),
            },
            DeskCommand::GetSummary => CommandReply::Summary {
                summary: self.summary(),
            },
        };
        Ok(reply)
    }

    // ── Event routing ──────────────────────────────────────────────

    fn dispatch(&mut self) -> DeskResult<()> {
        let mut events = self.transactions.drain_events();
        events.extend(self.cases.drain_events());
        self.route(events)
    }

    fn route(&mut self, events: Vec<DeskEvent>) -> DeskResult<()> {
        let mut progress_changed = false;
        for event in &events {
            log::debug!("{}: {}", event.type_name(), serde_json::to_string(event)?);
            progress_changed |= self.progress.apply(event);
            for observer in &mut self.observers {
                observer.on_event(event);
            }
        }
        if progress_changed {
            self.persist_progress()?;
        }
        Ok(())
    }

    fn persist_progress(&self) -> DeskResult<()> {
        if let Some((store, profile)) = &self.persistence {
            store.save_progress(profile, &self.progress, self.clock.now_millis())?;
        }
        Ok(())
    }
}
