use crate::{
    auth::{AuthResponse, LoginData, RegisterData},
    case_store::{Case, CaseDraft, CaseStatus},
    progress::UserProgress,
    summary::DeskSummary,
    transaction_store::{Transaction, TransactionDraft, TransactionStatus},
};
use serde::{Deserialize, Serialize};

/// Every operation a front end can ask the desk to perform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeskCommand {
    // ── Transactions ──────────────────────────────
    AddTransaction { transaction: TransactionDraft },
    UpdateTransactionStatus { id: String, status: TransactionStatus },
    ListTransactions,
    HighRiskTransactions,
    FlaggedTransactions,

    // ── Cases ─────────────────────────────────────
    AddCase { case: CaseDraft },
    UpdateCaseStatus { id: String, status: CaseStatus },
    SyncCases,
    FilterCases {
        #[serde(default)]
        query: String,
        #[serde(default = "all")]
        risk: String,
        #[serde(default = "all")]
        status: String,
    },

    // ── Session ───────────────────────────────────
    Register { data: RegisterData },
    Login { data: LoginData },
    ForgotPassword { email: String },
    CompleteOnboarding,
    ResetUserData,
    Poll,
    GetProgress,
    GetSummary,
}

fn all() -> String {
    "all".to_string()
}

/// The desk's answer to a DeskCommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum CommandReply {
    Transaction { transaction: Transaction },
    Transactions { transactions: Vec<Transaction> },
    Case { case: Case },
    Cases { cases: Vec<Case> },
    Updated { found: bool },
    Auth { response: AuthResponse },
    Progress { progress: UserProgress },
    Summary { summary: DeskSummary },
    Ack,
}
