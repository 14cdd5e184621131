pub mod heuristics;
pub mod io;
pub mod models;
pub mod provider;
pub mod stages;

pub use heuristics::{observe_call, AnalyticsConfig, CallObservation};
pub use io::{
    format_call_log, load_records_file, parse_records_json, write_summary_json, AnalyticsExport,
    SummaryReport,
};
pub use models::{AnalyticsSummary, CallExecutionRecord, CallStatus, ConversationPayload};
pub use provider::{ExecutionsClient, ProviderConfig, ProviderError};
pub use stages::{aggregate, normalize, render_conversation, NormalizedTranscript};
