//! Outbound adapters implementing the driven ports.

pub mod preferences;
pub mod supabase;

pub use preferences::JsonFilePreferenceStore;
pub use supabase::{
    SupabaseConfig, SupabaseConfigError, SupabaseGoalStore, SupabaseImageStore,
    SupabaseSessionService, SupabaseTransactionStore, SupabaseTransport,
};
