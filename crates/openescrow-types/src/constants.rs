//! System-wide constants for the OpenEscrow ledger.

/// Maximum plan name length in bytes (default).
pub const DEFAULT_MAX_NAME_LEN: usize = 256;

/// Whether the ledger re-checks custody after every mutation (default).
pub const DEFAULT_VERIFY_INVARIANTS: bool = true;

/// Domain separator for plan id derivation.
pub const PLAN_ID_DOMAIN: &[u8] = b"openescrow:plan_id:v1:";

/// Domain separator for the event log hash chain.
pub const EVENT_CHAIN_DOMAIN: &[u8] = b"openescrow:event:v1:";

/// Chain hash preceding the first event record.
pub const GENESIS_CHAIN_HASH: [u8; 32] = [0u8; 32];

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenEscrow";
