//! Wallet session snapshots.

use std::{fmt, sync::Arc};

use alloy_primitives::Address;

use crate::traits::TxSigner;

/// EVM chain id.
pub type ChainId = u64;

/// Snapshot of the wallet connection.
///
/// Owned and published by the wallet collaborator; the orchestrator only
/// reads it. A connected session always carries an account and a signer,
/// which the constructors enforce.
#[derive(Clone, Default)]
pub struct Session {
    connected: bool,
    account: Option<Address>,
    chain_id: Option<ChainId>,
    signer: Option<Arc<dyn TxSigner>>,
    error: Option<String>,
}

impl Session {
    /// A session with no wallet attached.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A ready session for `signer`'s account.
    pub fn connected(chain_id: Option<ChainId>, signer: Arc<dyn TxSigner>) -> Self {
        Self {
            connected: true,
            account: Some(signer.address()),
            chain_id,
            signer: Some(signer),
            error: None,
        }
    }

    /// Sets the chain the wallet reports, connected or not.
    pub fn with_chain_id(mut self, chain_id: Option<ChainId>) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Marks the session as failed, e.g. after the user dismissed the
    /// connect prompt.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether transactions can be submitted right now.
    pub fn is_ready(&self) -> bool {
        self.connected && self.account.is_some() && self.signer.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    pub fn signer(&self) -> Option<&Arc<dyn TxSigner>> {
        self.signer.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connected", &self.connected)
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("has_signer", &self.signer.is_some())
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeSigner;

    #[test]
    fn test_connected_session_carries_signer_account() {
        let signer = FakeSigner::arc(Address::repeat_byte(0xaa));
        let session = Session::connected(Some(1), signer);

        assert!(session.is_connected());
        assert!(session.is_ready());
        assert_eq!(session.account(), Some(Address::repeat_byte(0xaa)));
        assert_eq!(session.chain_id(), Some(1));
        assert!(session.error().is_none());
    }

    #[test]
    fn test_disconnected_session_is_not_ready() {
        let session = Session::disconnected()
            .with_chain_id(Some(100))
            .with_error("user closed modal");

        assert!(!session.is_connected());
        assert!(!session.is_ready());
        assert_eq!(session.chain_id(), Some(100));
        assert_eq!(session.error(), Some("user closed modal"));
    }
}
