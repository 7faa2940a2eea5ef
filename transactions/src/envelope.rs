//! Built and signed transactions.

use anchor_crypto::{sha256, sha256_multi, sign_message, verify_signature};
use anchor_types::{AccountId, KeyPair, NetworkId, PublicKey, Signature, TxHash};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::memo::Memo;
use crate::operation::Operation;
use crate::xdr::{XdrWriter, ENVELOPE_TYPE_TX};

/// A signature plus the last four bytes of the signer's public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Signature,
}

/// A transaction ready for signing and submission.
///
/// The encoded body is fixed when the envelope is built; signing only appends
/// signatures, so the hash never changes after the first signature.
#[derive(Clone, Debug)]
pub struct TransactionEnvelope {
    pub(crate) source: AccountId,
    pub(crate) fee: u32,
    pub(crate) sequence: i64,
    pub(crate) memo: Memo,
    pub(crate) operations: Vec<Operation>,
    pub(crate) tx_xdr: Vec<u8>,
    pub(crate) signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    pub fn source(&self) -> &AccountId {
        &self.source
    }

    /// Total fee in stroops (base fee times ledger operation count).
    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        &self.signatures
    }

    /// Hash of the signature payload for a network:
    /// `sha256(sha256(passphrase) ‖ ENVELOPE_TYPE_TX ‖ tx)`.
    pub fn hash(&self, network: NetworkId) -> TxHash {
        let network_id = sha256(network.passphrase().as_bytes());
        TxHash::new(sha256_multi(&[
            &network_id,
            &ENVELOPE_TYPE_TX.to_be_bytes(),
            &self.tx_xdr,
        ]))
    }

    /// Add a signature by `keypair`. Signing twice with the same key is a no-op.
    pub fn sign(&mut self, keypair: &KeyPair, network: NetworkId) {
        let hash = self.hash(network);
        let decorated = DecoratedSignature {
            hint: keypair.public.hint(),
            signature: sign_message(hash.as_bytes(), &keypair.private),
        };
        if !self.signatures.contains(&decorated) {
            self.signatures.push(decorated);
        }
    }

    /// Whether one of the attached signatures was made by `key` for `network`.
    pub fn is_signed_by(&self, key: &PublicKey, network: NetworkId) -> bool {
        let hash = self.hash(network);
        let expected_hint = key.hint();
        self.signatures.iter().any(|sig| {
            sig.hint == expected_hint && verify_signature(hash.as_bytes(), &sig.signature, key)
        })
    }

    /// The `TransactionEnvelope` XDR: type tag, transaction, signatures.
    pub fn to_xdr(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();
        w.u32(ENVELOPE_TYPE_TX);
        w.opaque_fixed(&self.tx_xdr);
        w.u32(self.signatures.len() as u32);
        for sig in &self.signatures {
            w.opaque_fixed(&sig.hint);
            w.opaque_var(sig.signature.as_bytes());
        }
        w.into_bytes()
    }

    pub fn to_xdr_base64(&self) -> String {
        STANDARD.encode(self.to_xdr())
    }
}
