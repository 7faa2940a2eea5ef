//! XDR encoding of the ledger's transaction structures.
//!
//! Only the encoder is needed: envelopes are produced here and submitted as
//! base64. Everything is big-endian and padded to 4-byte boundaries.

use anchor_types::{AssetCode, PublicKey};

use crate::memo::Memo;

pub(crate) const ENVELOPE_TYPE_TX: u32 = 2;

const KEY_TYPE_ED25519: u32 = 0;
const SIGNER_KEY_TYPE_ED25519: u32 = 0;
const PRECOND_NONE: u32 = 0;

const MEMO_NONE: u32 = 0;
const MEMO_TEXT: u32 = 1;

const ASSET_TYPE_NATIVE: u32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: u32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: u32 = 2;

const OP_CREATE_ACCOUNT: u32 = 0;
const OP_PAYMENT: u32 = 1;
const OP_SET_OPTIONS: u32 = 5;
const OP_CHANGE_TRUST: u32 = 6;
const OP_ALLOW_TRUST: u32 = 7;

const AUTHORIZED_FLAG: u32 = 1;

/// Asset with its issuer already decoded to key bytes.
#[derive(Clone, Debug)]
pub(crate) enum WireAsset {
    Native,
    Credit { code: AssetCode, issuer: PublicKey },
}

/// One ledger operation after validation and expansion.
#[derive(Clone, Debug)]
pub(crate) enum WireOperation {
    CreateAccount {
        destination: PublicKey,
        starting_balance: i64,
    },
    Payment {
        destination: PublicKey,
        asset: WireAsset,
        amount: i64,
    },
    SetOptions {
        master_weight: Option<u32>,
        low: Option<u32>,
        medium: Option<u32>,
        high: Option<u32>,
        signer: Option<(PublicKey, u32)>,
    },
    ChangeTrust {
        asset: WireAsset,
        limit: i64,
    },
    AllowTrust {
        trustor: PublicKey,
        code: AssetCode,
        authorize: bool,
    },
}

/// Fields of a transaction, ready to encode.
pub(crate) struct WireTransaction<'a> {
    pub source: &'a PublicKey,
    pub fee: u32,
    pub sequence: i64,
    pub memo: &'a Memo,
    pub operations: &'a [WireOperation],
}

#[derive(Default)]
pub(crate) struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Fixed-length opaque data, zero-padded to a multiple of four.
    pub fn opaque_fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.pad(bytes.len());
    }

    /// Variable-length opaque data or string: length prefix, bytes, padding.
    pub fn opaque_var(&mut self, bytes: &[u8]) {
        self.u32(bytes.len() as u32);
        self.opaque_fixed(bytes);
    }

    fn pad(&mut self, len: usize) {
        let padding = (4 - len % 4) % 4;
        self.buf.extend(std::iter::repeat(0u8).take(padding));
    }

    fn optional_u32(&mut self, value: Option<u32>) {
        match value {
            Some(v) => {
                self.u32(1);
                self.u32(v);
            }
            None => self.u32(0),
        }
    }

    fn account_id(&mut self, key: &PublicKey) {
        self.u32(KEY_TYPE_ED25519);
        self.opaque_fixed(key.as_bytes());
    }

    fn muxed_account(&mut self, key: &PublicKey) {
        self.u32(KEY_TYPE_ED25519);
        self.opaque_fixed(key.as_bytes());
    }

    fn asset_code(&mut self, code: &AssetCode) {
        if code.is_alphanum4() {
            let mut raw = [0u8; 4];
            raw[..code.as_str().len()].copy_from_slice(code.as_str().as_bytes());
            self.u32(ASSET_TYPE_CREDIT_ALPHANUM4);
            self.opaque_fixed(&raw);
        } else {
            let mut raw = [0u8; 12];
            raw[..code.as_str().len()].copy_from_slice(code.as_str().as_bytes());
            self.u32(ASSET_TYPE_CREDIT_ALPHANUM12);
            self.opaque_fixed(&raw);
        }
    }

    fn asset(&mut self, asset: &WireAsset) {
        match asset {
            WireAsset::Native => self.u32(ASSET_TYPE_NATIVE),
            WireAsset::Credit { code, issuer } => {
                self.asset_code(code);
                self.account_id(issuer);
            }
        }
    }

    fn memo(&mut self, memo: &Memo) {
        match memo {
            Memo::None => self.u32(MEMO_NONE),
            Memo::Text(text) => {
                self.u32(MEMO_TEXT);
                self.opaque_var(text.as_bytes());
            }
        }
    }

    fn operation(&mut self, op: &WireOperation) {
        // No per-operation source: everything runs as the transaction source.
        self.u32(0);
        match op {
            WireOperation::CreateAccount {
                destination,
                starting_balance,
            } => {
                self.u32(OP_CREATE_ACCOUNT);
                self.account_id(destination);
                self.i64(*starting_balance);
            }
            WireOperation::Payment {
                destination,
                asset,
                amount,
            } => {
                self.u32(OP_PAYMENT);
                self.muxed_account(destination);
                self.asset(asset);
                self.i64(*amount);
            }
            WireOperation::SetOptions {
                master_weight,
                low,
                medium,
                high,
                signer,
            } => {
                self.u32(OP_SET_OPTIONS);
                self.u32(0); // inflation destination
                self.u32(0); // clear flags
                self.u32(0); // set flags
                self.optional_u32(*master_weight);
                self.optional_u32(*low);
                self.optional_u32(*medium);
                self.optional_u32(*high);
                self.u32(0); // home domain
                match signer {
                    Some((key, weight)) => {
                        self.u32(1);
                        self.u32(SIGNER_KEY_TYPE_ED25519);
                        self.opaque_fixed(key.as_bytes());
                        self.u32(*weight);
                    }
                    None => self.u32(0),
                }
            }
            WireOperation::ChangeTrust { asset, limit } => {
                self.u32(OP_CHANGE_TRUST);
                self.asset(asset);
                self.i64(*limit);
            }
            WireOperation::AllowTrust {
                trustor,
                code,
                authorize,
            } => {
                self.u32(OP_ALLOW_TRUST);
                self.account_id(trustor);
                self.asset_code(code);
                self.u32(if *authorize { AUTHORIZED_FLAG } else { 0 });
            }
        }
    }

    pub fn transaction(&mut self, tx: &WireTransaction<'_>) {
        self.muxed_account(tx.source);
        self.u32(tx.fee);
        self.i64(tx.sequence);
        self.u32(PRECOND_NONE);
        self.memo(tx.memo);
        self.u32(tx.operations.len() as u32);
        for op in tx.operations {
            self.operation(op);
        }
        self.u32(0); // ext
    }
}
