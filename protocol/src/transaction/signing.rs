//! Transaction signing with Ed25519 keypairs.
//!
//! Signing is a separate step from building because the body must be frozen
//! first: the signature covers the body hash, and the signed transaction
//! embeds exactly the bytes that were hashed.

use minicbor::encode::{Error, Write};
use minicbor::{Encode, Encoder};

use super::builder::FrozenBody;
use super::cbor;
use super::metadata::AuxiliaryData;
use super::types::TransactionId;
use crate::crypto::keys::{Ed25519Signature, KeyError, PaymentKeypair, VerificationKey};

/// Witness set map key for verification-key witnesses.
const KEY_VKEY_WITNESSES: u64 = 0;

// ---------------------------------------------------------------------------
// Witnesses
// ---------------------------------------------------------------------------

/// A signature over the body hash together with the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VkeyWitness {
    pub vkey: VerificationKey,
    pub signature: Ed25519Signature,
}

impl VkeyWitness {
    /// Same encoded length as a real witness, all bytes zero.
    fn placeholder() -> Self {
        Self {
            vkey: VerificationKey::placeholder(),
            signature: Ed25519Signature::from_bytes([0u8; 64]),
        }
    }
}

impl<C> Encode<C> for VkeyWitness {
    /// `[vkey, signature]`
    fn encode<W: Write>(&self, e: &mut Encoder<W>, _ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.array(2)?
            .bytes(self.vkey.as_bytes())?
            .bytes(self.signature.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessSet {
    vkey_witnesses: Vec<VkeyWitness>,
}

impl WitnessSet {
    pub fn vkey_witnesses(&self) -> &[VkeyWitness] {
        &self.vkey_witnesses
    }
}

impl<C> Encode<C> for WitnessSet {
    /// `{ 0: [vkey_witness, ...] }`
    fn encode<W: Write>(&self, e: &mut Encoder<W>, ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.map(1)?
            .u64(KEY_VKEY_WITNESSES)?
            .array(self.vkey_witnesses.len() as u64)?;
        for witness in &self.vkey_witnesses {
            witness.encode(e, ctx)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A finalized transaction: frozen body, witnesses, auxiliary data.
///
/// Serializes to `[body, witness_set, true, auxiliary_data | null]`, with the
/// body written verbatim from its frozen encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    body: FrozenBody,
    witnesses: WitnessSet,
    auxiliary_data: Option<AuxiliaryData>,
}

/// Borrowed parts of a signed transaction, so candidates can be measured
/// without cloning the body.
struct SignedParts<'a> {
    body: &'a FrozenBody,
    witnesses: &'a WitnessSet,
    auxiliary_data: Option<&'a AuxiliaryData>,
}

impl<C> Encode<C> for SignedParts<'_> {
    fn encode<W: Write>(&self, e: &mut Encoder<W>, ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.array(4)?;
        cbor::write_raw(e, self.body.cbor())?;
        self.witnesses.encode(e, ctx)?;
        e.bool(true)?;
        match self.auxiliary_data {
            Some(aux) => aux.encode(e, ctx)?,
            None => {
                e.null()?;
            }
        }
        Ok(())
    }
}

impl SignedTransaction {
    pub fn body(&self) -> &FrozenBody {
        &self.body
    }

    pub fn witnesses(&self) -> &WitnessSet {
        &self.witnesses
    }

    pub fn auxiliary_data(&self) -> Option<&AuxiliaryData> {
        self.auxiliary_data.as_ref()
    }

    /// Hex of the body hash.
    pub fn id(&self) -> TransactionId {
        self.body.id()
    }

    /// The canonical CBOR payload, ready to submit or persist.
    pub fn to_bytes(&self) -> Vec<u8> {
        cbor::to_vec(&SignedParts {
            body: &self.body,
            witnesses: &self.witnesses,
            auxiliary_data: self.auxiliary_data.as_ref(),
        })
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }
}

/// Size the transaction will have once signed with a single key.
///
/// Ed25519 keys and signatures have fixed lengths, so a zeroed placeholder
/// witness gives the exact final size.
pub fn estimate_signed_size(body: &FrozenBody, auxiliary_data: Option<&AuxiliaryData>) -> usize {
    let witnesses = WitnessSet {
        vkey_witnesses: vec![VkeyWitness::placeholder()],
    };
    cbor::encoded_len(&SignedParts {
        body,
        witnesses: &witnesses,
        auxiliary_data,
    })
}

/// Signs a frozen body with the sender's key and attaches the auxiliary data.
///
/// The signing procedure:
/// 1. Check that the key hash owns every input. A key that cannot authorize
///    the inputs would produce a transaction the ledger rejects.
/// 2. Produce an Ed25519 signature over the 32-byte body hash.
/// 3. Wrap it with the verification key as the single vkey witness.
///
/// # Errors
///
/// [`KeyError::KeyHashMismatch`] when an input is owned by another key.
pub fn sign_transaction(
    body: FrozenBody,
    auxiliary_data: Option<AuxiliaryData>,
    keypair: &PaymentKeypair,
) -> Result<SignedTransaction, KeyError> {
    let key_hash = keypair.key_hash();
    if let Some(foreign) = body.body().inputs().iter().find(|i| i.owner != key_hash) {
        return Err(KeyError::KeyHashMismatch {
            expected: foreign.owner.to_hex(),
            actual: key_hash.to_hex(),
        });
    }

    let signature = keypair.sign(body.hash().as_bytes());
    let witness = VkeyWitness {
        vkey: keypair.verification_key(),
        signature,
    };

    Ok(SignedTransaction {
        body,
        witnesses: WitnessSet {
            vkey_witnesses: vec![witness],
        },
        auxiliary_data,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyHash;
    use crate::transaction::address::Address;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::inputs::TransactionInput;
    use crate::transaction::outputs::TransactionOutput;
    use crate::transaction::types::{Lovelace, TransactionHash};

    fn frozen_for(owner: KeyHash, aux: Option<&AuxiliaryData>) -> FrozenBody {
        let to = Address::enterprise(&KeyHash::from_bytes([0x09; 28]), false).unwrap();
        TransactionBuilder::new()
            .input(TransactionInput {
                tx_hash: TransactionHash::from_bytes([0xaa; 32]),
                index: 1,
                value: Lovelace::new(5_000_000),
                owner,
            })
            .output(TransactionOutput::new(to, Lovelace::new(4_800_000)))
            .fee(Lovelace::new(200_000))
            .ttl(42)
            .auxiliary_data_hash(aux.map(|a| a.hash()))
            .build()
            .unwrap()
            .freeze()
    }

    #[test]
    fn signature_covers_body_hash() {
        let kp = PaymentKeypair::from_seed(&[7u8; 32]);
        let signed = sign_transaction(frozen_for(kp.key_hash(), None), None, &kp).unwrap();

        let witnesses = signed.witnesses().vkey_witnesses();
        assert_eq!(witnesses.len(), 1);
        assert_eq!(witnesses[0].vkey, kp.verification_key());
        assert!(witnesses[0]
            .vkey
            .verify(signed.body().hash().as_bytes(), &witnesses[0].signature));
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = PaymentKeypair::from_seed(&[7u8; 32]);
        let a = sign_transaction(frozen_for(kp.key_hash(), None), None, &kp).unwrap();
        let b = sign_transaction(frozen_for(kp.key_hash(), None), None, &kp).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn signing_does_not_change_id() {
        let kp = PaymentKeypair::from_seed(&[7u8; 32]);
        let frozen = frozen_for(kp.key_hash(), None);
        let id_before = frozen.id();
        let signed = sign_transaction(frozen, None, &kp).unwrap();
        assert_eq!(signed.id(), id_before);
    }

    #[test]
    fn foreign_key_is_rejected() {
        let owner = PaymentKeypair::from_seed(&[1u8; 32]);
        let intruder = PaymentKeypair::from_seed(&[2u8; 32]);
        let err = sign_transaction(frozen_for(owner.key_hash(), None), None, &intruder).unwrap_err();
        assert!(matches!(err, KeyError::KeyHashMismatch { .. }));
    }

    #[test]
    fn serialized_layout_embeds_frozen_body() {
        let kp = PaymentKeypair::from_seed(&[7u8; 32]);
        let aux = AuxiliaryData::from_lines(&["memo".to_string()]).unwrap();
        let frozen = frozen_for(kp.key_hash(), Some(&aux));
        let body_cbor = frozen.cbor().to_vec();
        let bytes = sign_transaction(frozen, Some(aux.clone()), &kp)
            .unwrap()
            .to_bytes();

        assert_eq!(bytes[0], 0x84);
        assert_eq!(&bytes[1..1 + body_cbor.len()], body_cbor.as_slice());
        assert!(bytes.ends_with(&aux.to_cbor()));
    }

    #[test]
    fn transaction_without_metadata_ends_with_null() {
        let kp = PaymentKeypair::from_seed(&[7u8; 32]);
        let bytes = sign_transaction(frozen_for(kp.key_hash(), None), None, &kp)
            .unwrap()
            .to_bytes();
        assert_eq!(&bytes[bytes.len() - 2..], &[0xf5, 0xf6]);
    }

    #[test]
    fn estimate_matches_signed_size() {
        let kp = PaymentKeypair::from_seed(&[7u8; 32]);
        let aux = AuxiliaryData::from_lines(&["a".to_string(), "b".to_string()]).unwrap();
        let frozen = frozen_for(kp.key_hash(), Some(&aux));
        let estimate = estimate_signed_size(&frozen, Some(&aux));
        let signed = sign_transaction(frozen, Some(aux), &kp).unwrap();
        assert_eq!(estimate, signed.size());
    }
}
